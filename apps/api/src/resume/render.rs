//! Document rendering.
//!
//! Rendering is an external concern consumed through `DocumentRenderer`;
//! `AppState` carries it as a trait object so the backend can be swapped at
//! startup. The built-in backend writes a small single-font PDF directly
//! (US letter, Helvetica, one text block per line) so the service has no
//! rendering sidecar to deploy.

use crate::errors::AppError;
use crate::resume::ResumeModel;

pub trait DocumentRenderer: Send + Sync {
    fn render(&self, resume: &ResumeModel) -> Result<Vec<u8>, AppError>;
    fn content_type(&self) -> &'static str;
}

/// Built-in PDF backend.
pub struct PdfRenderer;

impl DocumentRenderer for PdfRenderer {
    fn render(&self, resume: &ResumeModel) -> Result<Vec<u8>, AppError> {
        Ok(write_pdf(&paginate(&flatten(resume))))
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}

#[derive(Debug, Clone)]
struct Line {
    bold: bool,
    size: u32,
    /// Vertical advance in points consumed before this line's baseline.
    advance: i32,
    text: String,
}

impl Line {
    fn new(bold: bool, size: u32, advance: i32, text: impl Into<String>) -> Self {
        Line {
            bold,
            size,
            advance,
            text: text.into(),
        }
    }
}

const WRAP_WIDTH: usize = 92;

/// Flattens the document model into styled lines, wrapping long body text.
fn flatten(resume: &ResumeModel) -> Vec<Line> {
    let mut lines = vec![Line::new(true, 16, 24, resume.owner_name.clone())];
    if !resume.contact.is_empty() {
        lines.push(Line::new(false, 10, 14, resume.contact.clone()));
    }
    for section in &resume.sections {
        lines.push(Line::new(true, 13, 28, section.heading.clone()));
        for entry in &section.entries {
            lines.push(Line::new(true, 11, 18, entry.title.clone()));
            if let Some(subtitle) = &entry.subtitle {
                lines.push(Line::new(false, 10, 13, subtitle.clone()));
            }
            for bullet in &entry.bullets {
                for (i, chunk) in wrap_line(bullet, WRAP_WIDTH).into_iter().enumerate() {
                    let text = if i == 0 {
                        format!("- {chunk}")
                    } else {
                        format!("  {chunk}")
                    };
                    lines.push(Line::new(false, 10, 13, text));
                }
            }
        }
    }
    lines
}

/// Greedy word wrap; a single overlong word gets its own line.
fn wrap_line(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        out.push(current);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

struct PlacedLine {
    y: i32,
    bold: bool,
    size: u32,
    text: String,
}

const PAGE_TOP: i32 = 752;
const PAGE_BOTTOM: i32 = 72;

fn paginate(lines: &[Line]) -> Vec<Vec<PlacedLine>> {
    let mut pages = Vec::new();
    let mut current = Vec::new();
    let mut y = PAGE_TOP;
    for line in lines {
        if y - line.advance < PAGE_BOTTOM {
            pages.push(std::mem::take(&mut current));
            y = PAGE_TOP;
        }
        y -= line.advance;
        current.push(PlacedLine {
            y,
            bold: line.bold,
            size: line.size,
            text: line.text.clone(),
        });
    }
    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}

/// Escapes a string for a PDF literal; characters outside printable ASCII
/// fall back to '?'.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn content_stream(lines: &[PlacedLine]) -> String {
    let mut s = String::new();
    for line in lines {
        let font = if line.bold { "F2" } else { "F1" };
        s.push_str(&format!(
            "BT /{} {} Tf 72 {} Td ({}) Tj ET\n",
            font,
            line.size,
            line.y,
            escape_text(&line.text)
        ));
    }
    s
}

fn write_pdf(pages: &[Vec<PlacedLine>]) -> Vec<u8> {
    let page_count = pages.len();
    let mut objects: Vec<String> = Vec::with_capacity(4 + 2 * page_count);
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", 5 + 2 * i))
        .collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        page_count
    ));
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold >>".to_string());

    for page in pages {
        let content = content_stream(page);
        let content_id = objects.len() + 2;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {content_id} 0 R >>"
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut buf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(buf.len());
        buf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }
    let xref_offset = buf.len();
    buf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    buf.push_str("0000000000 65535 f \n");
    for offset in offsets {
        buf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    buf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF",
        objects.len() + 1,
        xref_offset
    ));
    buf.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::{ResumeEntry, ResumeSection};

    fn model(sections: Vec<ResumeSection>) -> ResumeModel {
        ResumeModel {
            owner_name: "Ada Lovelace".to_string(),
            contact: "ada@example.edu".to_string(),
            sections,
        }
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|w| w == needle.as_bytes())
    }

    #[test]
    fn test_output_is_framed_as_pdf() {
        let bytes = PdfRenderer.render(&model(vec![])).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF"));
        assert!(contains(&bytes, "Helvetica"));
        assert!(contains(&bytes, "Ada Lovelace"));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(PdfRenderer.content_type(), "application/pdf");
    }

    #[test]
    fn test_parentheses_are_escaped() {
        let m = model(vec![ResumeSection {
            heading: "Projects".to_string(),
            entries: vec![ResumeEntry {
                title: "Parser (v2)".to_string(),
                subtitle: None,
                bullets: vec![],
            }],
        }]);
        let bytes = PdfRenderer.render(&m).unwrap();
        assert!(contains(&bytes, "Parser \\(v2\\)"));
    }

    #[test]
    fn test_non_ascii_falls_back() {
        assert_eq!(escape_text("café"), "caf?");
        assert_eq!(escape_text("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "word ".repeat(40);
        for chunk in wrap_line(&text, 20) {
            assert!(chunk.len() <= 20);
        }
    }

    #[test]
    fn test_wrap_keeps_overlong_word_whole() {
        let long = "x".repeat(50);
        assert_eq!(wrap_line(&long, 20), vec![long]);
    }

    #[test]
    fn test_long_resume_spills_to_more_pages() {
        let entries: Vec<ResumeEntry> = (0..120)
            .map(|i| ResumeEntry {
                title: format!("Project {i}"),
                subtitle: None,
                bullets: vec!["Did a thing".to_string()],
            })
            .collect();
        let m = model(vec![ResumeSection {
            heading: "Projects".to_string(),
            entries,
        }]);
        let bytes = PdfRenderer.render(&m).unwrap();
        assert!(!contains(&bytes, "/Count 1 >>"));
        assert!(contains(&bytes, "/Type /Pages"));
    }

    #[test]
    fn test_empty_model_still_renders_one_page() {
        let bytes = PdfRenderer.render(&model(vec![])).unwrap();
        assert!(contains(&bytes, "/Count 1"));
    }
}
