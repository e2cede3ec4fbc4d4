//! Resume assembly.
//!
//! Stateless projection of a user's items into a `ResumeModel`: projects
//! sorted by last update, microcredentials by issue date, both descending
//! with missing dates sorting last. No business rules here; item invariants
//! are trusted to already hold.

use std::cmp::Ordering;

use crate::models::user::UserRow;
use crate::portfolio::lifecycle::ItemBundle;
use crate::resume::{ResumeEntry, ResumeModel, ResumeSection};

pub fn assemble(owner: &UserRow, bundles: &[ItemBundle], enhanced: bool) -> ResumeModel {
    let mut projects: Vec<&ItemBundle> = bundles.iter().filter(|b| b.item.is_project()).collect();
    let mut micros: Vec<&ItemBundle> = bundles
        .iter()
        .filter(|b| b.item.is_microcredential())
        .collect();

    projects.sort_by(|a, b| b.item.updated_at.cmp(&a.item.updated_at));
    // Stable sort: items without an issue date keep their relative order at
    // the end.
    micros.sort_by(|a, b| issue_date_desc(a, b));

    let mut sections = Vec::new();
    if !projects.is_empty() {
        sections.push(ResumeSection {
            heading: "Projects".to_string(),
            entries: projects
                .iter()
                .map(|b| project_entry(b, enhanced))
                .collect(),
        });
    }
    if !micros.is_empty() {
        sections.push(ResumeSection {
            heading: "Microcredentials".to_string(),
            entries: micros.iter().map(|b| micro_entry(b, enhanced)).collect(),
        });
    }

    ResumeModel {
        owner_name: owner.display_name(),
        contact: owner.email.clone(),
        sections,
    }
}

fn issue_date_desc(a: &ItemBundle, b: &ItemBundle) -> Ordering {
    match (a.item.issue_date, b.item.issue_date) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn project_entry(bundle: &ItemBundle, enhanced: bool) -> ResumeEntry {
    let item = &bundle.item;
    let mut subtitle_parts = Vec::new();
    if let Some(code) = &item.course_code {
        subtitle_parts.push(format!("Course {code}"));
    }
    if let Some(link) = &item.github_link {
        subtitle_parts.push(link.clone());
    }

    let mut bullets = vec![item.description.clone()];
    if enhanced {
        if let Some(name) = &item.validated_by_name {
            if item.validated_by_faculty {
                bullets.push(format!("Validated by {name}"));
            }
        }
        push_skills(&mut bullets, &bundle.skills);
    }

    ResumeEntry {
        title: item.title.clone(),
        subtitle: join_nonempty(subtitle_parts),
        bullets,
    }
}

fn micro_entry(bundle: &ItemBundle, enhanced: bool) -> ResumeEntry {
    let item = &bundle.item;
    let mut subtitle_parts = Vec::new();
    if let Some(cert) = &item.cert_title {
        subtitle_parts.push(cert.clone());
    }
    if let Some(date) = item.issue_date {
        subtitle_parts.push(format!("issued {date}"));
    }

    let mut bullets = vec![item.description.clone()];
    if enhanced {
        if !bundle.witnesses.is_empty() {
            let names: Vec<&str> = bundle
                .witnesses
                .iter()
                .map(|w| w.faculty_name.as_str())
                .collect();
            bullets.push(format!("Witnessed by {}", names.join(", ")));
        }
        push_skills(&mut bullets, &bundle.skills);
    }

    ResumeEntry {
        title: item.title.clone(),
        subtitle: join_nonempty(subtitle_parts),
        bullets,
    }
}

fn push_skills(bullets: &mut Vec<String>, skills: &[String]) {
    if !skills.is_empty() {
        bullets.push(format!("Skills: {}", skills.join(", ")));
    }
}

fn join_nonempty(parts: Vec<String>) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
