//! Category-conditioned field validation.
//!
//! A project and a microcredential share title/description but disagree on
//! everything else; whichever side the category excludes is cleared so the
//! mutual-exclusion invariant holds after every create and update. All
//! functions here are pure — a rejected update never touches the item.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::portfolio::{Category, PortfolioItemRow};

/// A file part received in the multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// Raw multipart fields for create/update, before category rules are applied.
#[derive(Debug, Default, Clone)]
pub struct ItemForm {
    pub owner_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub github_link: Option<String>,
    pub course_code: Option<String>,
    pub cert_title: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub skills: Option<Vec<String>>,
    pub cert_file: Option<UploadedFile>,
}

/// Field set that passed category validation, ready for persistence.
#[derive(Debug, Clone)]
pub struct ValidatedFields {
    pub category: Category,
    pub title: String,
    pub description: String,
    pub github_link: Option<String>,
    pub course_code: Option<String>,
    pub cert_title: Option<String>,
    pub issue_date: Option<NaiveDate>,
}

fn non_empty(value: &Option<String>, field: &str) -> Result<String, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

fn clean_optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates a form against its category's required fields and returns the
/// persistable field set with the excluded side already cleared.
pub fn validate_fields(form: &ItemForm) -> Result<ValidatedFields, AppError> {
    let title = non_empty(&form.title, "title")?;
    let description = non_empty(&form.description, "description")?;
    let category_raw = non_empty(&form.category, "category")?;
    let category = Category::parse(&category_raw).ok_or_else(|| {
        AppError::Validation("category must be 'project' or 'microcredential'".to_string())
    })?;
    let course_code = clean_optional(&form.course_code);

    match category {
        Category::Project => Ok(ValidatedFields {
            category,
            title,
            description,
            github_link: clean_optional(&form.github_link),
            course_code,
            cert_title: None,
            issue_date: None,
        }),
        Category::Microcredential => {
            let cert_title = non_empty(&form.cert_title, "cert_title")?;
            let issue_date = form.issue_date.ok_or_else(|| {
                AppError::Validation("issue_date is required for microcredentials".to_string())
            })?;
            Ok(ValidatedFields {
                category,
                title,
                description,
                github_link: None,
                course_code,
                cert_title: Some(cert_title),
                issue_date: Some(issue_date),
            })
        }
    }
}

/// A microcredential must arrive with its certificate file at creation.
/// Updates may keep the file already on record.
pub fn require_cert_file_on_create(
    fields: &ValidatedFields,
    has_file: bool,
) -> Result<(), AppError> {
    if fields.category == Category::Microcredential && !has_file {
        return Err(AppError::Validation(
            "cert_file is required for microcredentials".to_string(),
        ));
    }
    Ok(())
}

/// Applies validated fields to an existing item. A category switch clears the
/// now-irrelevant side; the certificate file survives only while the item
/// stays a microcredential (a fresh upload is applied by the caller).
pub fn apply_update(item: &mut PortfolioItemRow, fields: &ValidatedFields, now: DateTime<Utc>) {
    item.category = fields.category.as_str().to_string();
    item.title = fields.title.clone();
    item.description = fields.description.clone();
    item.course_code = fields.course_code.clone();
    match fields.category {
        Category::Project => {
            item.github_link = fields.github_link.clone();
            item.cert_title = None;
            item.issue_date = None;
            item.cert_file = None;
        }
        Category::Microcredential => {
            item.github_link = None;
            item.cert_title = fields.cert_title.clone();
            item.issue_date = fields.issue_date;
        }
    }
    item.updated_at = now;
}

/// Trims, drops empties, and deduplicates while keeping first-seen order.
/// Re-submitting the same list is a no-op.
pub fn normalize_skills(raw: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut skills = Vec::new();
    for tag in raw {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if seen.insert(tag.to_string()) {
            skills.push(tag.to_string());
        }
    }
    skills
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn project_form() -> ItemForm {
        ItemForm {
            title: Some("Compiler in Rust".to_string()),
            description: Some("A toy compiler".to_string()),
            category: Some("project".to_string()),
            github_link: Some("https://github.com/u/compiler".to_string()),
            course_code: Some("CS101".to_string()),
            ..ItemForm::default()
        }
    }

    fn micro_form() -> ItemForm {
        ItemForm {
            title: Some("Cloud Practitioner".to_string()),
            description: Some("Vendor certification".to_string()),
            category: Some("microcredential".to_string()),
            cert_title: Some("AWS CCP".to_string()),
            issue_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            ..ItemForm::default()
        }
    }

    fn project_item() -> PortfolioItemRow {
        PortfolioItemRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            category: "project".to_string(),
            title: "Compiler in Rust".to_string(),
            description: "A toy compiler".to_string(),
            github_link: Some("https://github.com/u/compiler".to_string()),
            course_code: Some("CS101".to_string()),
            cert_title: None,
            issue_date: None,
            cert_file: None,
            public_token: "tok".to_string(),
            validated_by_faculty: false,
            validated_by_id: None,
            validated_by_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_project_fields_pass() {
        let fields = validate_fields(&project_form()).unwrap();
        assert_eq!(fields.category, Category::Project);
        assert_eq!(fields.course_code.as_deref(), Some("CS101"));
        assert!(fields.cert_title.is_none());
        assert!(fields.issue_date.is_none());
    }

    #[test]
    fn test_missing_title_rejected() {
        let mut form = project_form();
        form.title = None;
        assert!(matches!(
            validate_fields(&form),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_whitespace_title_rejected() {
        let mut form = project_form();
        form.title = Some("   ".to_string());
        assert!(matches!(
            validate_fields(&form),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let mut form = project_form();
        form.category = Some("badge".to_string());
        assert!(matches!(
            validate_fields(&form),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_micro_requires_cert_title_and_issue_date() {
        let mut form = micro_form();
        form.cert_title = None;
        assert!(validate_fields(&form).is_err());

        let mut form = micro_form();
        form.issue_date = None;
        assert!(validate_fields(&form).is_err());
    }

    #[test]
    fn test_micro_fields_clear_github_link() {
        let mut form = micro_form();
        form.github_link = Some("https://github.com/u/x".to_string());
        let fields = validate_fields(&form).unwrap();
        assert!(fields.github_link.is_none());
        assert_eq!(fields.cert_title.as_deref(), Some("AWS CCP"));
    }

    #[test]
    fn test_cert_file_required_on_create_only_for_micro() {
        let micro = validate_fields(&micro_form()).unwrap();
        assert!(require_cert_file_on_create(&micro, false).is_err());
        assert!(require_cert_file_on_create(&micro, true).is_ok());

        let project = validate_fields(&project_form()).unwrap();
        assert!(require_cert_file_on_create(&project, false).is_ok());
    }

    #[test]
    fn test_switch_to_micro_clears_github_link_and_keeps_cert_file() {
        let mut item = project_item();
        item.cert_file = None;
        let fields = validate_fields(&micro_form()).unwrap();
        apply_update(&mut item, &fields, Utc::now());
        assert_eq!(item.category, "microcredential");
        assert!(item.github_link.is_none());
        assert_eq!(item.cert_title.as_deref(), Some("AWS CCP"));
        assert!(item.issue_date.is_some());
    }

    #[test]
    fn test_switch_to_project_clears_cert_fields() {
        let mut item = project_item();
        item.category = "microcredential".to_string();
        item.github_link = None;
        item.cert_title = Some("AWS CCP".to_string());
        item.issue_date = NaiveDate::from_ymd_opt(2024, 6, 1);
        item.cert_file = Some("certificates/abc.pdf".to_string());

        let fields = validate_fields(&project_form()).unwrap();
        apply_update(&mut item, &fields, Utc::now());
        assert_eq!(item.category, "project");
        assert!(item.cert_title.is_none());
        assert!(item.issue_date.is_none());
        assert!(item.cert_file.is_none());
        assert_eq!(
            item.github_link.as_deref(),
            Some("https://github.com/u/compiler")
        );
    }

    #[test]
    fn test_rejected_switch_leaves_item_untouched() {
        let mut item = project_item();
        let before = item.clone();
        let mut form = micro_form();
        form.issue_date = None;
        // Validation fails before any mutation happens.
        assert!(validate_fields(&form).is_err());
        assert_eq!(item.title, before.title);
        assert_eq!(item.category, before.category);
        // Nothing was applied.
        item.updated_at = before.updated_at;
        assert_eq!(format!("{item:?}"), format!("{before:?}"));
    }

    #[test]
    fn test_course_code_cleared_by_omission() {
        let mut item = project_item();
        let mut form = project_form();
        form.course_code = None;
        let fields = validate_fields(&form).unwrap();
        apply_update(&mut item, &fields, Utc::now());
        assert!(item.course_code.is_none());
    }

    #[test]
    fn test_normalize_skills_dedups_and_trims() {
        let raw = vec![
            " rust ".to_string(),
            "sql".to_string(),
            "rust".to_string(),
            "".to_string(),
            "  ".to_string(),
        ];
        assert_eq!(normalize_skills(&raw), vec!["rust", "sql"]);
    }

    #[test]
    fn test_normalize_skills_idempotent() {
        let raw = vec!["a".to_string(), "b".to_string()];
        let once = normalize_skills(&raw);
        let twice = normalize_skills(&once);
        assert_eq!(once, twice);
        assert_eq!(twice, vec!["a", "b"]);
    }
}
