use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Item category. Fixes which fields are mandatory and which are excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Project,
    Microcredential,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Project => "project",
            Category::Microcredential => "microcredential",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        // The legacy clients send mixed-case category values.
        if s.eq_ignore_ascii_case("project") {
            Some(Category::Project)
        } else if s.eq_ignore_ascii_case("microcredential") {
            Some(Category::Microcredential)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PortfolioItemRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: String,
    pub title: String,
    pub description: String,
    pub github_link: Option<String>,
    pub course_code: Option<String>,
    pub cert_title: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub cert_file: Option<String>,
    pub public_token: String,
    pub validated_by_faculty: bool,
    pub validated_by_id: Option<Uuid>,
    pub validated_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PortfolioItemRow {
    pub fn is_project(&self) -> bool {
        Category::parse(&self.category) == Some(Category::Project)
    }

    pub fn is_microcredential(&self) -> bool {
        Category::parse(&self.category) == Some(Category::Microcredential)
    }
}

/// Public/private visibility sub-resource. An item without a link row is not
/// resolvable through its public token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LinkRow {
    pub item_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WitnessRow {
    pub item_id: Uuid,
    pub faculty_id: Uuid,
    pub faculty_name: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!(Category::parse("Project"), Some(Category::Project));
        assert_eq!(Category::parse("PROJECT"), Some(Category::Project));
        assert_eq!(
            Category::parse("Microcredential"),
            Some(Category::Microcredential)
        );
        assert_eq!(Category::parse("badge"), None);
        assert_eq!(Category::parse(""), None);
    }
}
