use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseRow {
    pub course_code: String,
    pub course_name: String,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
}

/// Join record linking a student to a course. Grants no portfolio visibility.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrollmentRow {
    pub id: Uuid,
    pub course_code: String,
    pub student_id: Uuid,
    pub created_at: DateTime<Utc>,
}
