//! Course and enrollment queries.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::course::{CourseRow, EnrollmentRow};
use crate::models::portfolio::PortfolioItemRow;
use crate::models::user::UserRow;

pub async fn find_course(pool: &PgPool, code: &str) -> Result<Option<CourseRow>, AppError> {
    Ok(
        sqlx::query_as("SELECT * FROM courses WHERE course_code = $1")
            .bind(code)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn insert_course(
    pool: &PgPool,
    code: &str,
    name: &str,
    created_by: Uuid,
    created_by_name: &str,
) -> Result<CourseRow, AppError> {
    Ok(sqlx::query_as(
        r#"
        INSERT INTO courses (course_code, course_name, created_by, created_by_name)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(code)
    .bind(name)
    .bind(created_by)
    .bind(created_by_name)
    .fetch_one(pool)
    .await?)
}

pub async fn all_courses(pool: &PgPool) -> Result<Vec<CourseRow>, AppError> {
    Ok(
        sqlx::query_as("SELECT * FROM courses ORDER BY course_code ASC")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn courses_created_by(
    pool: &PgPool,
    faculty_id: Uuid,
) -> Result<Vec<CourseRow>, AppError> {
    Ok(
        sqlx::query_as("SELECT * FROM courses WHERE created_by = $1 ORDER BY course_code ASC")
            .bind(faculty_id)
            .fetch_all(pool)
            .await?,
    )
}

pub async fn find_enrollment(
    pool: &PgPool,
    code: &str,
    student_id: Uuid,
) -> Result<Option<EnrollmentRow>, AppError> {
    Ok(
        sqlx::query_as("SELECT * FROM enrollments WHERE course_code = $1 AND student_id = $2")
            .bind(code)
            .bind(student_id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn insert_enrollment(
    pool: &PgPool,
    code: &str,
    student_id: Uuid,
) -> Result<EnrollmentRow, AppError> {
    Ok(sqlx::query_as(
        "INSERT INTO enrollments (course_code, student_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(code)
    .bind(student_id)
    .fetch_one(pool)
    .await?)
}

/// Returns whether a record was actually removed.
pub async fn delete_enrollment(
    pool: &PgPool,
    code: &str,
    student_id: Uuid,
) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM enrollments WHERE course_code = $1 AND student_id = $2")
        .bind(code)
        .bind(student_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn enrolled_students(pool: &PgPool, code: &str) -> Result<Vec<UserRow>, AppError> {
    Ok(sqlx::query_as(
        r#"
        SELECT u.*
        FROM users u
        JOIN enrollments e ON e.student_id = u.id
        WHERE e.course_code = $1
        ORDER BY u.lname ASC, u.fname ASC
        "#,
    )
    .bind(code)
    .fetch_all(pool)
    .await?)
}

/// Project-category items submitted under a course code.
pub async fn course_projects(
    pool: &PgPool,
    code: &str,
) -> Result<Vec<PortfolioItemRow>, AppError> {
    Ok(sqlx::query_as(
        r#"
        SELECT *
        FROM portfolio_items
        WHERE course_code = $1 AND category = 'project'
        ORDER BY updated_at DESC
        "#,
    )
    .bind(code)
    .fetch_all(pool)
    .await?)
}

pub async fn enrollment_codes(pool: &PgPool, student_id: Uuid) -> Result<Vec<String>, AppError> {
    Ok(
        sqlx::query_scalar("SELECT course_code FROM enrollments WHERE student_id = $1")
            .bind(student_id)
            .fetch_all(pool)
            .await?,
    )
}

pub async fn portfolio_codes(pool: &PgPool, student_id: Uuid) -> Result<Vec<String>, AppError> {
    Ok(sqlx::query_scalar(
        "SELECT course_code FROM portfolio_items WHERE owner_id = $1 AND course_code IS NOT NULL",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?)
}

/// "Courses a student is in" unions enrollment records with the codes carried
/// on portfolio items. The two sources can disagree; the union preserves the
/// existing product behavior.
pub fn merge_course_codes(enrolled: Vec<String>, from_items: Vec<String>) -> Vec<String> {
    let mut codes: Vec<String> = enrolled;
    codes.extend(from_items);
    codes.sort();
    codes.dedup();
    codes
}
