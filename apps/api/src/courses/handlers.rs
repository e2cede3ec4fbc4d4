use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::courses::queries;
use crate::errors::AppError;
use crate::models::course::{CourseRow, EnrollmentRow};
use crate::models::portfolio::PortfolioItemRow;
use crate::models::user::UserRow;
use crate::notifications::{dispatch, DomainEvent};
use crate::policy;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateCourseRequest {
    pub course_code: String,
    pub course_name: String,
}

/// POST /api/v1/courses
pub async fn handle_create_course(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Json(req): Json<CreateCourseRequest>,
) -> Result<Json<CourseRow>, AppError> {
    policy::require_faculty(&caller)?;
    let code = req.course_code.trim();
    let name = req.course_name.trim();
    if code.is_empty() {
        return Err(AppError::Validation("course_code is required".to_string()));
    }
    if name.is_empty() {
        return Err(AppError::Validation("course_name is required".to_string()));
    }
    if queries::find_course(&state.db, code).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Course code {code} already exists"
        )));
    }
    let course =
        queries::insert_course(&state.db, code, name, caller.id, &caller.display_name).await?;
    Ok(Json(course))
}

/// GET /api/v1/courses
pub async fn handle_list_courses(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
) -> Result<Json<Vec<CourseRow>>, AppError> {
    Ok(Json(queries::all_courses(&state.db).await?))
}

/// GET /api/v1/courses/mine
pub async fn handle_my_courses(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<CourseRow>>, AppError> {
    policy::require_faculty(&caller)?;
    Ok(Json(queries::courses_created_by(&state.db, caller.id).await?))
}

async fn load_owned_course(
    state: &AppState,
    caller: &crate::auth::AuthUser,
    code: &str,
) -> Result<CourseRow, AppError> {
    let course = queries::find_course(&state.db, code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {code} not found")))?;
    policy::require_course_creator(caller, course.created_by)?;
    Ok(course)
}

/// GET /api/v1/courses/:code/projects
pub async fn handle_course_projects(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(code): Path<String>,
) -> Result<Json<Vec<PortfolioItemRow>>, AppError> {
    load_owned_course(&state, &caller, &code).await?;
    Ok(Json(queries::course_projects(&state.db, &code).await?))
}

/// GET /api/v1/courses/:code/students
pub async fn handle_course_students(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(code): Path<String>,
) -> Result<Json<Vec<UserRow>>, AppError> {
    load_owned_course(&state, &caller, &code).await?;
    Ok(Json(queries::enrolled_students(&state.db, &code).await?))
}

#[derive(Deserialize)]
pub struct EnrollRequest {
    pub student_id: Uuid,
}

/// POST /api/v1/courses/:code/enrollments
pub async fn handle_enroll(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(code): Path<String>,
    Json(req): Json<EnrollRequest>,
) -> Result<Json<EnrollmentRow>, AppError> {
    let course = load_owned_course(&state, &caller, &code).await?;

    let student: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(req.student_id)
        .fetch_optional(&state.db)
        .await?;
    let student =
        student.ok_or_else(|| AppError::NotFound(format!("User {} not found", req.student_id)))?;

    if queries::find_enrollment(&state.db, &code, student.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Student is already enrolled in this course".to_string(),
        ));
    }

    let enrollment = queries::insert_enrollment(&state.db, &code, student.id).await?;
    dispatch(
        state.notifier.as_ref(),
        &[DomainEvent::StudentEnrolled {
            student: student.id,
            course_name: course.course_name.clone(),
            faculty_id: caller.id,
        }],
    )
    .await;
    Ok(Json(enrollment))
}

/// DELETE /api/v1/courses/:code/enrollments/:student_id
pub async fn handle_unenroll(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path((code, student_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    load_owned_course(&state, &caller, &code).await?;
    let removed = queries::delete_enrollment(&state.db, &code, student_id).await?;
    if !removed {
        return Err(AppError::NotFound(
            "Student is not enrolled in this course".to_string(),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/students/:id/courses
/// Unions enrollment records with codes carried on the student's items.
pub async fn handle_student_courses(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<String>>, AppError> {
    policy::require_owner_or_staff(&caller, student_id)?;
    let enrolled = queries::enrollment_codes(&state.db, student_id).await?;
    let from_items = queries::portfolio_codes(&state.db, student_id).await?;
    Ok(Json(queries::merge_course_codes(enrolled, from_items)))
}
