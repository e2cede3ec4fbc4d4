use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::user::{Role, UserRow, UserStatus};
use crate::notifications::{dispatch, DomainEvent};
use crate::policy;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub fname: String,
    pub lname: String,
    pub bio: Option<String>,
    pub role: String,
}

/// POST /api/v1/users — public signup.
/// Students come out APPROVED; faculty stay PENDING and every admin is asked
/// to review. Admin accounts are not self-served.
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<UserRow>, AppError> {
    let username = req.username.trim();
    let email = req.email.trim();
    let fname = req.fname.trim();
    let lname = req.lname.trim();
    for (value, field) in [
        (username, "username"),
        (email, "email"),
        (fname, "fname"),
        (lname, "lname"),
    ] {
        if value.is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }
    let role = match Role::parse(req.role.trim()) {
        Some(Role::Student) => Role::Student,
        Some(Role::Faculty) => Role::Faculty,
        _ => {
            return Err(AppError::Validation(
                "role must be STUDENT or FACULTY".to_string(),
            ))
        }
    };

    let taken: Option<UserRow> =
        sqlx::query_as("SELECT * FROM users WHERE username = $1 OR email = $2")
            .bind(username)
            .bind(email)
            .fetch_optional(&state.db)
            .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(
            "Username or email is already in use".to_string(),
        ));
    }

    let status = UserStatus::initial_for(role);
    let user: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users (username, email, fname, lname, bio, role, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(fname)
    .bind(lname)
    .bind(&req.bio)
    .bind(role.as_str())
    .bind(status.as_str())
    .fetch_one(&state.db)
    .await?;

    if role == Role::Faculty {
        let admins: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE role = 'ADMIN'")
                .fetch_all(&state.db)
                .await?;
        let events: Vec<DomainEvent> = admins
            .into_iter()
            .map(|admin| DomainEvent::FacultyRequested {
                admin,
                faculty_id: user.id,
                faculty_name: user.display_name(),
            })
            .collect();
        dispatch(state.notifier.as_ref(), &events).await;
    }

    Ok(Json(user))
}

/// GET /api/v1/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserRow>, AppError> {
    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;
    user.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}

#[derive(Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

/// GET /api/v1/users?username=
pub async fn handle_find_by_username(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    Query(query): Query<UsernameQuery>,
) -> Result<Json<UserRow>, AppError> {
    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(&query.username)
        .fetch_optional(&state.db)
        .await?;
    user.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", query.username)))
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub approve: bool,
}

/// PATCH /api/v1/users/:id/review — admin decision on a pending faculty
/// account.
pub async fn handle_review_faculty(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<UserRow>, AppError> {
    policy::require_admin(&caller)?;

    let user: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;
    let user = user.ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    if Role::parse(&user.role) != Some(Role::Faculty)
        || UserStatus::parse(&user.status) != Some(UserStatus::Pending)
    {
        return Err(AppError::Conflict(
            "Account is not pending faculty review".to_string(),
        ));
    }

    let status = if req.approve {
        UserStatus::Approved
    } else {
        UserStatus::Rejected
    };
    let updated: UserRow =
        sqlx::query_as("UPDATE users SET status = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(status.as_str())
            .fetch_one(&state.db)
            .await?;

    dispatch(
        state.notifier.as_ref(),
        &[DomainEvent::FacultyReviewed {
            faculty: updated.id,
            approved: req.approve,
        }],
    )
    .await;

    Ok(Json(updated))
}
