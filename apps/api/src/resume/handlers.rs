use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::policy;
use crate::portfolio::lifecycle;
use crate::resume::assembler;
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct ResumeQuery {
    #[serde(default)]
    pub enhanced: bool,
}

/// POST /api/v1/users/:id/resume
/// Streams the rendered document with the renderer's content type.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ResumeQuery>,
) -> Result<Response, AppError> {
    policy::require_owner_or_admin(&caller, user_id)?;

    let owner: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?;
    let owner = owner.ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

    let bundles = lifecycle::load_user_bundles(&state.db, user_id).await?;
    let resume = assembler::assemble(&owner, &bundles, query.enhanced);
    let bytes = state.renderer.render(&resume)?;

    let headers = [
        (
            header::CONTENT_TYPE,
            state.renderer.content_type().to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"resume.pdf\"".to_string(),
        ),
    ];
    Ok((headers, bytes).into_response())
}
