use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::notification::NotificationRow;
use crate::state::AppState;

/// GET /api/v1/notifications
/// Lists the caller's notifications, newest first.
pub async fn handle_list_notifications(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<NotificationRow>>, AppError> {
    let rows: Vec<NotificationRow> = sqlx::query_as(
        "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(caller.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// PATCH /api/v1/notifications/:id/read
/// Marks one of the caller's notifications as read. Re-reading keeps the
/// original `read_at` stamp.
pub async fn handle_mark_read(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationRow>, AppError> {
    let row: Option<NotificationRow> = sqlx::query_as(
        r#"
        UPDATE notifications
        SET is_read = TRUE, read_at = COALESCE(read_at, now())
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(caller.id)
    .fetch_optional(&state.db)
    .await?;

    row.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Notification {id} not found")))
}
