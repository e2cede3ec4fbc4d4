//! Public/private visibility.
//!
//! The link row is the single source of truth. Items created before links
//! existed are backfilled on first toggle rather than failing, so the
//! missing-link error class cannot reach callers.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::portfolio::{LinkRow, PortfolioItemRow};

/// Sets the public/private toggle, creating the link row if the item predates
/// the link table.
pub async fn set_visibility(
    pool: &PgPool,
    item_id: Uuid,
    is_public: bool,
) -> Result<LinkRow, AppError> {
    let link: LinkRow = sqlx::query_as(
        r#"
        INSERT INTO links (item_id, is_active)
        VALUES ($1, $2)
        ON CONFLICT (item_id) DO UPDATE SET is_active = $2
        RETURNING *
        "#,
    )
    .bind(item_id)
    .bind(is_public)
    .fetch_one(pool)
    .await?;
    Ok(link)
}

/// Unauthenticated lookup by public token. A private item and an unknown
/// token produce the same answer, so existence never leaks.
pub async fn resolve_public(pool: &PgPool, token: &str) -> Result<PortfolioItemRow, AppError> {
    let item: Option<PortfolioItemRow> = sqlx::query_as(
        r#"
        SELECT p.*
        FROM portfolio_items p
        JOIN links l ON l.item_id = p.id
        WHERE p.public_token = $1 AND l.is_active = TRUE
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;
    item.ok_or_else(|| AppError::NotFound("Portfolio item not available".to_string()))
}
