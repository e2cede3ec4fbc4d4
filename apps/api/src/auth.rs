//! Bearer-token authentication.
//!
//! Token issuance and verification live outside this service; we consume the
//! token as an opaque key and resolve it to an account. `AppState` holds an
//! `Arc<dyn Authenticator>`, swapped at startup.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Role, UserRow, UserStatus};
use crate::state::AppState;

/// The resolved caller identity attached to a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
    pub display_name: String,
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolves an opaque bearer token to an account, or `Unauthorized`.
    async fn current_user(&self, token: &str) -> Result<AuthUser, AppError>;
}

/// Production authenticator: looks tokens up in the `auth_tokens` table.
pub struct PgAuthenticator {
    pool: PgPool,
}

impl PgAuthenticator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Authenticator for PgAuthenticator {
    async fn current_user(&self, token: &str) -> Result<AuthUser, AppError> {
        let user: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT u.*
            FROM users u
            JOIN auth_tokens t ON t.user_id = u.id
            WHERE t.token = $1
              AND (t.expires_at IS NULL OR t.expires_at > now())
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let user = user.ok_or(AppError::Unauthorized)?;

        // Only APPROVED accounts may authenticate; pending and rejected
        // faculty fail the same way an unknown token does.
        if UserStatus::parse(&user.status) != Some(UserStatus::Approved) {
            return Err(AppError::Unauthorized);
        }
        let role = Role::parse(&user.role).ok_or(AppError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            role,
            display_name: user.display_name(),
        })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AppError> {
    let header = header.ok_or(AppError::Unauthorized)?;
    let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;
    if token.is_empty() {
        return Err(AppError::Unauthorized);
    }
    Ok(token)
}

/// Authenticated caller, resolved from the `Authorization` header.
pub struct CurrentUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let token = parse_bearer(header)?;
        let user = state.auth.current_user(token).await?;
        Ok(CurrentUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer_ok() {
        assert_eq!(parse_bearer(Some("Bearer abc123")).unwrap(), "abc123");
    }

    #[test]
    fn test_parse_bearer_missing_header() {
        assert!(matches!(parse_bearer(None), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_parse_bearer_wrong_scheme() {
        assert!(matches!(
            parse_bearer(Some("Basic abc123")),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_parse_bearer_empty_token() {
        assert!(matches!(
            parse_bearer(Some("Bearer ")),
            Err(AppError::Unauthorized)
        ));
    }
}
