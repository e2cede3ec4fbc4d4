use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::Authenticator;
use crate::config::Config;
use crate::files::FileStore;
use crate::notifications::Notifier;
use crate::resume::render::DocumentRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The external collaborators (auth, file storage, notification delivery,
/// document rendering) sit behind trait objects so backends can be swapped at
/// startup without touching handler code.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub auth: Arc<dyn Authenticator>,
    pub files: Arc<dyn FileStore>,
    pub notifier: Arc<dyn Notifier>,
    pub renderer: Arc<dyn DocumentRenderer>,
}
