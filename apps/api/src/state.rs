use std::sync::Arc;

use crate::auth::{SessionResolver, TokenSigner};
use crate::config::Config;
use crate::store::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Prediction records. Postgres in production, in-memory in tests.
    pub records: Arc<dyn RecordStore>,
    /// Session lookups against the identity provider.
    pub sessions: Arc<dyn SessionResolver>,
    pub tokens: TokenSigner,
    pub config: Config,
}
