use std::sync::Arc;

use motos_db::processor::MotoProcessor;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: motos_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Write chain for motos: timestamp stamping, then persistence.
    pub motos: Arc<MotoProcessor>,
}

impl AppState {
    pub fn new(pool: motos_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            motos: Arc::new(MotoProcessor::default()),
        }
    }
}
