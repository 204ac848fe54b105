use std::sync::Arc;

use presenca_core::roster::Roster;
use presenca_db::store::{PgInstanceStore, PgTemplateStore};

use crate::config::ServerConfig;

/// Roster service wired to PostgreSQL.
pub type PgRoster = Roster<PgTemplateStore, PgInstanceStore>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: presenca_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Attendance roster service.
    pub roster: Arc<PgRoster>,
}

impl AppState {
    pub fn new(pool: presenca_db::DbPool, config: ServerConfig) -> Self {
        let roster = Roster::new(
            PgTemplateStore::new(pool.clone()),
            PgInstanceStore::new(pool.clone()),
            config.roster(),
        );
        Self {
            pool,
            config: Arc::new(config),
            roster: Arc::new(roster),
        }
    }
}
