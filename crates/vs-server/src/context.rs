//! Shared application state handed to every handler.

use std::sync::Arc;

use vs_core::config::Config;
use vs_db::pool::DbPool;

#[derive(Clone)]
pub struct AppContext {
    pub db: DbPool,
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}
