use crate::config::Config;
use crate::db::DbPool;
use crate::notify::Notifier;
use crate::workflow::engine::WorkflowEngine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub engine: WorkflowEngine,
    pub notifier: Notifier,
}
