use std::sync::Arc;

use domain_messages::{HttpUpstreamSender, PgMessageRepository, QueryService, RelayerJob};
use redis::aio::ConnectionManager;
use sea_orm::DatabaseConnection;

use crate::scheduler::Scheduler;

pub type RelayerScheduler = Scheduler<RelayerJob<PgMessageRepository, HttpUpstreamSender>>;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: ConnectionManager,
    pub query_service: Arc<QueryService>,
    pub scheduler: Arc<RelayerScheduler>,
}
