use sqlx::MySqlPool;

use crate::realtime::Broadcaster;
use crate::services::client::ServiceClient;

/// Shared handler context: the database pool, the outbound service client
/// and the realtime broadcaster, all injected at construction time.
#[derive(Clone)]
pub struct AppState {
    pub pool: MySqlPool,
    pub services: ServiceClient,
    pub broadcaster: Broadcaster,
}

impl AppState {
    pub fn new(pool: MySqlPool, services: ServiceClient, broadcaster: Broadcaster) -> Self {
        Self {
            pool,
            services,
            broadcaster,
        }
    }
}
