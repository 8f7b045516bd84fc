use crate::config::ServerConfig;
use crate::menu::Catalog;
use crate::orders::{OrderIdGenerator, OrderLog, TracingOrderLog};

/// Everything request handlers need, shared by all worker threads.
///
/// Nothing in here is mutated after startup except the order id counter, which is atomic.
pub struct AppState {
    pub catalog: Catalog,
    pub config: ServerConfig,
    pub order_ids: OrderIdGenerator,
    pub order_log: Box<dyn OrderLog>,
}

impl AppState {
    /// State used by the server binary: the standard menu, orders written to the log
    pub fn new(config: ServerConfig) -> AppState {
        AppState::with_order_log(config, Box::new(TracingOrderLog))
    }

    pub fn with_order_log(config: ServerConfig, order_log: Box<dyn OrderLog>) -> AppState {
        AppState {
            catalog: Catalog::standard(),
            config,
            order_ids: OrderIdGenerator::new(),
            order_log,
        }
    }
}
