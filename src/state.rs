use std::sync::Arc;

use crate::config::Config;
use crate::db::PollStore;
use crate::poll::ListQuery;

/// Shared by every handler through axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PollStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn PollStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn index_query(&self) -> ListQuery {
        ListQuery {
            limit: self.config.index_limit,
            allow_empty: self.config.allow_empty_index,
        }
    }
}
