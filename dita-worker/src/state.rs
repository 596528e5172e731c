use std::sync::Arc;

use crate::worker::Worker;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub worker: Arc<Worker>,
}

impl AppState {
    pub fn new(worker: Arc<Worker>) -> Self {
        AppState { worker }
    }
}
