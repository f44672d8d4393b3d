pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::assessment::AssessmentEngine;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AssessmentEngine>,
}

impl AppState {
    pub fn new(engine: Arc<AssessmentEngine>) -> Self {
        Self { engine }
    }
}
