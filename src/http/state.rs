//! Shared handler state.

use crate::db::repository::FullRepository;
use std::sync::Arc;

/// State cloned into every request handler. Cloning is cheap; the
/// repository handle is the only field and it is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FullRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self { repository }
    }
}
