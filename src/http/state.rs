use crate::studio::Studio;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub studio: Studio,
}

impl AppState {
    pub fn new(studio: Studio) -> Self {
        Self { studio }
    }
}
