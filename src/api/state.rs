//! Application state shared by handlers

use crate::RecapRuntime;

/// Application state; cloning is cheap
#[derive(Debug, Clone)]
pub struct AppState {
    pub runtime: RecapRuntime,
}

impl AppState {
    pub fn new(runtime: RecapRuntime) -> Self {
        Self { runtime }
    }
}
