use std::sync::Arc;

use crate::auth::SessionValidator;
use crate::database::store::DietarySettingsStore;

/// Dependencies shared by every handler. Built once by the entry point.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DietarySettingsStore>,
    pub sessions: Arc<dyn SessionValidator>,
}

impl AppState {
    pub fn new(store: Arc<dyn DietarySettingsStore>, sessions: Arc<dyn SessionValidator>) -> Self {
        Self { store, sessions }
    }
}
