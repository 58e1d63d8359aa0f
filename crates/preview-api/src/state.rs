use std::sync::Arc;

use preview_core::services::{AccessController, CacheSlotManager, SessionManager};

use crate::templates::Templates;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub access: Arc<AccessController>,
    pub slots: Arc<CacheSlotManager>,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionManager>, slots: Arc<CacheSlotManager>, templates: Templates) -> Self {
        Self {
            access: Arc::new(AccessController::new(sessions.clone())),
            sessions,
            slots,
            templates: Arc::new(templates),
        }
    }
}
