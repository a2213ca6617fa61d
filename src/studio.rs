use std::sync::Arc;
use tokio::sync::broadcast;

use crate::capture::MediaBackend;
use crate::config::Config;
use crate::events::{EventBus, StudioEvent};
use crate::platform::PlatformRegistry;
use crate::session::SessionController;

/// One studio: a session controller and platform registry sharing an event bus
///
/// Callers are expected to have passed the membership check already; nothing
/// in here performs authorization.
#[derive(Clone)]
pub struct Studio {
    controller: SessionController,
    platforms: PlatformRegistry,
    events: EventBus,
}

impl Studio {
    pub fn new(config: &Config, backend: Arc<dyn MediaBackend>) -> Self {
        let events = EventBus::new();
        let controller = SessionController::new(backend, config.session_config(), events.clone());
        let platforms = PlatformRegistry::new(config.connect_placeholder(), events.clone());

        Self {
            controller,
            platforms,
            events,
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn platforms(&self) -> &PlatformRegistry {
        &self.platforms
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.events.subscribe()
    }
}
