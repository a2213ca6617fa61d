use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

use super::{ConnectionState, PlatformId};
use crate::error::CaptureError;
use crate::events::{EventBus, StudioEvent};

/// How long a connect request stays pending before falling back
pub const DEFAULT_CONNECT_PLACEHOLDER: Duration = Duration::from_secs(2);

/// Snapshot of one platform's connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformEntry {
    pub platform: PlatformId,
    pub state: ConnectionState,
}

struct Slot {
    state: ConnectionState,
    attempt: u64,
    pending: Option<JoinHandle<()>>,
}

struct Shared {
    slots: Mutex<BTreeMap<PlatformId, Slot>>,
    events: EventBus,
    placeholder_delay: Duration,
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Ok(slots) = self.slots.get_mut() {
            for slot in slots.values_mut() {
                if let Some(pending) = slot.pending.take() {
                    pending.abort();
                }
            }
        }
    }
}

/// Connection state for every supported platform
#[derive(Clone)]
pub struct PlatformRegistry {
    shared: Arc<Shared>,
}

impl PlatformRegistry {
    pub fn new(placeholder_delay: Duration, events: EventBus) -> Self {
        let slots = PlatformId::ALL
            .into_iter()
            .map(|platform| {
                (
                    platform,
                    Slot {
                        state: ConnectionState::Disconnected,
                        attempt: 0,
                        pending: None,
                    },
                )
            })
            .collect();

        Self {
            shared: Arc::new(Shared {
                slots: Mutex::new(slots),
                events,
                placeholder_delay,
            }),
        }
    }

    /// Begin connecting a platform
    ///
    /// Returns `false` if a request for this platform is already pending.
    /// Must be called from within a tokio runtime.
    pub fn request_connect(&self, platform: PlatformId) -> bool {
        let mut slots = self.lock();
        let Some(slot) = slots.get_mut(&platform) else {
            return false;
        };

        if slot.state == ConnectionState::Connecting {
            info!("Connect for {} already pending", platform);
            return false;
        }

        slot.attempt += 1;
        slot.state = ConnectionState::Connecting;
        let attempt = slot.attempt;

        info!("Platform connect requested: {}", platform);

        let events = &self.shared.events;
        events.publish(StudioEvent::Platform {
            platform,
            state: ConnectionState::Connecting,
        });
        events.publish(StudioEvent::error(&CaptureError::Unimplemented(platform)));

        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let delay = self.shared.placeholder_delay;
        slot.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = shared.upgrade() {
                PlatformRegistry { shared }.finish_placeholder(platform, attempt);
            }
        }));

        true
    }

    /// Drop any connection or pending request for a platform
    pub fn request_disconnect(&self, platform: PlatformId) -> PlatformEntry {
        let mut slots = self.lock();
        let slot = slots.entry(platform).or_insert(Slot {
            state: ConnectionState::Disconnected,
            attempt: 0,
            pending: None,
        });

        if let Some(pending) = slot.pending.take() {
            pending.abort();
        }
        slot.attempt += 1;

        if slot.state != ConnectionState::Disconnected {
            info!("Platform disconnected: {}", platform);
            slot.state = ConnectionState::Disconnected;
            self.shared.events.publish(StudioEvent::Platform {
                platform,
                state: ConnectionState::Disconnected,
            });
        }

        PlatformEntry {
            platform,
            state: slot.state,
        }
    }

    pub fn state(&self, platform: PlatformId) -> ConnectionState {
        self.lock()
            .get(&platform)
            .map(|slot| slot.state)
            .unwrap_or(ConnectionState::Disconnected)
    }

    pub fn entries(&self) -> Vec<PlatformEntry> {
        self.lock()
            .iter()
            .map(|(platform, slot)| PlatformEntry {
                platform: *platform,
                state: slot.state,
            })
            .collect()
    }

    fn finish_placeholder(&self, platform: PlatformId, attempt: u64) {
        let mut slots = self.lock();
        let Some(slot) = slots.get_mut(&platform) else {
            return;
        };

        if slot.attempt != attempt || slot.state != ConnectionState::Connecting {
            return;
        }

        // No OAuth round trip exists yet, fall back to disconnected
        info!("Platform connect for {} is not available yet", platform);
        slot.state = ConnectionState::Disconnected;
        slot.pending = None;
        self.shared.events.publish(StudioEvent::Platform {
            platform,
            state: ConnectionState::Disconnected,
        });
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PlatformId, Slot>> {
        self.shared.slots.lock().unwrap()
    }
}
