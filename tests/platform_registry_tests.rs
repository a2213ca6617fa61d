// Integration tests for platform connect intents
//
// No platform integration exists yet, so every connect request is a
// placeholder round trip: disconnected -> connecting -> disconnected.

use std::time::Duration;
use stream_studio::platform::DEFAULT_CONNECT_PLACEHOLDER;
use stream_studio::{
    CaptureError, ConnectionState, ErrorKind, EventBus, PlatformId, PlatformRegistry, StudioEvent,
};
use tokio::sync::broadcast;

fn setup() -> (PlatformRegistry, broadcast::Receiver<StudioEvent>) {
    let events = EventBus::new();
    let rx = events.subscribe();
    (PlatformRegistry::new(DEFAULT_CONNECT_PLACEHOLDER, events), rx)
}

fn drain(rx: &mut broadcast::Receiver<StudioEvent>) -> Vec<StudioEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn unimplemented_count(events: &[StudioEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, StudioEvent::Error { kind: ErrorKind::Unimplemented, .. }))
        .count()
}

fn platform_states(events: &[StudioEvent], platform: PlatformId) -> Vec<ConnectionState> {
    events
        .iter()
        .filter_map(|e| match e {
            StudioEvent::Platform { platform: p, state } if *p == platform => Some(*state),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_all_platforms_start_disconnected() {
    let (registry, _rx) = setup();

    let entries = registry.entries();
    assert_eq!(entries.len(), PlatformId::ALL.len());
    assert!(entries.iter().all(|e| e.state == ConnectionState::Disconnected));

    let platforms: Vec<PlatformId> = entries.iter().map(|e| e.platform).collect();
    assert_eq!(platforms, PlatformId::ALL.to_vec());
}

#[tokio::test(start_paused = true)]
async fn test_connect_round_trip_falls_back_to_disconnected() {
    let (registry, mut rx) = setup();

    assert!(registry.request_connect(PlatformId::Twitch));
    assert_eq!(registry.state(PlatformId::Twitch), ConnectionState::Connecting);

    let events = drain(&mut rx);
    assert_eq!(platform_states(&events, PlatformId::Twitch), vec![ConnectionState::Connecting]);
    assert_eq!(unimplemented_count(&events), 1);

    tokio::time::sleep(DEFAULT_CONNECT_PLACEHOLDER + Duration::from_millis(10)).await;

    let events = drain(&mut rx);
    assert_eq!(platform_states(&events, PlatformId::Twitch), vec![ConnectionState::Disconnected]);
    assert_eq!(unimplemented_count(&events), 0);
    assert_eq!(registry.state(PlatformId::Twitch), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_connect_while_pending_is_ignored() {
    let (registry, mut rx) = setup();

    assert!(registry.request_connect(PlatformId::Youtube));
    assert!(!registry.request_connect(PlatformId::Youtube));

    let events = drain(&mut rx);
    assert_eq!(unimplemented_count(&events), 1);

    // Other platforms are independent
    assert!(registry.request_connect(PlatformId::Tiktok));
    assert_eq!(registry.state(PlatformId::Tiktok), ConnectionState::Connecting);
    assert_eq!(registry.state(PlatformId::Facebook), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_each_request_signals_unimplemented_once() {
    let (registry, mut rx) = setup();

    for _ in 0..3 {
        assert!(registry.request_connect(PlatformId::Instagram));
        tokio::time::sleep(DEFAULT_CONNECT_PLACEHOLDER * 2).await;
    }

    let events = drain(&mut rx);
    assert_eq!(unimplemented_count(&events), 3);
    assert!(!platform_states(&events, PlatformId::Instagram).contains(&ConnectionState::Connected));
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_cancels_pending_connect() {
    let (registry, mut rx) = setup();

    registry.request_connect(PlatformId::Facebook);
    let entry = registry.request_disconnect(PlatformId::Facebook);
    assert_eq!(entry.state, ConnectionState::Disconnected);

    tokio::time::sleep(DEFAULT_CONNECT_PLACEHOLDER * 2).await;

    let events = drain(&mut rx);
    assert_eq!(
        platform_states(&events, PlatformId::Facebook),
        vec![ConnectionState::Connecting, ConnectionState::Disconnected]
    );

    // A fresh request works right away
    assert!(registry.request_connect(PlatformId::Facebook));
}

#[tokio::test]
async fn test_disconnect_when_idle_emits_nothing() {
    let (registry, mut rx) = setup();

    let entry = registry.request_disconnect(PlatformId::Twitch);

    assert_eq!(entry.state, ConnectionState::Disconnected);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_platform_names() {
    assert_eq!("tiktok".parse::<PlatformId>().unwrap(), PlatformId::Tiktok);
    assert_eq!(PlatformId::Youtube.display_name(), "YouTube");
    assert!(matches!(
        "myspace".parse::<PlatformId>(),
        Err(CaptureError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_unimplemented_message_names_platform() {
    let e = CaptureError::Unimplemented(PlatformId::Twitch);
    assert_eq!(e.kind(), ErrorKind::Unimplemented);
    assert_eq!(e.user_message(), "Twitch connections are coming soon.");
}
