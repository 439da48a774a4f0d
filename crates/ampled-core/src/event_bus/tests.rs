use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn counting_callback() -> (EventCallback, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let callback: EventCallback = Arc::new(move |_event: &Event| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (callback, hits)
}

#[test]
fn test_publish_reaches_subscribed_kind_only() {
    let bus = EventBus::new(16);
    let (callback, hits) = counting_callback();
    bus.subscribe(&[EventKind::StartTalking], callback);

    assert_eq!(bus.publish(Event::new(EventKind::StartTalking)), 1);
    assert_eq!(bus.publish(Event::new(EventKind::StopTalking)), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_duplicate_subscribe_is_ignored() {
    let bus = EventBus::new(16);
    let (callback, hits) = counting_callback();
    bus.subscribe(&vocabulary(), Arc::clone(&callback));
    bus.subscribe(&vocabulary(), callback);

    assert_eq!(bus.callback_count(&EventKind::MusicStatus), 1);
    bus.publish(Event::music_status("play"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unsubscribe_matches_by_identity() {
    let bus = EventBus::new(16);
    let (first, first_hits) = counting_callback();
    let (second, second_hits) = counting_callback();
    bus.subscribe(&[EventKind::StartRecord], Arc::clone(&first));
    bus.subscribe(&[EventKind::StartRecord], Arc::clone(&second));

    bus.unsubscribe(&[EventKind::StartRecord], &first);
    bus.publish(Event::new(EventKind::StartRecord));

    assert_eq!(first_hits.load(Ordering::SeqCst), 0);
    assert_eq!(second_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_callback_may_unsubscribe_itself() {
    let bus = Arc::new(EventBus::new(16));
    let slot: Arc<std::sync::Mutex<Option<EventCallback>>> = Arc::default();

    let bus_ref = Arc::clone(&bus);
    let slot_ref = Arc::clone(&slot);
    let callback: EventCallback = Arc::new(move |_event: &Event| {
        if let Some(me) = slot_ref.lock().unwrap().take() {
            bus_ref.unsubscribe(&[EventKind::StopRecord], &me);
        }
    });
    *slot.lock().unwrap() = Some(Arc::clone(&callback));
    bus.subscribe(&[EventKind::StopRecord], callback);

    assert_eq!(bus.publish(Event::new(EventKind::StopRecord)), 1);
    assert_eq!(bus.publish(Event::new(EventKind::StopRecord)), 0);
}

#[tokio::test]
async fn test_observers_receive_events_in_order() {
    let bus = EventBus::new(16);
    let mut rx = bus.observe();
    assert_eq!(bus.observer_count(), 1);

    bus.publish(Event::new(EventKind::StartTalking));
    bus.publish(Event::music_status("play"));

    assert_eq!(rx.recv().await.unwrap().kind, EventKind::StartTalking);
    let second = rx.recv().await.unwrap();
    assert_eq!(second.kind, EventKind::MusicStatus);
    assert_eq!(second.payload_str(), Some("play"));
}

#[test]
fn test_event_kind_names_round_trip() {
    for kind in vocabulary() {
        assert_eq!(EventKind::from(kind.as_str()), kind);
    }
    assert_eq!(
        EventKind::from("ask_again"),
        EventKind::Other("ask_again".to_string())
    );
}

#[test]
fn test_event_serialization() {
    let event = Event::music_status("play");
    let json = serde_json::to_string(&event).unwrap();
    assert_eq!(json, r#"{"name":"music_status","payload":"play"}"#);

    let parsed: Event = serde_json::from_str(r#"{"name":"volume"}"#).unwrap();
    assert_eq!(parsed.kind, EventKind::Other("volume".to_string()));
    assert!(parsed.payload.is_none());
}
