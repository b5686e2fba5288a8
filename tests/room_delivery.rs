//! Room Delivery Invariant Tests
//!
//! Tests for invariants:
//! - Room isolation: events for one document never reach subscribers
//!   of another
//! - Self-exclusion: a publish is never delivered back to its origin
//! - Per-subscriber ordering: one subscriber observes one document's
//!   publishes in publish order
//! - Connection termination removes every room membership

use serde_json::json;

use docvault::rooms::{RoomError, RoomHub, RoomLimits};

// =============================================================================
// Scenario: two rooms, three connections
// =============================================================================

#[tokio::test]
async fn test_room_isolation_and_self_exclusion() {
    let hub = RoomHub::new();
    let mut rx_a = hub.attach("conn-a");
    let mut rx_b = hub.attach("conn-b");
    let mut rx_c = hub.attach("conn-c");

    hub.subscribe("doc-42", "conn-a").unwrap();
    hub.subscribe("doc-42", "conn-b").unwrap();
    hub.subscribe("doc-99", "conn-c").unwrap();

    let outcome = hub
        .publish("doc-42", "conn-a", "cursor-move", json!({"line": 3}), None)
        .unwrap();
    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.delivered, 1);

    // B, in the same room, receives it
    let received = rx_b.recv().await.unwrap();
    assert_eq!(received.event, "cursor-move");
    assert_eq!(received.document_id, "doc-42");
    assert_eq!(received.payload["line"], 3);

    // The origin never hears its own publish
    assert!(rx_a.try_recv().is_err());

    // C, subscribed only to doc-99, receives nothing
    assert!(rx_c.try_recv().is_err());
}

// =============================================================================
// Per-subscriber ordering
// =============================================================================

#[tokio::test]
async fn test_per_subscriber_ordering() {
    let hub = RoomHub::new();
    let _rx_a = hub.attach("conn-a");
    let mut rx_b = hub.attach("conn-b");

    hub.subscribe("doc-1", "conn-a").unwrap();
    hub.subscribe("doc-1", "conn-b").unwrap();

    for seq in 0..20 {
        hub.publish("doc-1", "conn-a", "edit", json!({ "seq": seq }), None)
            .unwrap();
    }

    for expected in 0..20 {
        let event = rx_b.recv().await.unwrap();
        assert_eq!(event.payload["seq"], expected);
    }
}

// =============================================================================
// Membership lifecycle
// =============================================================================

#[tokio::test]
async fn test_unsubscribed_connection_stops_receiving() {
    let hub = RoomHub::new();
    let _rx_a = hub.attach("conn-a");
    let mut rx_b = hub.attach("conn-b");

    hub.subscribe("doc-1", "conn-a").unwrap();
    hub.subscribe("doc-1", "conn-b").unwrap();
    hub.unsubscribe("doc-1", "conn-b");

    let outcome = hub
        .publish("doc-1", "conn-a", "edit", json!({}), None)
        .unwrap();
    assert_eq!(outcome.matched, 0);
    assert!(rx_b.try_recv().is_err());
}

#[tokio::test]
async fn test_detach_removes_all_memberships() {
    let hub = RoomHub::new();
    let _rx_a = hub.attach("conn-a");
    let _rx_b = hub.attach("conn-b");

    hub.subscribe("doc-1", "conn-a").unwrap();
    hub.subscribe("doc-2", "conn-a").unwrap();
    hub.subscribe("doc-3", "conn-a").unwrap();
    hub.subscribe("doc-1", "conn-b").unwrap();

    assert_eq!(hub.room_count(), 3);

    hub.detach("conn-a");

    // Rooms where conn-a was the last subscriber are discarded
    assert_eq!(hub.room_count(), 1);
    assert_eq!(hub.subscriber_count("doc-1"), 1);
    assert_eq!(hub.connection_count(), 1);

    // A detached connection cannot rejoin without re-attaching
    assert!(matches!(
        hub.subscribe("doc-1", "conn-a"),
        Err(RoomError::UnknownConnection(_))
    ));
}

#[tokio::test]
async fn test_resubscribe_after_detach() {
    let hub = RoomHub::new();
    let _rx = hub.attach("conn-a");
    hub.subscribe("doc-1", "conn-a").unwrap();
    hub.detach("conn-a");

    let mut rx = hub.attach("conn-a");
    hub.subscribe("doc-1", "conn-a").unwrap();

    let _rx_b = hub.attach("conn-b");
    hub.subscribe("doc-1", "conn-b").unwrap();
    hub.publish("doc-1", "conn-b", "hello", json!({}), None)
        .unwrap();

    assert_eq!(rx.recv().await.unwrap().event, "hello");
}

// =============================================================================
// Publisher limits
// =============================================================================

#[tokio::test]
async fn test_rate_limit_is_per_room_window() {
    let hub = RoomHub::with_limits(RoomLimits {
        max_per_second: 2,
        ..Default::default()
    });
    let _rx = hub.attach("conn-a");
    hub.subscribe("doc-1", "conn-a").unwrap();
    hub.subscribe("doc-2", "conn-a").unwrap();

    hub.publish("doc-1", "conn-a", "m", json!({}), None).unwrap();
    hub.publish("doc-1", "conn-a", "m", json!({}), None).unwrap();
    assert!(matches!(
        hub.publish("doc-1", "conn-a", "m", json!({}), None),
        Err(RoomError::RateLimitExceeded)
    ));

    // Windows are tracked per room
    assert!(hub.publish("doc-2", "conn-a", "m", json!({}), None).is_ok());
}
