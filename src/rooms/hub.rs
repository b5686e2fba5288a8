//! # Room Hub
//!
//! Maps document ids to the set of live connections currently viewing
//! that document and relays change events among them. Delivery is
//! best-effort: a subscriber that cannot be reached is counted and
//! pruned, never allowed to abort fan-out to the rest.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::errors::{RoomError, RoomResult};
use super::event::RoomEvent;

/// Identifies one live connection
pub type ConnectionId = String;

/// Event receiver handed to a connection on attach
pub type RoomReceiver = mpsc::UnboundedReceiver<RoomEvent>;

type RoomSender = mpsc::UnboundedSender<RoomEvent>;

/// Transport limits applied to publishers
#[derive(Debug, Clone)]
pub struct RoomLimits {
    /// Maximum payload size in bytes
    pub max_payload_size: usize,
    /// Maximum publishes per connection per second per room
    pub max_per_second: usize,
}

impl Default for RoomLimits {
    fn default() -> Self {
        Self {
            max_payload_size: 65536, // 64KB
            max_per_second: 50,
        }
    }
}

/// Result of publishing an event
#[derive(Debug, Default)]
pub struct PublishOutcome {
    /// Subscribers other than the origin known at call time
    pub matched: usize,
    /// Number of events handed to a live subscriber queue
    pub delivered: usize,
    /// Number of subscribers that were gone; pruned from the room
    pub failed: usize,
}

/// One room's state
#[derive(Debug)]
struct Room {
    subscribers: Mutex<HashSet<ConnectionId>>,

    /// Rate tracking per publisher (count, window start)
    rate_limits: Mutex<HashMap<ConnectionId, (usize, DateTime<Utc>)>>,
}

impl Room {
    fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashSet::new()),
            rate_limits: Mutex::new(HashMap::new()),
        }
    }

    fn check_rate_limit(&self, connection_id: &str, limits: &RoomLimits) -> RoomResult<()> {
        let now = Utc::now();

        let mut windows = self
            .rate_limits
            .lock()
            .map_err(|_| RoomError::Internal("lock poisoned".to_string()))?;

        let entry = windows.entry(connection_id.to_string()).or_insert((0, now));

        if (now - entry.1).num_seconds() >= 1 {
            entry.0 = 0;
            entry.1 = now;
        }

        if entry.0 >= limits.max_per_second {
            return Err(RoomError::RateLimitExceeded);
        }

        entry.0 += 1;
        Ok(())
    }
}

/// The room broadcast hub
///
/// One instance per process, passed by reference to whatever accepts
/// new connections. No ambient global.
#[derive(Debug, Default)]
pub struct RoomHub {
    /// Live connections and their delivery queues
    connections: RwLock<HashMap<ConnectionId, RoomSender>>,

    /// Rooms by document id, created lazily, dropped when empty
    rooms: RwLock<HashMap<String, Arc<Room>>>,

    /// Reverse index: which rooms each connection joined
    memberships: RwLock<HashMap<ConnectionId, HashSet<String>>>,

    limits: RoomLimits,
}

impl RoomHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: RoomLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Register a live connection and hand back its delivery queue.
    /// Re-attaching an id replaces its previous queue.
    pub fn attach(&self, connection_id: impl Into<ConnectionId>) -> RoomReceiver {
        let connection_id = connection_id.into();
        let (tx, rx) = mpsc::unbounded_channel();

        if let Ok(mut connections) = self.connections.write() {
            connections.insert(connection_id, tx);
        }

        rx
    }

    /// Remove a connection from every room it joined, then discard it.
    /// Called when a connection terminates, so no membership leaks.
    pub fn detach(&self, connection_id: &str) {
        let joined: Vec<String> = match self.memberships.write() {
            Ok(mut memberships) => memberships
                .remove(connection_id)
                .map(|rooms| rooms.into_iter().collect())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        };

        for document_id in &joined {
            self.leave_room(document_id, connection_id);
        }

        if let Ok(mut connections) = self.connections.write() {
            connections.remove(connection_id);
        }
    }

    /// Add a connection to a document's room, creating the room if
    /// absent. Idempotent. Document existence is not checked here:
    /// access is enforced at the data-fetch boundary, not at room join.
    pub fn subscribe(&self, document_id: &str, connection_id: &str) -> RoomResult<()> {
        {
            let connections = self
                .connections
                .read()
                .map_err(|_| RoomError::Internal("lock poisoned".to_string()))?;
            if !connections.contains_key(connection_id) {
                return Err(RoomError::UnknownConnection(connection_id.to_string()));
            }
        }

        let room = {
            let mut rooms = self
                .rooms
                .write()
                .map_err(|_| RoomError::Internal("lock poisoned".to_string()))?;
            rooms
                .entry(document_id.to_string())
                .or_insert_with(|| Arc::new(Room::new()))
                .clone()
        };

        if let Ok(mut subs) = room.subscribers.lock() {
            subs.insert(connection_id.to_string());
        }

        if let Ok(mut memberships) = self.memberships.write() {
            memberships
                .entry(connection_id.to_string())
                .or_default()
                .insert(document_id.to_string());
        }

        Ok(())
    }

    /// Remove a connection from a room; the room is discarded once its
    /// subscriber set empties.
    pub fn unsubscribe(&self, document_id: &str, connection_id: &str) {
        self.leave_room(document_id, connection_id);

        if let Ok(mut memberships) = self.memberships.write() {
            let now_empty = memberships
                .get_mut(connection_id)
                .map(|rooms| {
                    rooms.remove(document_id);
                    rooms.is_empty()
                })
                .unwrap_or(false);
            if now_empty {
                memberships.remove(connection_id);
            }
        }
    }

    /// Deliver a payload to every current subscriber of the document's
    /// room except the origin. Returns once delivery has been attempted
    /// to every subscriber known at call time; unreachable subscribers
    /// are counted and pruned, never fatal.
    pub fn publish(
        &self,
        document_id: &str,
        origin: &str,
        event: &str,
        payload: Value,
        sender_id: Option<Uuid>,
    ) -> RoomResult<PublishOutcome> {
        let payload_size = serde_json::to_string(&payload)
            .map(|s| s.len())
            .unwrap_or(0);
        if payload_size > self.limits.max_payload_size {
            return Err(RoomError::MessageTooLarge(self.limits.max_payload_size));
        }

        let room = {
            let rooms = self
                .rooms
                .read()
                .map_err(|_| RoomError::Internal("lock poisoned".to_string()))?;
            rooms.get(document_id).cloned()
        };

        // Publishing into a room nobody watches is a successful no-op
        let Some(room) = room else {
            return Ok(PublishOutcome::default());
        };

        room.check_rate_limit(origin, &self.limits)?;

        let outgoing = RoomEvent::new(document_id, event, payload, sender_id);

        let connections = self
            .connections
            .read()
            .map_err(|_| RoomError::Internal("lock poisoned".to_string()))?;

        // Holding the subscriber set across the fan-out serializes
        // publishes per room; each subscriber observes one room's
        // events in publish order.
        let mut subs = room
            .subscribers
            .lock()
            .map_err(|_| RoomError::Internal("lock poisoned".to_string()))?;

        let mut outcome = PublishOutcome::default();
        let mut dead: Vec<ConnectionId> = Vec::new();

        for subscriber in subs.iter() {
            if subscriber == origin {
                continue;
            }
            outcome.matched += 1;

            match connections.get(subscriber) {
                Some(sender) if sender.send(outgoing.clone()).is_ok() => {
                    outcome.delivered += 1;
                }
                _ => {
                    outcome.failed += 1;
                    dead.push(subscriber.clone());
                }
            }
        }

        for subscriber in &dead {
            subs.remove(subscriber);
        }
        drop(subs);
        drop(connections);

        if !dead.is_empty() {
            if let Ok(mut memberships) = self.memberships.write() {
                for subscriber in &dead {
                    let now_empty = memberships
                        .get_mut(subscriber)
                        .map(|rooms| {
                            rooms.remove(document_id);
                            rooms.is_empty()
                        })
                        .unwrap_or(false);
                    if now_empty {
                        memberships.remove(subscriber);
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// Number of live connections
    pub fn connection_count(&self) -> usize {
        self.connections.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Number of live rooms
    pub fn room_count(&self) -> usize {
        self.rooms.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Number of subscribers in one room
    pub fn subscriber_count(&self, document_id: &str) -> usize {
        let room = self
            .rooms
            .read()
            .ok()
            .and_then(|rooms| rooms.get(document_id).cloned());
        room.map(|r| r.subscribers.lock().map(|s| s.len()).unwrap_or(0))
            .unwrap_or(0)
    }

    fn leave_room(&self, document_id: &str, connection_id: &str) {
        let Ok(mut rooms) = self.rooms.write() else {
            return;
        };
        let Some(room) = rooms.get(document_id) else {
            return;
        };

        let empty = {
            let Ok(mut subs) = room.subscribers.lock() else {
                return;
            };
            subs.remove(connection_id);
            subs.is_empty()
        };

        if empty {
            rooms.remove(document_id);
        }
    }
}
