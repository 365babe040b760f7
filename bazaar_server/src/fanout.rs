//! The in-process connection fan-out registry.
//!
//! A process-wide map of chat id → participant id → live connection handle, shared by every
//! websocket task. Delivery is best effort and independent of persistence: a disconnected
//! participant simply fetches missed messages later through the ordinary message-list read path.
//!
//! Each registered handle is the sending half of an unbounded channel drained by that connection's
//! writer task, so register/unregister/broadcast each take the lock exactly once and never await
//! while holding it.

use std::{
    collections::HashMap,
    sync::Mutex,
};

use log::*;
use tokio::sync::mpsc::UnboundedSender;

use crate::data_objects::ChatEvent;

type ChatConnections = HashMap<i64, UnboundedSender<ChatEvent>>;

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<i64, ChatConnections>>,
}

impl ConnectionRegistry {
    /// Adds a connection for the participant, creating the chat entry if needed. A reconnecting
    /// participant replaces their previous handle.
    pub fn register(&self, chat_id: i64, participant_id: i64, sender: UnboundedSender<ChatEvent>) {
        let mut connections = self.connections.lock().unwrap();
        connections.entry(chat_id).or_default().insert(participant_id, sender);
        trace!("📡️ Participant {participant_id} connected to chat {chat_id}");
    }

    /// Removes the participant's connection. The chat entry is removed entirely once its last
    /// participant disconnects, so the map never holds empty sets.
    pub fn unregister(&self, chat_id: i64, participant_id: i64) {
        let mut connections = self.connections.lock().unwrap();
        if let Some(chat) = connections.get_mut(&chat_id) {
            chat.remove(&participant_id);
            if chat.is_empty() {
                connections.remove(&chat_id);
            }
        }
        trace!("📡️ Participant {participant_id} disconnected from chat {chat_id}");
    }

    /// Delivers the event to every currently-connected participant of the chat except `exclude`.
    /// A chat with no connections is a no-op. Dead handles are dropped from the registry as they
    /// are discovered; the failure never propagates to the caller.
    pub fn broadcast(&self, chat_id: i64, event: &ChatEvent, exclude: Option<i64>) {
        let mut connections = self.connections.lock().unwrap();
        let Some(chat) = connections.get_mut(&chat_id) else {
            return;
        };
        let mut dead = Vec::new();
        for (&participant_id, sender) in chat.iter() {
            if exclude == Some(participant_id) {
                continue;
            }
            if sender.send(event.clone()).is_err() {
                debug!("📡️ Dropping dead connection for participant {participant_id} in chat {chat_id}");
                dead.push(participant_id);
            }
        }
        for participant_id in dead {
            chat.remove(&participant_id);
        }
        if chat.is_empty() {
            connections.remove(&chat_id);
        }
    }

    /// Unicast delivery. A no-op if the participant is not currently connected.
    pub fn send_to_one(&self, chat_id: i64, participant_id: i64, event: &ChatEvent) {
        let connections = self.connections.lock().unwrap();
        if let Some(sender) = connections.get(&chat_id).and_then(|chat| chat.get(&participant_id)) {
            if sender.send(event.clone()).is_err() {
                debug!("📡️ Participant {participant_id} in chat {chat_id} is no longer reachable");
            }
        }
    }

    #[cfg(test)]
    fn connection_count(&self, chat_id: i64) -> usize {
        self.connections.lock().unwrap().get(&chat_id).map(HashMap::len).unwrap_or(0)
    }

    #[cfg(test)]
    fn has_chat_entry(&self, chat_id: i64) -> bool {
        self.connections.lock().unwrap().contains_key(&chat_id)
    }
}

#[cfg(test)]
mod test {
    use bazaar_engine::db_types::{Principal, Role};
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    use super::*;

    fn event(user_id: i64) -> ChatEvent {
        let principal = Principal { id: user_id, username: format!("u{user_id}"), role: Role::User, active: true };
        ChatEvent::presence(&principal, true)
    }

    fn connect(registry: &ConnectionRegistry, chat_id: i64, user_id: i64) -> UnboundedReceiver<ChatEvent> {
        let (tx, rx) = unbounded_channel();
        registry.register(chat_id, user_id, tx);
        rx
    }

    #[test]
    fn broadcast_excludes_the_sender() {
        let registry = ConnectionRegistry::default();
        let mut rx_a = connect(&registry, 1, 10);
        let mut rx_b = connect(&registry, 1, 20);

        registry.broadcast(1, &event(10), Some(10));
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());

        registry.broadcast(1, &event(10), None);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn broadcast_to_unknown_chat_is_a_no_op() {
        let registry = ConnectionRegistry::default();
        registry.broadcast(42, &event(1), None);
        assert!(!registry.has_chat_entry(42));
    }

    #[test]
    fn unregister_removes_empty_chat_entries() {
        let registry = ConnectionRegistry::default();
        let _rx_a = connect(&registry, 1, 10);
        let _rx_b = connect(&registry, 1, 20);
        assert_eq!(registry.connection_count(1), 2);

        registry.unregister(1, 10);
        assert_eq!(registry.connection_count(1), 1);
        assert!(registry.has_chat_entry(1));

        registry.unregister(1, 20);
        assert!(!registry.has_chat_entry(1));
    }

    #[test]
    fn dead_connections_are_pruned_on_broadcast() {
        let registry = ConnectionRegistry::default();
        let rx_a = connect(&registry, 1, 10);
        let mut rx_b = connect(&registry, 1, 20);

        drop(rx_a);
        registry.broadcast(1, &event(20), None);
        assert_eq!(registry.connection_count(1), 1);
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn send_to_one_targets_a_single_participant() {
        let registry = ConnectionRegistry::default();
        let mut rx_a = connect(&registry, 1, 10);
        let mut rx_b = connect(&registry, 1, 20);

        registry.send_to_one(1, 20, &event(10));
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());

        // Unknown participant: nothing happens
        registry.send_to_one(1, 99, &event(10));
    }
}
