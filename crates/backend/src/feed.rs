//! Owner-scoped change-feed broadcasting.

use std::{collections::HashMap, sync::RwLock};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::ChangeEvent;

/// Capacity for change-feed broadcast channels.
const CHANNEL_CAPACITY: usize = 256;

/// One broadcast channel per owner. Subscribers only ever see events for
/// their own rows, which is the server-side filtering the stores rely on.
#[derive(Debug)]
pub(crate) struct OwnerFeed<R> {
    senders: RwLock<HashMap<Uuid, broadcast::Sender<ChangeEvent<R>>>>,
}

impl<R: Clone> OwnerFeed<R> {
    /// Creates a feed with no subscribers.
    pub(crate) fn new() -> Self {
        Self {
            senders: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribes to changes for one owner's rows.
    pub(crate) fn subscribe(&self, owner_id: Uuid) -> broadcast::Receiver<ChangeEvent<R>> {
        let mut senders = self.senders.write().unwrap();

        let sender = senders
            .entry(owner_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);

        sender.subscribe()
    }

    /// Publishes an event to one owner's subscribers.
    pub(crate) fn publish(&self, owner_id: Uuid, event: ChangeEvent<R>) {
        let senders = self.senders.read().unwrap();

        if let Some(sender) = senders.get(&owner_id) {
            // Ignore send errors (no subscribers)
            let _ = sender.send(event);
        }
    }
}

impl<R: Clone> Default for OwnerFeed<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_and_publish() {
        let feed: OwnerFeed<u32> = OwnerFeed::new();
        let owner = Uuid::new_v4();

        let mut rx = feed.subscribe(owner);
        feed.publish(
            owner,
            ChangeEvent::Deleted {
                id: Uuid::new_v4(),
                owner_id: owner,
            },
        );

        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_no_cross_owner_events() {
        let feed: OwnerFeed<u32> = OwnerFeed::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let mut alice_rx = feed.subscribe(alice);
        let _bob_rx = feed.subscribe(bob);

        feed.publish(
            bob,
            ChangeEvent::Deleted {
                id: Uuid::new_v4(),
                owner_id: bob,
            },
        );

        assert!(alice_rx.try_recv().is_err());
    }
}
