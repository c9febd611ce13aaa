//! Live message channels.
//!
//! A [`MessageChannel`] multiplexes the message table into per-channel-key
//! live feeds.  Delivery is full-snapshot: every append publishes the
//! complete, ascending-ordered message list for that key, so subscribers
//! never merge deltas.  `tokio::sync::watch` carries the feeds; its
//! last-value-wins semantics are exactly the snapshot contract.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::debug;

use duet_shared::{ChannelKey, UserId};
use duet_store::{Database, Message};

use crate::error::{ClientError, Result};
use crate::SharedDb;

/// The complete, ordered message list of one channel at one point in time.
pub type Snapshot = Arc<Vec<Message>>;

struct Inner {
    db: SharedDb,
    feeds: Mutex<HashMap<ChannelKey, watch::Sender<Snapshot>>>,
}

/// Handle for opening subscriptions and appending messages.
///
/// Cheap to clone; all clones share the same feeds.
#[derive(Clone)]
pub struct MessageChannel {
    inner: Arc<Inner>,
}

impl MessageChannel {
    pub fn new(db: SharedDb) -> Self {
        Self {
            inner: Arc::new(Inner {
                db,
                feeds: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Open a live subscription to a channel.
    ///
    /// The subscription is primed with the current snapshot and then receives
    /// a fresh full snapshot after every append.  Channels may be re-opened
    /// any number of times; dropping the handle closes it.
    pub fn open(&self, key: &ChannelKey) -> Result<Subscription> {
        let rx = {
            // Lock order is always db, then feeds.  Holding the db guard
            // until the feed exists keeps the priming snapshot current: a
            // concurrent send cannot slip between the read and the insert.
            let db = self.db()?;
            let mut feeds = self.feeds()?;
            match feeds.get(key) {
                Some(tx) => tx.subscribe(),
                None => {
                    let snapshot: Snapshot = Arc::new(db.messages_for_channel(key)?);
                    let (tx, rx) = watch::channel(snapshot);
                    feeds.insert(key.clone(), tx);
                    rx
                }
            }
        };

        debug!(channel = %key, "subscription opened");
        Ok(Subscription {
            key: key.clone(),
            rx,
        })
    }

    /// Append a message and fan the new snapshot out to subscribers.
    ///
    /// Empty text is rejected locally before the store is touched.  A failed
    /// append is surfaced as-is; nothing is retried or re-sent.
    pub fn send(&self, key: &ChannelKey, sender_id: &UserId, text: &str) -> Result<Message> {
        if text.trim().is_empty() {
            return Err(ClientError::EmptyMessage);
        }

        let db = self.db()?;
        let message = db.append_message(key, sender_id, text)?;
        let snapshot: Snapshot = Arc::new(db.messages_for_channel(key)?);

        // Publish while the db guard is still held: append, snapshot read,
        // and fan-out form one atomic step, so concurrent sends can never
        // deliver an older snapshot after a newer one.
        let mut feeds = self.feeds()?;
        let prune = match feeds.get(key) {
            Some(tx) if tx.receiver_count() > 0 => {
                tx.send_replace(snapshot);
                false
            }
            // No observers left; drop the dead feed instead of updating it.
            // The next open() re-primes from the store.
            Some(_) => true,
            None => false,
        };
        if prune {
            feeds.remove(key);
        }

        Ok(message)
    }

    /// Number of currently open subscriptions for a channel.
    pub fn subscriber_count(&self, key: &ChannelKey) -> usize {
        match self.inner.feeds.lock() {
            Ok(feeds) => feeds.get(key).map(|tx| tx.receiver_count()).unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// Number of channels with a live feed.
    pub fn feed_count(&self) -> usize {
        match self.inner.feeds.lock() {
            Ok(feeds) => feeds.len(),
            Err(_) => 0,
        }
    }

    fn db(&self) -> Result<MutexGuard<'_, Database>> {
        self.inner.db.lock().map_err(|_| ClientError::LockPoisoned)
    }

    fn feeds(&self) -> Result<MutexGuard<'_, HashMap<ChannelKey, watch::Sender<Snapshot>>>> {
        self.inner.feeds.lock().map_err(|_| ClientError::LockPoisoned)
    }
}

/// A live subscription to one channel.
///
/// Closing is dropping: once the handle is gone no further deliveries occur
/// for it.  Messages within the channel are always observed in ascending
/// store-assigned order.
pub struct Subscription {
    key: ChannelKey,
    rx: watch::Receiver<Snapshot>,
}

impl Subscription {
    /// The channel this subscription observes.
    pub fn channel_key(&self) -> &ChannelKey {
        &self.key
    }

    /// The current snapshot, without waiting.
    pub fn snapshot(&self) -> Snapshot {
        self.rx.borrow().clone()
    }

    /// Wait for the next full-snapshot delivery.
    ///
    /// Resolves immediately if a delivery arrived since the last call.
    /// Returns [`ClientError::SubscriptionClosed`] if the channel side has
    /// gone away.
    pub async fn changed(&mut self) -> Result<Snapshot> {
        self.rx
            .changed()
            .await
            .map_err(|_| ClientError::SubscriptionClosed)?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_db;

    fn channel() -> MessageChannel {
        MessageChannel::new(shared_db(Database::open_in_memory().unwrap()))
    }

    fn key(a: &str, b: &str) -> ChannelKey {
        ChannelKey::derive(&UserId::from(a), &UserId::from(b))
    }

    #[tokio::test]
    async fn snapshots_arrive_in_order_for_both_observers() {
        let chan = channel();
        let ab = key("u1", "u2");
        let a = UserId::from("u1");
        let b = UserId::from("u2");

        // Both participants observe the same channel.
        let mut sub_a = chan.open(&ab).unwrap();
        let mut sub_b = chan.open(&ab).unwrap();
        assert!(sub_a.snapshot().is_empty());

        chan.send(&ab, &a, "hello").unwrap();
        chan.send(&ab, &b, "hi").unwrap();

        for sub in [&mut sub_a, &mut sub_b] {
            let snapshot = sub.changed().await.unwrap();
            let texts: Vec<&str> = snapshot.iter().map(|m| m.text.as_str()).collect();
            assert_eq!(texts, vec!["hello", "hi"]);
        }
    }

    #[tokio::test]
    async fn each_delivery_is_a_full_snapshot() {
        let chan = channel();
        let ab = key("u1", "u2");
        let a = UserId::from("u1");

        let mut sub = chan.open(&ab).unwrap();

        chan.send(&ab, &a, "one").unwrap();
        let first = sub.changed().await.unwrap();
        assert_eq!(first.len(), 1);

        chan.send(&ab, &a, "two").unwrap();
        let second = sub.changed().await.unwrap();
        // Not a delta: the second delivery repeats the first message.
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].text, "one");
        assert_eq!(second[1].text, "two");
    }

    #[test]
    fn reopen_primes_with_existing_history() {
        let chan = channel();
        let ab = key("u1", "u2");
        let a = UserId::from("u1");

        chan.send(&ab, &a, "before any subscriber").unwrap();

        let sub = chan.open(&ab).unwrap();
        assert_eq!(sub.snapshot().len(), 1);

        drop(sub);
        assert_eq!(chan.subscriber_count(&ab), 0);

        // Re-openable: a fresh subscription sees the same history.
        let again = chan.open(&ab).unwrap();
        assert_eq!(again.snapshot().len(), 1);
    }

    #[test]
    fn empty_text_is_rejected_locally() {
        let chan = channel();
        let ab = key("u1", "u2");
        assert!(matches!(
            chan.send(&ab, &UserId::from("u1"), "   "),
            Err(ClientError::EmptyMessage)
        ));
        assert!(chan.open(&ab).unwrap().snapshot().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sends_never_regress_the_snapshot() {
        const PER_SENDER: usize = 50;

        let chan = channel();
        let ab = key("u1", "u2");
        let mut sub = chan.open(&ab).unwrap();

        // Watch deliveries while two senders race; every observed snapshot
        // must extend the previous one, never shrink back to an older state.
        let observer = tokio::spawn(async move {
            let mut seen = sub.snapshot().len();
            while seen < 2 * PER_SENDER {
                let snapshot = sub.changed().await.unwrap();
                assert!(
                    snapshot.len() >= seen,
                    "snapshot regressed from {} to {} messages",
                    seen,
                    snapshot.len()
                );
                seen = snapshot.len();
            }
        });

        let mut senders = Vec::new();
        for name in ["u1", "u2"] {
            let chan = chan.clone();
            let ab = ab.clone();
            let id = UserId::from(name);
            senders.push(tokio::task::spawn_blocking(move || {
                for n in 0..PER_SENDER {
                    chan.send(&ab, &id, &format!("{id} {n}")).unwrap();
                }
            }));
        }
        for handle in senders {
            handle.await.unwrap();
        }
        observer.await.unwrap();

        let final_snapshot = chan.open(&ab).unwrap().snapshot();
        assert_eq!(final_snapshot.len(), 2 * PER_SENDER);
    }

    #[test]
    fn dead_feeds_are_pruned_on_send() {
        let chan = channel();
        let ab = key("u1", "u2");
        let a = UserId::from("u1");

        let sub = chan.open(&ab).unwrap();
        chan.send(&ab, &a, "one").unwrap();
        drop(sub);
        assert_eq!(chan.feed_count(), 1);

        // Sending into a channel nobody observes drops its feed.
        chan.send(&ab, &a, "two").unwrap();
        assert_eq!(chan.feed_count(), 0);

        // History is intact for the next subscriber.
        let again = chan.open(&ab).unwrap();
        assert_eq!(again.snapshot().len(), 2);
        assert_eq!(chan.feed_count(), 1);
    }

    #[tokio::test]
    async fn channels_are_isolated() {
        let chan = channel();
        let ab = key("u1", "u2");
        let ac = key("u1", "u3");
        let a = UserId::from("u1");

        let mut sub_ab = chan.open(&ab).unwrap();
        let sub_ac = chan.open(&ac).unwrap();

        chan.send(&ab, &a, "for b only").unwrap();

        let delivered = sub_ab.changed().await.unwrap();
        assert_eq!(delivered.len(), 1);
        assert!(sub_ac.snapshot().is_empty());
    }
}
