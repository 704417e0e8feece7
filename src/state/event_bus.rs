//! Publish/subscribe bus decoupling intent producers from their consumers.
//!
//! The bus knows nothing about game rules. It keeps the registered callbacks
//! and remembers the latest intent per `type:gameId` for a short freshness
//! window so late subscribers can tell whether they just missed something.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Weak},
    time::Duration,
};

use indexmap::IndexMap;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::intent::{Intent, IntentKind, cache_key};

/// Identifier handed out for each registered subscriber.
pub type SubscriptionId = Uuid;

/// Failure reported by a subscriber callback. Logged by the bus, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("subscriber failed: {0}")]
pub struct SubscriberError(pub String);

impl SubscriberError {
    /// Build an error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

type Callback = Arc<dyn Fn(&Intent) -> Result<(), SubscriberError> + Send + Sync>;

/// Cached intent together with its age at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentIntent {
    /// Intent that was published.
    pub intent: Intent,
    /// Time elapsed since publication.
    pub age: Duration,
}

struct CachedIntent {
    intent: Intent,
    published_at: Instant,
}

struct BusInner {
    subscribers: Mutex<IndexMap<SubscriptionId, Callback>>,
    recent: Mutex<IndexMap<String, CachedIntent>>,
    freshness_window: Duration,
    capacity: usize,
}

impl BusInner {
    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.lock().shift_remove(&id).is_some()
    }
}

/// Cheaply cloneable handle to a shared intent bus.
#[derive(Clone)]
pub struct IntentBus {
    inner: Arc<BusInner>,
}

impl IntentBus {
    /// Create a bus remembering at most `capacity` intents for `freshness_window`.
    pub fn new(freshness_window: Duration, capacity: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscribers: Mutex::new(IndexMap::new()),
                recent: Mutex::new(IndexMap::new()),
                freshness_window,
                capacity: capacity.max(1),
            }),
        }
    }

    /// Register a callback invoked synchronously for every published intent.
    ///
    /// Callbacks run in registration order. The returned [`Subscription`]
    /// removes the callback when dropped or explicitly unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Intent) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.inner.subscribers.lock().insert(id, Arc::new(callback));
        debug!(subscription = %id, "intent subscriber registered");
        Subscription {
            id,
            bus: Some(Arc::downgrade(&self.inner)),
        }
    }

    /// Number of callbacks currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    /// Remember `intent` then hand it to every subscriber.
    ///
    /// A failing or panicking subscriber is logged and skipped; the remaining
    /// subscribers are still notified and nothing is reported back.
    pub fn publish(&self, intent: Intent) {
        self.remember(&intent);

        // Snapshot so callbacks can (un)subscribe without re-entering the lock.
        let subscribers: Vec<(SubscriptionId, Callback)> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect();

        debug!(
            kind = %intent.kind(),
            game_id = intent.game_id(),
            subscribers = subscribers.len(),
            "publishing intent"
        );

        for (id, callback) in subscribers {
            match panic::catch_unwind(AssertUnwindSafe(|| callback(&intent))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!(subscription = %id, kind = %intent.kind(), error = %err, "intent subscriber failed");
                }
                Err(payload) => {
                    warn!(
                        subscription = %id,
                        kind = %intent.kind(),
                        panic = panic_message(payload.as_ref()),
                        "intent subscriber panicked"
                    );
                }
            }
        }
    }

    /// Whether an intent of `kind` was published for `game_id` within the freshness window.
    ///
    /// Expired entries are evicted by this lookup.
    pub fn was_recently_published(&self, kind: IntentKind, game_id: &str) -> bool {
        self.recent(kind, game_id).is_some()
    }

    /// Latest intent of `kind` for `game_id` if it is still fresh.
    pub fn recent(&self, kind: IntentKind, game_id: &str) -> Option<RecentIntent> {
        let key = cache_key(kind, game_id);
        let mut recent = self.inner.recent.lock();
        let entry = recent.get(&key)?;
        let age = entry.published_at.elapsed();
        if age > self.inner.freshness_window {
            recent.shift_remove(&key);
            debug!(key = %key, "evicted expired intent");
            return None;
        }
        Some(RecentIntent {
            intent: entry.intent.clone(),
            age,
        })
    }

    /// Number of entries currently held by the recent-intent cache, expired or not.
    pub fn cached_len(&self) -> usize {
        self.inner.recent.lock().len()
    }

    fn remember(&self, intent: &Intent) {
        let key = intent.cache_key();
        let mut recent = self.inner.recent.lock();
        // Re-insert at the back so the front always holds the oldest entry.
        recent.shift_remove(&key);
        while recent.len() >= self.inner.capacity {
            recent.shift_remove_index(0);
        }
        recent.insert(
            key,
            CachedIntent {
                intent: intent.clone(),
                published_at: Instant::now(),
            },
        );
    }
}

/// Disposer returned by [`IntentBus::subscribe`].
#[must_use = "dropping a subscription unregisters its callback"]
pub struct Subscription {
    id: SubscriptionId,
    bus: Option<Weak<BusInner>>,
}

impl Subscription {
    /// Identifier of the registered callback.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the callback from the bus.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keep the callback registered for as long as the bus lives.
    pub fn detach(mut self) {
        self.bus = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.bus.take().and_then(|bus| bus.upgrade()) else {
            return;
        };
        if inner.unsubscribe(self.id) {
            debug!(subscription = %self.id, "intent subscriber removed");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::state::game::RoundType;

    fn board_intro(game_id: &str) -> Intent {
        Intent::BoardIntro {
            game_id: game_id.into(),
            round: RoundType::Jeopardy,
        }
    }

    fn bus() -> IntentBus {
        IntentBus::new(Duration::from_millis(2_000), 8)
    }

    #[test]
    fn subscribers_are_notified_in_registration_order() {
        let bus = bus();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let order = Arc::clone(&order);
            bus.subscribe(move |_| {
                order.lock().push(1);
                Ok(())
            })
        };
        let second = {
            let order = Arc::clone(&order);
            bus.subscribe(move |_| {
                order.lock().push(2);
                Ok(())
            })
        };

        bus.publish(board_intro("g1"));
        assert_eq!(*order.lock(), vec![1, 2]);

        first.unsubscribe();
        bus.publish(board_intro("g1"));
        assert_eq!(*order.lock(), vec![1, 2, 2]);
        drop(second);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn failing_and_panicking_subscribers_do_not_block_others() {
        let bus = bus();
        let delivered = Arc::new(AtomicUsize::new(0));

        let _failing = bus.subscribe(|_| Err(SubscriberError::new("boom")));
        let _panicking = bus.subscribe(|_| panic!("subscriber exploded"));
        let counters: Vec<_> = (0..3)
            .map(|_| {
                let delivered = Arc::clone(&delivered);
                bus.subscribe(move |_| {
                    delivered.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .collect();

        bus.publish(board_intro("g1"));
        assert_eq!(delivered.load(Ordering::SeqCst), counters.len());
    }

    #[test]
    fn detached_subscription_stays_registered() {
        let bus = bus();
        bus.subscribe(|_| Ok(())).detach();
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn subscriber_can_unsubscribe_itself_during_publish() {
        let bus = bus();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let subscription = {
            let slot = Arc::clone(&slot);
            bus.subscribe(move |_| {
                slot.lock().take();
                Ok(())
            })
        };
        *slot.lock() = Some(subscription);

        bus.publish(board_intro("g1"));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn recent_intent_expires_after_window() {
        let bus = bus();
        bus.publish(board_intro("g1"));
        assert!(bus.was_recently_published(IntentKind::BoardIntro, "g1"));
        assert!(!bus.was_recently_published(IntentKind::BoardIntro, "g2"));
        assert!(!bus.was_recently_published(IntentKind::ClueReveal, "g1"));

        tokio::time::advance(Duration::from_millis(1_500)).await;
        assert!(bus.was_recently_published(IntentKind::BoardIntro, "g1"));

        tokio::time::advance(Duration::from_millis(600)).await;
        assert_eq!(bus.cached_len(), 1);
        assert!(!bus.was_recently_published(IntentKind::BoardIntro, "g1"));
        assert_eq!(bus.cached_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn republishing_refreshes_the_entry() {
        let bus = bus();
        bus.publish(board_intro("g1"));
        tokio::time::advance(Duration::from_millis(1_900)).await;
        bus.publish(board_intro("g1"));
        tokio::time::advance(Duration::from_millis(1_900)).await;

        let recent = bus.recent(IntentKind::BoardIntro, "g1").expect("still fresh");
        assert_eq!(recent.age, Duration::from_millis(1_900));
    }

    #[test]
    fn cache_is_bounded_and_evicts_oldest() {
        let bus = IntentBus::new(Duration::from_secs(60), 2);
        bus.publish(board_intro("g1"));
        bus.publish(board_intro("g2"));
        bus.publish(board_intro("g3"));

        assert_eq!(bus.cached_len(), 2);
        assert!(!bus.was_recently_published(IntentKind::BoardIntro, "g1"));
        assert!(bus.was_recently_published(IntentKind::BoardIntro, "g2"));
        assert!(bus.was_recently_published(IntentKind::BoardIntro, "g3"));
    }
}
