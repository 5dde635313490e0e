//! Change notification channel for pet resource identifiers.
//!
//! # Responsibility
//! - Let observers register interest in a URI and learn when its
//!   underlying data changed.
//! - Deliver publishes synchronously, fire-and-forget, in-process.
//!
//! # Invariants
//! - Delivery carries no payload; observers re-query to refresh.
//! - No ordering guarantee across observers of one publish.
//! - There is no explicit unregister call; dropping a [`Subscription`]
//!   retires its watcher, and the hub prunes dead watchers lazily on the
//!   next publish.

use crate::uri::ContentUri;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Publish/subscribe seam for change delivery.
///
/// The gateway only depends on this trait, so the synchronous in-process
/// [`ChangeHub`] can later be swapped for an asynchronous transport
/// without touching CRUD code.
pub trait ChangeChannel {
    /// Registers interest in `uri` and returns the observer handle.
    fn subscribe(&self, uri: &ContentUri) -> Subscription;

    /// Signals that data underlying `uri` changed.
    fn publish(&self, uri: &ContentUri);
}

/// Observer handle counting the publishes delivered to one URI.
///
/// The count distinguishes "changed once" from "changed repeatedly",
/// which UI callers use to coalesce refreshes.
#[derive(Debug)]
pub struct Subscription {
    uri: ContentUri,
    deliveries: Arc<AtomicUsize>,
}

impl Subscription {
    /// The URI this subscription watches.
    pub fn uri(&self) -> &ContentUri {
        &self.uri
    }

    /// Number of publishes delivered since the last [`take`](Self::take).
    pub fn pending(&self) -> usize {
        self.deliveries.load(Ordering::Acquire)
    }

    /// Consumes and returns the pending delivery count.
    pub fn take(&self) -> usize {
        self.deliveries.swap(0, Ordering::AcqRel)
    }
}

struct Watcher {
    uri: ContentUri,
    deliveries: Weak<AtomicUsize>,
}

/// Synchronous in-process change hub.
#[derive(Default)]
pub struct ChangeHub {
    watchers: Mutex<Vec<Watcher>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live watchers, after pruning dropped ones.
    pub fn active_watchers(&self) -> usize {
        let mut watchers = self.watchers.lock().expect("watcher registry poisoned");
        watchers.retain(|watcher| watcher.deliveries.strong_count() > 0);
        watchers.len()
    }
}

impl ChangeChannel for ChangeHub {
    fn subscribe(&self, uri: &ContentUri) -> Subscription {
        let deliveries = Arc::new(AtomicUsize::new(0));
        self.watchers
            .lock()
            .expect("watcher registry poisoned")
            .push(Watcher {
                uri: uri.clone(),
                deliveries: Arc::downgrade(&deliveries),
            });
        Subscription {
            uri: uri.clone(),
            deliveries,
        }
    }

    fn publish(&self, uri: &ContentUri) {
        let mut watchers = self.watchers.lock().expect("watcher registry poisoned");
        watchers.retain(|watcher| {
            let Some(deliveries) = watcher.deliveries.upgrade() else {
                return false;
            };
            if uri_related(&watcher.uri, uri) {
                deliveries.fetch_add(1, Ordering::AcqRel);
            }
            true
        });
    }
}

/// Platform-convention relatedness: a publish reaches watchers of the
/// exact URI, of any ancestor (a collection list refreshes when one of
/// its items changes) and of any descendant.
fn uri_related(watched: &ContentUri, published: &ContentUri) -> bool {
    watched.is_prefix_of(published) || published.is_prefix_of(watched)
}

#[cfg(test)]
mod tests {
    use super::{ChangeChannel, ChangeHub};
    use crate::uri::ContentUri;

    #[test]
    fn exact_uri_publish_is_delivered() {
        let hub = ChangeHub::new();
        let sub = hub.subscribe(&ContentUri::item(1));

        hub.publish(&ContentUri::item(1));
        hub.publish(&ContentUri::item(1));

        assert_eq!(sub.take(), 2);
        assert_eq!(sub.pending(), 0);
    }

    #[test]
    fn collection_watcher_sees_item_publish() {
        let hub = ChangeHub::new();
        let sub = hub.subscribe(&ContentUri::collection());

        hub.publish(&ContentUri::item(9));

        assert_eq!(sub.pending(), 1);
    }

    #[test]
    fn item_watcher_sees_collection_publish() {
        let hub = ChangeHub::new();
        let sub = hub.subscribe(&ContentUri::item(2));

        hub.publish(&ContentUri::collection());

        assert_eq!(sub.pending(), 1);
    }

    #[test]
    fn unrelated_uris_are_not_delivered() {
        let hub = ChangeHub::new();
        let sub = hub.subscribe(&ContentUri::item(3));

        hub.publish(&ContentUri::item(4));
        hub.publish(&ContentUri::new("content://other.authority/pets/3"));

        assert_eq!(sub.pending(), 0);
    }

    #[test]
    fn dropped_subscriptions_are_pruned_on_publish() {
        let hub = ChangeHub::new();
        let kept = hub.subscribe(&ContentUri::collection());
        let dropped = hub.subscribe(&ContentUri::collection());
        drop(dropped);

        hub.publish(&ContentUri::collection());

        assert_eq!(kept.pending(), 1);
        assert_eq!(hub.active_watchers(), 1);
    }

    #[test]
    fn all_observers_of_one_uri_are_woken() {
        let hub = ChangeHub::new();
        let first = hub.subscribe(&ContentUri::collection());
        let second = hub.subscribe(&ContentUri::collection());

        hub.publish(&ContentUri::collection());

        assert_eq!(first.pending(), 1);
        assert_eq!(second.pending(), 1);
    }
}
