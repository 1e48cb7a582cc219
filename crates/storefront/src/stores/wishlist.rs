//! The in-memory wishlist.

use easel_core::{Artwork, ArtworkId};

use crate::stores::notify::{Subscribers, SubscriptionId};

/// The set of liked artworks, keyed by artwork id.
///
/// At most one entry per artwork; adds are idempotent. Like the cart,
/// contents are ephemeral and do not survive a restart.
#[derive(Debug, Default)]
pub struct WishlistStore {
    entries: Vec<Artwork>,
    subscribers: Subscribers,
}

impl WishlistStore {
    /// Create an empty wishlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artwork. Duplicate adds are silently ignored.
    pub fn add(&mut self, artwork: Artwork) {
        if self.contains(artwork.id) {
            return;
        }
        self.entries.push(artwork);
        self.subscribers.notify();
    }

    /// Remove an artwork. No-op if absent.
    pub fn remove(&mut self, id: ArtworkId) {
        let before = self.entries.len();
        self.entries.retain(|a| a.id != id);
        if self.entries.len() != before {
            self.subscribers.notify();
        }
    }

    /// Flip membership: add if absent, remove if present. This is the
    /// primary entry point used from detail pages, cards, and
    /// move-to-wishlist actions. Returns true if the artwork is in the
    /// wishlist afterwards.
    pub fn toggle(&mut self, artwork: Artwork) -> bool {
        if self.contains(artwork.id) {
            self.remove(artwork.id);
            false
        } else {
            self.add(artwork);
            true
        }
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.entries.clear();
            self.subscribers.notify();
        }
    }

    /// True if the artwork is in the wishlist.
    #[must_use]
    pub fn contains(&self, id: ArtworkId) -> bool {
        self.entries.iter().any(|a| a.id == id)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the wishlist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The current entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[Artwork] {
        &self.entries
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&mut self, listener: impl Fn() + Send + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    /// Remove a subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}
