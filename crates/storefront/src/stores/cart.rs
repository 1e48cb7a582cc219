//! The in-memory cart.

use easel_core::{Artwork, ArtworkId, Price};

use crate::stores::notify::{Subscribers, SubscriptionId};

/// One cart line: an artwork and how many of it.
///
/// Invariant: `quantity >= 1`. A line whose quantity would drop to zero
/// is removed, never stored.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub artwork: Artwork,
    pub quantity: u32,
}

impl CartLine {
    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.artwork.price.times(self.quantity)
    }
}

/// The authoritative in-memory cart for the current session.
///
/// At most one line per artwork id; repeated adds merge quantities.
/// Contents are ephemeral - they do not survive a restart. Operations
/// are infallible: everything here is a linear scan over a small vec.
#[derive(Debug, Default)]
pub struct CartStore {
    lines: Vec<CartLine>,
    subscribers: Subscribers,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one of the given artwork (merging into an existing line).
    pub fn add(&mut self, artwork: Artwork) {
        self.add_with_quantity(artwork, 1);
    }

    /// Add `quantity` of the given artwork. Merges into the existing line
    /// if the artwork is already in the cart. Adding zero is a no-op, so
    /// the quantity invariant holds.
    pub fn add_with_quantity(&mut self, artwork: Artwork, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.artwork.id == artwork.id) {
            line.quantity += quantity;
        } else {
            self.lines.push(CartLine { artwork, quantity });
        }
        self.subscribers.notify();
    }

    /// Remove the line for the given artwork. No-op if absent.
    pub fn remove(&mut self, id: ArtworkId) {
        let before = self.lines.len();
        self.lines.retain(|l| l.artwork.id != id);
        if self.lines.len() != before {
            self.subscribers.notify();
        }
    }

    /// Set the quantity of an existing line (replace, not increment).
    /// A quantity of zero or below removes the line. No-op if the artwork
    /// is not in the cart.
    pub fn set_quantity(&mut self, id: ArtworkId, quantity: i64) {
        if quantity <= 0 {
            self.remove(id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.artwork.id == id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            self.subscribers.notify();
        }
    }

    /// Empty the cart (used after checkout completes).
    pub fn clear(&mut self) {
        if !self.lines.is_empty() {
            self.lines.clear();
            self.subscribers.notify();
        }
    }

    // =========================================================================
    // Queries (pure)
    // =========================================================================

    /// True if the artwork has a line in the cart.
    #[must_use]
    pub fn contains(&self, id: ArtworkId) -> bool {
        self.lines.iter().any(|l| l.artwork.id == id)
    }

    /// Quantity for the artwork, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, id: ArtworkId) -> u32 {
        self.lines
            .iter()
            .find(|l| l.artwork.id == id)
            .map_or(0, |l| l.quantity)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of `price × quantity` over all lines. Tax and shipping are
    /// checkout's concern, so subtotal and total are the same value here.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Alias of [`Self::subtotal`].
    #[must_use]
    pub fn total(&self) -> Price {
        self.subtotal()
    }

    /// True if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribe to change notifications.
    pub fn subscribe(&mut self, listener: impl Fn() + Send + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    /// Remove a subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) fn artwork(id: i64, price_major: i64) -> Artwork {
        Artwork {
            id: ArtworkId::new(id),
            title: format!("Artwork {id}"),
            artist_name: "Test Artist".to_owned(),
            price: Price::from_major(price_major),
            image: None,
            availability: easel_core::Availability::ForSale,
            likes_count: 0,
            category: None,
            medium: None,
            dimensions: None,
            year_created: None,
        }
    }

    #[test]
    fn test_repeated_adds_merge_quantities() {
        let mut cart = CartStore::new();
        cart.add_with_quantity(artwork(1, 100), 2);
        cart.add(artwork(1, 100));
        cart.add_with_quantity(artwork(1, 100), 3);

        // One line whose quantity is the sum of every add.
        assert_eq!(cart.distinct_count(), 1);
        assert_eq!(cart.quantity_of(ArtworkId::new(1)), 6);
    }

    #[test]
    fn test_add_zero_is_a_noop() {
        let mut cart = CartStore::new();
        cart.add_with_quantity(artwork(1, 100), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_replaces() {
        let mut cart = CartStore::new();
        cart.add_with_quantity(artwork(1, 100), 5);
        cart.set_quantity(ArtworkId::new(1), 2);
        assert_eq!(cart.quantity_of(ArtworkId::new(1)), 2);
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        for quantity in [0, -1] {
            let mut cart = CartStore::new();
            cart.add(artwork(1, 100));
            cart.set_quantity(ArtworkId::new(1), quantity);
            assert!(!cart.contains(ArtworkId::new(1)));
            assert!(cart.is_empty());
        }
    }

    #[test]
    fn test_set_quantity_absent_is_a_noop() {
        let mut cart = CartStore::new();
        cart.add(artwork(1, 100));
        cart.set_quantity(ArtworkId::new(99), 4);
        assert_eq!(cart.distinct_count(), 1);
        assert_eq!(cart.quantity_of(ArtworkId::new(99)), 0);
    }

    #[test]
    fn test_remove_absent_is_a_noop() {
        let mut cart = CartStore::new();
        cart.remove(ArtworkId::new(42));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals() {
        let mut cart = CartStore::new();
        cart.add_with_quantity(artwork(1, 100), 2);
        cart.add(artwork(2, 50));

        assert_eq!(cart.distinct_count(), 2);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.subtotal(), Price::from_major(250));
        assert_eq!(cart.total(), cart.subtotal());
    }

    #[test]
    fn test_clear() {
        let mut cart = CartStore::new();
        cart.add(artwork(1, 100));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Price::ZERO);
    }

    #[test]
    fn test_notifications_fire_only_on_effective_change() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut cart = CartStore::new();
        {
            let counter = Arc::clone(&counter);
            cart.subscribe(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        cart.add(artwork(1, 100)); // fires
        cart.remove(ArtworkId::new(99)); // no-op, silent
        cart.set_quantity(ArtworkId::new(99), 3); // no-op, silent
        cart.clear(); // fires
        cart.clear(); // already empty, silent

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
