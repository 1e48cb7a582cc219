//! Client-side state: cart, wishlist, and session.
//!
//! Each store owns one slice of state, mutates it synchronously, and
//! notifies subscribers after every effective change. Stores are plain
//! owned values; callers decide how to share them (typically behind a
//! `Mutex` when views run on multiple tasks).

pub mod cart;
pub mod notify;
pub mod session;
pub mod wishlist;

pub use cart::{CartLine, CartStore};
pub use notify::SubscriptionId;
pub use session::SessionStore;
pub use wishlist::WishlistStore;

use easel_core::ArtworkId;

/// Move an artwork from the cart into the wishlist ("save for later").
///
/// The wishlist gains the artwork (idempotently) and the cart line is
/// dropped regardless of its quantity. No-op if the artwork is not in
/// the cart. Returns true if anything moved.
pub fn move_to_wishlist(cart: &mut CartStore, wishlist: &mut WishlistStore, id: ArtworkId) -> bool {
    let Some(line) = cart.lines().iter().find(|l| l.artwork.id == id) else {
        return false;
    };
    wishlist.add(line.artwork.clone());
    cart.remove(id);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::cart::tests::artwork;

    #[test]
    fn test_move_to_wishlist_drops_the_whole_line() {
        let mut cart = CartStore::new();
        let mut wishlist = WishlistStore::new();
        cart.add_with_quantity(artwork(1, 100), 3);

        assert!(move_to_wishlist(&mut cart, &mut wishlist, ArtworkId::new(1)));
        assert!(cart.is_empty());
        assert!(wishlist.contains(ArtworkId::new(1)));
    }

    #[test]
    fn test_move_to_wishlist_absent_is_a_noop() {
        let mut cart = CartStore::new();
        let mut wishlist = WishlistStore::new();
        wishlist.add(artwork(2, 50));

        assert!(!move_to_wishlist(&mut cart, &mut wishlist, ArtworkId::new(1)));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_move_is_idempotent_against_existing_wishlist_entry() {
        let mut cart = CartStore::new();
        let mut wishlist = WishlistStore::new();
        cart.add(artwork(1, 100));
        wishlist.add(artwork(1, 100));

        assert!(move_to_wishlist(&mut cart, &mut wishlist, ArtworkId::new(1)));
        assert_eq!(wishlist.len(), 1);
        assert!(cart.is_empty());
    }
}
