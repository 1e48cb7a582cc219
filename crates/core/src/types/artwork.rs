//! The artwork product type.

use serde::{Deserialize, Serialize};

use crate::types::id::ArtworkId;
use crate::types::price::Price;
use crate::types::status::Availability;

/// An artwork as served by the catalog API.
///
/// This is the single product value type shared by the cart, wishlist, and
/// checkout modules. It is read-only to the stores: the client never
/// mutates catalog data, it only references it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artwork {
    /// Unique catalog key.
    pub id: ArtworkId,
    /// Display title.
    pub title: String,
    /// Name of the artist as shown on cards and detail pages.
    pub artist_name: String,
    /// Listed price.
    pub price: Price,
    /// Primary image URL, if the listing has one.
    #[serde(default)]
    pub image: Option<String>,
    /// Whether the work can currently be purchased.
    #[serde(default)]
    pub availability: Availability,
    /// Number of likes across all users.
    #[serde(default)]
    pub likes_count: u64,
    /// Category slug (e.g., "painting", "sculpture").
    #[serde(default)]
    pub category: Option<String>,
    /// Medium description (e.g., "oil on canvas").
    #[serde(default)]
    pub medium: Option<String>,
    /// Physical dimensions (e.g., "24 x 36 inches").
    #[serde(default)]
    pub dimensions: Option<String>,
    /// Year the work was created.
    #[serde(default)]
    pub year_created: Option<i32>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_catalog_response() {
        // Shape as emitted by the backend's artwork serializer.
        let json = r#"{
            "id": 12,
            "title": "Sunrise over Ganges",
            "artist_name": "A. Sharma",
            "price": "5000.00",
            "image": "https://cdn.example.com/artworks/12.jpg",
            "availability": "for_sale",
            "likes_count": 3,
            "category": "painting",
            "medium": "oil on canvas",
            "dimensions": "24 x 36 inches",
            "year_created": 2021
        }"#;

        let artwork: Artwork = serde_json::from_str(json).unwrap();
        assert_eq!(artwork.id, ArtworkId::new(12));
        assert_eq!(artwork.price, Price::from_major(5000));
        assert!(artwork.availability.is_purchasable());
    }

    #[test]
    fn test_optional_metadata_defaults() {
        let json = r#"{
            "id": 1,
            "title": "Untitled",
            "artist_name": "Unknown",
            "price": "100.00"
        }"#;

        let artwork: Artwork = serde_json::from_str(json).unwrap();
        assert_eq!(artwork.image, None);
        assert_eq!(artwork.availability, Availability::ForSale);
        assert_eq!(artwork.likes_count, 0);
    }
}
