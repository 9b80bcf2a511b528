//! # Data Loader Crate
//!
//! Loads and indexes the restaurant catalogue and user profiles.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Restaurant, UserProfile, Rating, DataIndex)
//! - **categories**: The fixed category universe and keyword inference
//! - **parser**: Parse the JSON exports into Rust structs
//! - **index**: Build indices and catalogue statistics
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_files(Path::new("data"))?;
//!
//! let user = index.get_user("u1").unwrap();
//! let ratings = index.get_user_ratings("u1");
//! println!("User {} rated {} restaurants", user.user_id, ratings.len());
//! ```

pub mod categories;
pub mod error;
pub mod index;
pub mod parser;
pub mod types;

pub use categories::CategoryUniverse;
pub use error::{DataLoadError, Result};
pub use index::{RESTAURANTS_FILE, USERS_FILE};
pub use types::{
    CatalogueStats, DataIndex, PlaceId, Rating, Restaurant, RestaurantAttributes, Review,
    UserId, UserProfile,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_index_creation() {
        let index = DataIndex::new();
        assert_eq!(index.counts(), (0, 0, 0));
    }

    #[test]
    fn test_insert_restaurant_keeps_order() {
        let mut index = DataIndex::new();
        index.insert_restaurant(Restaurant::new("b", "Bistro", &["western"]));
        index.insert_restaurant(Restaurant::new("a", "Arang", &["korean"]));
        index.insert_restaurant(Restaurant::new("b", "Bistro Two", &["western"]));

        let names: Vec<&str> = index.restaurants().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Bistro Two", "Arang"]);
    }

    #[test]
    fn test_insert_user_replaces_ratings() {
        let mut index = DataIndex::new();
        let mut user = UserProfile {
            user_id: "u1".to_string(),
            ..UserProfile::default()
        };
        user.ratings.insert("p1".to_string(), 4.0);
        index.insert_user(user.clone());

        user.ratings.insert("p2".to_string(), 2.0);
        index.insert_user(user);

        assert_eq!(index.get_user_ratings("u1").len(), 2);
        assert_eq!(index.get_restaurant_ratings("p1").len(), 1);
        assert_eq!(index.user_ids(), ["u1".to_string()]);
    }

    #[test]
    fn test_empty_queries() {
        let index = DataIndex::new();

        assert!(index.get_user("nobody").is_none());
        assert!(index.get_restaurant("nowhere").is_none());
        assert!(index.get_user_ratings("nobody").is_empty());
        assert!(index.get_restaurant_ratings("nowhere").is_empty());
        assert!(index.get_restaurants_by_category("halal").is_empty());
    }

    #[test]
    fn test_descriptive_text() {
        let mut r = Restaurant::new("p1", "Kopi House", &["cafe"]);
        r.attributes.editorial_summary = Some("Cosy Spot".to_string());
        assert_eq!(r.descriptive_text(), "kopi house cafe cosy spot");
    }
}
