//! Core domain types for the restaurant catalogue and user profiles.
//!
//! Records mirror the JSON emitted by the maps fetcher and the user-profile
//! export. Fields the fetcher may leave out (or fill with `"N/A"`) are modelled
//! as `Option<T>`, and anything we do not model explicitly is kept in
//! `extra` so a record survives a load/save round trip untouched.

use crate::parser;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};

// =============================================================================
// Type Aliases
// =============================================================================

/// Maps place identifier (e.g. `"ChIJ..."`)
pub type PlaceId = String;

/// Identifier of a user document in the profile store
pub type UserId = String;

// =============================================================================
// Restaurant-related Types
// =============================================================================

/// A restaurant from the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub place_id: PlaceId,
    pub name: String,
    /// Category keys from the [`CategoryUniverse`](crate::CategoryUniverse).
    ///
    /// Accepts a JSON array or a Python-literal list string (`"['cafe']"`).
    #[serde(default, deserialize_with = "parser::deserialize_categories")]
    pub categories: Vec<String>,
    #[serde(flatten)]
    pub attributes: RestaurantAttributes,
}

impl Restaurant {
    /// Create a restaurant with only identity and categories set.
    pub fn new(place_id: impl Into<String>, name: impl Into<String>, categories: &[&str]) -> Self {
        Self {
            place_id: place_id.into(),
            name: name.into(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            attributes: RestaurantAttributes::default(),
        }
    }

    /// Categories as a set (duplicates in the source record collapse).
    pub fn category_set(&self) -> BTreeSet<String> {
        self.categories.iter().cloned().collect()
    }

    /// All free text describing the restaurant, lower-cased.
    ///
    /// Name, categories, editorial summary and review texts, space separated.
    pub fn descriptive_text(&self) -> String {
        let mut parts: Vec<&str> = vec![self.name.as_str()];
        parts.extend(self.categories.iter().map(String::as_str));
        if let Some(summary) = &self.attributes.editorial_summary {
            parts.push(summary);
        }
        parts.extend(
            self.attributes
                .reviews
                .iter()
                .filter_map(|r| r.text.as_deref()),
        );
        parts.join(" ").to_lowercase()
    }
}

/// Everything about a restaurant besides its identity and categories.
///
/// Flattened into [`Restaurant`] and into scored recommendation records, so the
/// persisted output carries every original field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestaurantAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "parser::deserialize_text")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "parser::deserialize_f64")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "parser::deserialize_f64")]
    pub longitude: Option<f64>,
    /// Average public rating, 0.0 - 5.0
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "parser::deserialize_f32")]
    pub rating: Option<f32>,
    /// Price level, 0 (free) - 4 (very expensive)
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "parser::deserialize_f32")]
    pub price_level: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "parser::deserialize_u32")]
    pub user_ratings_total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "parser::deserialize_text")]
    pub editorial_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "parser::deserialize_reviews")]
    pub reviews: Vec<Review>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "parser::deserialize_text")]
    pub business_status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    /// Fields we carry through without interpreting (url, photos, opening hours, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single user review attached to a restaurant record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "parser::deserialize_f32")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_time: Option<String>,
}

// =============================================================================
// User-related Types
// =============================================================================

/// A user document from the profile store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub user_id: UserId,
    /// Explicit ratings, place id -> 1.0 - 5.0
    #[serde(default)]
    pub ratings: HashMap<PlaceId, f32>,
    /// Restaurants the user marked as favourite (seeds content-based filtering)
    #[serde(default)]
    pub favourite_restaurants: Vec<PlaceId>,
    /// Free-form stated preferences ("halal", "cheap", ...)
    #[serde(default)]
    pub preferences: Vec<String>,
}

/// One `(user, place, rating)` triple from the ratings store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub place_id: PlaceId,
    /// Rating value from 1.0 to 5.0
    pub rating: f32,
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Catalogue-wide statistics, used to impute missing numeric fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogueStats {
    pub median_rating: f32,
    pub median_price_level: f32,
}

// =============================================================================
// DataIndex - The In-Memory Catalogue
// =============================================================================

/// Holds the restaurant catalogue, user profiles and rating indices.
///
/// Catalogue and user insertion order is preserved so that anything iterating
/// the index (providers, the CLI) sees a deterministic order.
#[derive(Debug, Default)]
pub struct DataIndex {
    pub(crate) restaurants: HashMap<PlaceId, Restaurant>,
    pub(crate) restaurant_order: Vec<PlaceId>,
    pub(crate) users: HashMap<UserId, UserProfile>,
    pub(crate) user_order: Vec<UserId>,

    /// All ratings made by each user
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
    /// All ratings received by each restaurant
    pub(crate) restaurant_ratings: HashMap<PlaceId, Vec<Rating>>,
    /// Ids of rated restaurants, in first-rated order
    pub(crate) rated_order: Vec<PlaceId>,

    /// Restaurants grouped by category
    pub(crate) category_index: HashMap<String, Vec<PlaceId>>,

    pub(crate) stats: CatalogueStats,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_restaurant(&self, place_id: &str) -> Option<&Restaurant> {
        self.restaurants.get(place_id)
    }

    pub fn get_user(&self, user_id: &str) -> Option<&UserProfile> {
        self.users.get(user_id)
    }

    /// Restaurants in catalogue order
    pub fn restaurants(&self) -> impl Iterator<Item = &Restaurant> + '_ {
        self.restaurant_order
            .iter()
            .filter_map(|id| self.restaurants.get(id))
    }

    /// User ids in load order
    pub fn user_ids(&self) -> &[UserId] {
        &self.user_order
    }

    /// Get all ratings made by a user
    ///
    /// Returns an empty slice if user has no ratings
    pub fn get_user_ratings(&self, user_id: &str) -> &[Rating] {
        self.user_ratings
            .get(user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all ratings for a restaurant
    pub fn get_restaurant_ratings(&self, place_id: &str) -> &[Rating] {
        self.restaurant_ratings
            .get(place_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every place id that appears in the ratings store, in first-rated order.
    ///
    /// May include places missing from the catalogue.
    pub fn rated_place_ids(&self) -> &[PlaceId] {
        &self.rated_order
    }

    /// Get all restaurants in a category
    pub fn get_restaurants_by_category(&self, category: &str) -> &[PlaceId] {
        self.category_index
            .get(category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn stats(&self) -> CatalogueStats {
        self.stats
    }

    /// Insert a restaurant. Re-inserting an id replaces the record in place.
    pub fn insert_restaurant(&mut self, restaurant: Restaurant) {
        if !self.restaurants.contains_key(&restaurant.place_id) {
            self.restaurant_order.push(restaurant.place_id.clone());
        }
        self.restaurants.insert(restaurant.place_id.clone(), restaurant);
    }

    /// Insert a user profile and index its ratings.
    pub fn insert_user(&mut self, user: UserProfile) {
        if self.users.contains_key(&user.user_id) {
            self.user_ratings.remove(&user.user_id);
            for ratings in self.restaurant_ratings.values_mut() {
                ratings.retain(|r| r.user_id != user.user_id);
            }
        } else {
            self.user_order.push(user.user_id.clone());
        }

        // Sorted so that rating indices don't depend on HashMap order
        let mut rated: Vec<(&PlaceId, &f32)> = user.ratings.iter().collect();
        rated.sort_by(|a, b| a.0.cmp(b.0));
        for (place_id, &rating) in rated {
            self.insert_rating(Rating {
                user_id: user.user_id.clone(),
                place_id: place_id.clone(),
                rating,
            });
        }
        self.users.insert(user.user_id.clone(), user);
    }

    /// Insert a rating and update indices
    pub fn insert_rating(&mut self, rating: Rating) {
        let place_ratings = self
            .restaurant_ratings
            .entry(rating.place_id.clone())
            .or_default();
        if place_ratings.is_empty() && !self.rated_order.contains(&rating.place_id) {
            self.rated_order.push(rating.place_id.clone());
        }
        place_ratings.push(rating.clone());

        self.user_ratings
            .entry(rating.user_id.clone())
            .or_default()
            .push(rating);
    }

    /// Get counts for debugging/validation: (restaurants, users, ratings)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_ratings = self.user_ratings.values().map(|v| v.len()).sum();
        (self.restaurants.len(), self.users.len(), total_ratings)
    }
}
