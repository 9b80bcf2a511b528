//! Shared types for scoring providers.

use data_loader::{PlaceId, Restaurant, RestaurantAttributes, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Which recommender produced an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "Content-Based")]
    ContentBased,
    #[serde(rename = "Collaborative Filtering")]
    Collaborative,
    #[serde(rename = "Content-Based & Collaborative Filtering")]
    Both,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Source::ContentBased => "Content-Based",
            Source::Collaborative => "Collaborative Filtering",
            Source::Both => "Content-Based & Collaborative Filtering",
        };
        f.write_str(label)
    }
}

/// A restaurant record with a provider score attached.
///
/// Serialises flat: identity, `score`, `source` and every restaurant attribute
/// side by side, which is the shape of the persisted hybrid output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<PlaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub categories: BTreeSet<String>,
    /// Provider score in `[0, 1]`; absent scores rank as 0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    /// Categories shared with the favourite that produced this item (content-based only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub common_categories: Vec<String>,
    #[serde(flatten)]
    pub attributes: RestaurantAttributes,
}

impl ScoredItem {
    /// Create a bare item with identity, categories and score
    pub fn new(place_id: impl Into<String>, name: impl Into<String>, categories: &[&str], score: f32) -> Self {
        Self {
            place_id: Some(place_id.into()),
            name: Some(name.into()),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            score: Some(score),
            ..Self::default()
        }
    }

    /// Copy a catalogue record and attach a score
    pub fn from_restaurant(restaurant: &Restaurant, score: f32) -> Self {
        Self {
            place_id: Some(restaurant.place_id.clone()),
            name: Some(restaurant.name.clone()),
            categories: restaurant.category_set(),
            score: Some(score),
            source: None,
            common_categories: Vec::new(),
            attributes: restaurant.attributes.clone(),
        }
    }

    /// Placeholder for a scored place that is missing from the catalogue
    pub fn unknown(place_id: impl Into<String>, score: f32) -> Self {
        Self {
            place_id: Some(place_id.into()),
            name: Some("Unknown".to_string()),
            score: Some(score),
            ..Self::default()
        }
    }

    /// Identity key: place id, falling back to name. Blank values don't count.
    pub fn identity_key(&self) -> Option<&str> {
        fn non_blank(s: &Option<String>) -> Option<&str> {
            s.as_deref().filter(|v| !v.trim().is_empty())
        }
        non_blank(&self.place_id).or_else(|| non_blank(&self.name))
    }

    /// Score used for ranking
    pub fn rank_score(&self) -> f32 {
        self.score.unwrap_or(0.0)
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }
}

/// Everything a provider needs to know about the user, gathered once.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub user_id: UserId,

    /// Places the user has explicitly rated
    pub rated_places: HashSet<PlaceId>,

    /// Favourite places, in the order the profile lists them
    pub favourite_restaurants: Vec<PlaceId>,

    /// Stated preferences from the profile
    pub preferences: Vec<String>,

    /// Average rating given by this user (0.0 when unrated)
    pub avg_rating: f32,
}

impl UserContext {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn has_rated(&self, place_id: &str) -> bool {
        self.rated_places.contains(place_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_falls_back_to_name() {
        let mut item = ScoredItem::new("p1", "Kopi House", &["cafe"], 0.5);
        assert_eq!(item.identity_key(), Some("p1"));

        item.place_id = Some("  ".to_string());
        assert_eq!(item.identity_key(), Some("Kopi House"));

        item.name = None;
        assert_eq!(item.identity_key(), None);
    }

    #[test]
    fn test_scored_item_serialises_flat() {
        let mut restaurant = Restaurant::new("p1", "Kopi House", &["cafe"]);
        restaurant.attributes.rating = Some(4.5);
        let item = ScoredItem::from_restaurant(&restaurant, 0.8).with_source(Source::Both);

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["place_id"], "p1");
        assert_eq!(json["rating"], 4.5);
        assert_eq!(json["source"], "Content-Based & Collaborative Filtering");
        assert!(json.get("common_categories").is_none());
    }

    #[test]
    fn test_unknown_item() {
        let item = ScoredItem::unknown("p9", 0.6);
        assert_eq!(item.name.as_deref(), Some("Unknown"));
        assert!(item.categories.is_empty());
        assert_eq!(item.rank_score(), 0.6);
    }
}
