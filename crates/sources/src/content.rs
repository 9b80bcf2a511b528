//! Content-Based Source - "more like your favourites"
//!
//! For each favourite restaurant, scores every other restaurant in the
//! catalogue by a weighted blend of:
//! - text similarity (name, categories, summary, reviews)
//! - category overlap (binary)
//! - rating closeness
//! - price-level closeness
//! - geographic proximity (haversine, 20 km horizon)
//!
//! Per-favourite lists are concatenated and sorted by score descending, so the
//! same place can appear once per favourite.

use crate::types::{ScoredItem, Source, UserContext};
use data_loader::{CatalogueStats, DataIndex, Restaurant};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Black-box textual similarity between two restaurants, in `[0, 1]`.
pub trait TextSimilarity: Send + Sync {
    fn similarity(&self, a: &Restaurant, b: &Restaurant) -> f32;
}

/// Cosine similarity over lower-cased term counts of the descriptive text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermOverlapSimilarity;

impl TermOverlapSimilarity {
    fn term_counts(text: &str) -> HashMap<&str, f32> {
        let mut counts = HashMap::new();
        for term in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() > 1)
        {
            *counts.entry(term).or_insert(0.0) += 1.0;
        }
        counts
    }
}

impl TextSimilarity for TermOverlapSimilarity {
    fn similarity(&self, a: &Restaurant, b: &Restaurant) -> f32 {
        let (text_a, text_b) = (a.descriptive_text(), b.descriptive_text());
        let (ca, cb) = (Self::term_counts(&text_a), Self::term_counts(&text_b));

        let dot: f32 = ca
            .iter()
            .filter_map(|(term, x)| cb.get(term).map(|y| x * y))
            .sum();
        let norm = |c: &HashMap<&str, f32>| c.values().map(|v| v * v).sum::<f32>().sqrt();
        let denom = norm(&ca) * norm(&cb);
        if denom == 0.0 { 0.0 } else { dot / denom }
    }
}

/// Blend weights for the content-based score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentWeights {
    pub text: f32,
    pub category: f32,
    pub rating: f32,
    pub price: f32,
    pub distance: f32,
    /// Distances beyond this many kilometres score 0
    pub max_distance_km: f64,
}

impl Default for ContentWeights {
    fn default() -> Self {
        Self {
            text: 0.3,
            category: 0.2,
            rating: 0.15,
            price: 0.15,
            distance: 0.2,
            max_distance_km: 20.0,
        }
    }
}

impl ContentWeights {
    /// Configure text similarity weight (default: 0.3)
    pub fn with_text(mut self, weight: f32) -> Self {
        self.text = weight;
        self
    }

    /// Configure category overlap weight (default: 0.2)
    pub fn with_category(mut self, weight: f32) -> Self {
        self.category = weight;
        self
    }

    /// Configure rating closeness weight (default: 0.15)
    pub fn with_rating(mut self, weight: f32) -> Self {
        self.rating = weight;
        self
    }

    /// Configure price closeness weight (default: 0.15)
    pub fn with_price(mut self, weight: f32) -> Self {
        self.price = weight;
        self
    }

    /// Configure proximity weight (default: 0.2)
    pub fn with_distance(mut self, weight: f32) -> Self {
        self.distance = weight;
        self
    }

    /// Configure the proximity horizon in km (default: 20)
    pub fn with_max_distance_km(mut self, km: f64) -> Self {
        self.max_distance_km = km;
        self
    }
}

/// Content-based source: restaurants similar to the user's favourites
#[derive(Clone)]
pub struct ContentBasedSource {
    data_index: Arc<DataIndex>,
    similarity: Arc<dyn TextSimilarity>,
    weights: ContentWeights,
}

impl ContentBasedSource {
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self {
            data_index,
            similarity: Arc::new(TermOverlapSimilarity),
            weights: ContentWeights::default(),
        }
    }

    pub fn with_similarity(mut self, similarity: Arc<dyn TextSimilarity>) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn with_weights(mut self, weights: ContentWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Generate scored recommendations for a user
    #[instrument(skip(self, user_context), fields(user_id = %user_context.user_id))]
    pub fn get_candidates(&self, user_context: &UserContext, limit: usize) -> Vec<ScoredItem> {
        let mut candidates = Vec::new();

        for place_id in &user_context.favourite_restaurants {
            let Some(favourite) = self.data_index.get_restaurant(place_id) else {
                warn!(place_id = %place_id, "Favourite restaurant not in catalogue, skipping");
                continue;
            };
            debug!("Scoring catalogue against favourite {}", favourite.name);
            candidates.extend(self.similar_to(favourite));
        }

        candidates.sort_by(|a, b| b.rank_score().total_cmp(&a.rank_score()));
        candidates.truncate(limit);

        debug!("Generated {} content-based candidates", candidates.len());
        candidates
    }

    /// Score every other restaurant against one favourite
    pub fn similar_to(&self, favourite: &Restaurant) -> Vec<ScoredItem> {
        let stats = self.data_index.stats();
        let favourite_categories = favourite.category_set();

        let catalogue: Vec<&Restaurant> = self.data_index.restaurants().collect();
        let mut items: Vec<ScoredItem> = catalogue
            .par_iter()
            .filter(|r| r.place_id != favourite.place_id)
            .map(|candidate| {
                let common: BTreeSet<String> = favourite_categories
                    .intersection(&candidate.category_set())
                    .cloned()
                    .collect();
                let score = self.score_pair(favourite, candidate, !common.is_empty(), stats);

                let mut item = ScoredItem::from_restaurant(candidate, score)
                    .with_source(Source::ContentBased);
                item.common_categories = common.into_iter().collect();
                item
            })
            .collect();

        items.sort_by(|a, b| b.rank_score().total_cmp(&a.rank_score()));
        items
    }

    fn score_pair(
        &self,
        favourite: &Restaurant,
        candidate: &Restaurant,
        categories_overlap: bool,
        stats: CatalogueStats,
    ) -> f32 {
        let w = &self.weights;
        let fa = &favourite.attributes;
        let ca = &candidate.attributes;

        let text_score = self.similarity.similarity(favourite, candidate);
        let category_score = if categories_overlap { 1.0 } else { 0.0 };

        let rating = |r: Option<f32>| r.unwrap_or(stats.median_rating);
        let rating_score = 1.0 - (rating(ca.rating) - rating(fa.rating)).abs() / 5.0;

        let price = |p: Option<f32>| p.unwrap_or(stats.median_price_level);
        let price_score = 1.0 - (price(ca.price_level) - price(fa.price_level)).abs() / 3.0;

        let distance_score = match (fa.latitude, fa.longitude, ca.latitude, ca.longitude) {
            (Some(lat1), Some(lon1), Some(lat2), Some(lon2)) => {
                let km = haversine_km(lat1, lon1, lat2, lon2);
                if km <= w.max_distance_km {
                    (1.0 - km / w.max_distance_km) as f32
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };

        w.text * text_score
            + w.category * category_score
            + w.rating * rating_score
            + w.price * price_score
            + w.distance * distance_score
    }
}

/// Great-circle distance between two coordinates, in kilometres
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{CategoryUniverse, UserProfile};

    fn place(id: &str, name: &str, categories: &[&str], lat: f64, lon: f64, rating: f32) -> Restaurant {
        let mut r = Restaurant::new(id, name, categories);
        r.attributes.latitude = Some(lat);
        r.attributes.longitude = Some(lon);
        r.attributes.rating = Some(rating);
        r.attributes.price_level = Some(2.0);
        r
    }

    fn create_test_index() -> Arc<DataIndex> {
        let restaurants = vec![
            place("fav", "Nasi Lemak House", &["malay"], 3.1390, 101.6869, 4.5),
            place("near", "Nasi Lemak Corner", &["malay"], 3.1400, 101.6870, 4.4),
            place("far", "Sushi Bay", &["japanese"], 5.4141, 100.3288, 3.0),
        ];
        let users = vec![UserProfile {
            user_id: "u1".to_string(),
            favourite_restaurants: vec!["fav".to_string(), "missing".to_string()],
            ..UserProfile::default()
        }];
        Arc::new(DataIndex::from_records(restaurants, users, &CategoryUniverse::default()).unwrap())
    }

    #[test]
    fn test_haversine() {
        assert!(haversine_km(3.139, 101.6869, 3.139, 101.6869).abs() < 1e-9);
        // Kuala Lumpur to George Town is roughly 290 km
        let km = haversine_km(3.1390, 101.6869, 5.4141, 100.3288);
        assert!((km - 293.0).abs() < 10.0, "got {km}");
    }

    #[test]
    fn test_term_overlap_similarity() {
        let sim = TermOverlapSimilarity;
        let a = Restaurant::new("a", "Nasi Lemak House", &[]);
        let b = Restaurant::new("b", "Nasi Lemak House", &[]);
        let c = Restaurant::new("c", "Sushi Bay", &[]);

        assert!((sim.similarity(&a, &b) - 1.0).abs() < 1e-6);
        assert_eq!(sim.similarity(&a, &c), 0.0);
    }

    #[test]
    fn test_similar_to_excludes_self_and_ranks_near_first() {
        let index = create_test_index();
        let source = ContentBasedSource::new(Arc::clone(&index));
        let favourite = index.get_restaurant("fav").unwrap();

        let items = source.similar_to(favourite);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].place_id.as_deref(), Some("near"));
        assert_eq!(items[0].common_categories, vec!["malay"]);
        assert!(items[1].common_categories.is_empty());
        assert!(items.iter().all(|i| i.source == Some(Source::ContentBased)));
    }

    #[test]
    fn test_score_components() {
        let index = create_test_index();
        // Only the category term contributes
        let weights = ContentWeights {
            text: 0.0,
            category: 1.0,
            rating: 0.0,
            price: 0.0,
            distance: 0.0,
            max_distance_km: 20.0,
        };
        let source = ContentBasedSource::new(Arc::clone(&index)).with_weights(weights);
        let items = source.similar_to(index.get_restaurant("fav").unwrap());

        assert_eq!(items[0].score, Some(1.0));
        assert_eq!(items[1].score, Some(0.0));
    }

    #[test]
    fn test_missing_favourite_is_skipped() {
        let index = create_test_index();
        let source = ContentBasedSource::new(Arc::clone(&index));
        let context = crate::user_context::build_user_context(&index, "u1").unwrap();

        let candidates = source.get_candidates(&context, 10);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_weights_builder() {
        let weights = ContentWeights::default().with_text(0.5).with_distance(0.0);
        assert_eq!(weights.text, 0.5);
        assert_eq!(weights.distance, 0.0);
        assert_eq!(weights.category, 0.2);
    }
}
