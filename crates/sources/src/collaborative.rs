//! Collaborative Source - rating-prediction based recommendations
//!
//! Scores every restaurant that appears in the ratings store but that the user
//! has not rated yet: "what would this user rate it?"
//!
//! ## Algorithm
//! 1. Collect place ids from the ratings store the user has not rated
//! 2. Ask the injected [`RatingPredictor`] for an estimate on the 1-5 scale
//! 3. Normalise the estimate to `[0, 1]` (`est / 5`)
//! 4. Attach the catalogue record, or an `"Unknown"` placeholder
//! 5. Sort by score descending

use crate::types::{ScoredItem, Source, UserContext};
use data_loader::{DataIndex, PlaceId, UserId};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Lowest and highest value on the rating scale
pub const RATING_SCALE: (f32, f32) = (0.0, 5.0);

/// Black-box rating model.
///
/// Returns `None` when the model has nothing to say about the pair.
pub trait RatingPredictor: Send + Sync {
    fn predict(&self, user_id: &str, place_id: &str) -> Option<f32>;
}

/// Baseline estimator: global mean plus regularised user and item biases.
///
/// `r̂(u, i) = μ + b_u + b_i`, clipped to 1-5.
#[derive(Debug, Clone, Default)]
pub struct BaselinePredictor {
    global_mean: Option<f32>,
    user_bias: HashMap<UserId, f32>,
    item_bias: HashMap<PlaceId, f32>,
}

impl BaselinePredictor {
    /// Fit with default regularisation (items: 10, users: 15)
    pub fn fit(data_index: &DataIndex) -> Self {
        Self::fit_with_regularization(data_index, 10.0, 15.0)
    }

    /// Fit biases from every rating in the index.
    ///
    /// Item biases are fitted first, user biases on the residuals.
    pub fn fit_with_regularization(data_index: &DataIndex, reg_item: f32, reg_user: f32) -> Self {
        let place_ids = data_index.rated_place_ids();

        let (sum, count) = place_ids
            .par_iter()
            .map(|id| {
                let ratings = data_index.get_restaurant_ratings(id);
                (ratings.iter().map(|r| r.rating).sum::<f32>(), ratings.len())
            })
            .reduce(|| (0.0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

        if count == 0 {
            return Self::default();
        }
        let mu = sum / count as f32;

        let item_bias: HashMap<PlaceId, f32> = place_ids
            .par_iter()
            .map(|id| {
                let ratings = data_index.get_restaurant_ratings(id);
                let dev: f32 = ratings.iter().map(|r| r.rating - mu).sum();
                (id.clone(), dev / (reg_item + ratings.len() as f32))
            })
            .collect();

        let user_bias: HashMap<UserId, f32> = data_index
            .user_ids()
            .par_iter()
            .filter_map(|user_id| {
                let ratings = data_index.get_user_ratings(user_id);
                if ratings.is_empty() {
                    return None;
                }
                let dev: f32 = ratings
                    .iter()
                    .map(|r| r.rating - mu - item_bias.get(&r.place_id).copied().unwrap_or(0.0))
                    .sum();
                Some((user_id.clone(), dev / (reg_user + ratings.len() as f32)))
            })
            .collect();

        debug!(
            global_mean = mu,
            users = user_bias.len(),
            items = item_bias.len(),
            "Fitted baseline predictor"
        );

        Self {
            global_mean: Some(mu),
            user_bias,
            item_bias,
        }
    }

    pub fn global_mean(&self) -> Option<f32> {
        self.global_mean
    }
}

impl RatingPredictor for BaselinePredictor {
    fn predict(&self, user_id: &str, place_id: &str) -> Option<f32> {
        let mu = self.global_mean?;
        let bu = self.user_bias.get(user_id).copied().unwrap_or(0.0);
        let bi = self.item_bias.get(place_id).copied().unwrap_or(0.0);
        Some((mu + bu + bi).clamp(1.0, 5.0))
    }
}

/// Estimates computed elsewhere (e.g. by a remote model) for a single user.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedRatings {
    user_id: UserId,
    estimates: HashMap<PlaceId, f32>,
}

impl PrecomputedRatings {
    pub fn new<I>(user_id: impl Into<UserId>, estimates: I) -> Self
    where
        I: IntoIterator<Item = (PlaceId, f32)>,
    {
        Self {
            user_id: user_id.into(),
            estimates: estimates.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }
}

impl RatingPredictor for PrecomputedRatings {
    fn predict(&self, user_id: &str, place_id: &str) -> Option<f32> {
        if user_id != self.user_id {
            return None;
        }
        self.estimates.get(place_id).copied()
    }
}

/// Collaborative source: scores unrated places with a rating model
#[derive(Clone)]
pub struct CollaborativeSource {
    /// Shared reference to the data index (read-only, so no Mutex needed)
    data_index: Arc<DataIndex>,

    predictor: Arc<dyn RatingPredictor>,
}

impl CollaborativeSource {
    pub fn new(data_index: Arc<DataIndex>, predictor: Arc<dyn RatingPredictor>) -> Self {
        Self {
            data_index,
            predictor,
        }
    }

    /// Collaborative source backed by a [`BaselinePredictor`] fitted on the index
    pub fn with_baseline(data_index: Arc<DataIndex>) -> Self {
        let predictor = Arc::new(BaselinePredictor::fit(&data_index));
        Self::new(data_index, predictor)
    }

    /// Places eligible for scoring: rated by someone, not by this user.
    ///
    /// Deduplicated, in first-rated order.
    pub fn candidate_place_ids(&self, user_context: &UserContext) -> Vec<PlaceId> {
        let mut seen = HashSet::new();
        self.data_index
            .rated_place_ids()
            .iter()
            .filter(|id| !user_context.has_rated(id) && seen.insert(id.as_str()))
            .cloned()
            .collect()
    }

    /// Generate scored recommendations for a user
    #[instrument(skip(self, user_context), fields(user_id = %user_context.user_id))]
    pub fn get_candidates(&self, user_context: &UserContext, limit: usize) -> Vec<ScoredItem> {
        let place_ids = self.candidate_place_ids(user_context);
        debug!("Scoring {} unrated places", place_ids.len());

        let mut candidates: Vec<ScoredItem> = place_ids
            .par_iter()
            .filter_map(|place_id| {
                let estimate = self.predictor.predict(&user_context.user_id, place_id)?;
                let score = normalize_estimate(estimate);
                let item = match self.data_index.get_restaurant(place_id) {
                    Some(restaurant) => ScoredItem::from_restaurant(restaurant, score),
                    None => ScoredItem::unknown(place_id.clone(), score),
                };
                Some(item.with_source(Source::Collaborative))
            })
            .collect();

        candidates.sort_by(|a, b| b.rank_score().total_cmp(&a.rank_score()));
        candidates.truncate(limit);

        debug!("Generated {} collaborative candidates", candidates.len());
        candidates
    }
}

/// Map an estimate on the rating scale to `[0, 1]`
pub fn normalize_estimate(estimate: f32) -> f32 {
    let (min, max) = RATING_SCALE;
    (estimate - min) / (max - min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_context::build_user_context;
    use data_loader::{Restaurant, UserProfile};

    fn create_test_index() -> DataIndex {
        let mut index = DataIndex::new();
        for id in ["p1", "p2", "p3"] {
            index.insert_restaurant(Restaurant::new(id, format!("Place {id}"), &["cafe"]));
        }

        index.insert_user(UserProfile {
            user_id: "u1".to_string(),
            ratings: HashMap::from([("p1".to_string(), 5.0)]),
            ..UserProfile::default()
        });
        index.insert_user(UserProfile {
            user_id: "u2".to_string(),
            ratings: HashMap::from([
                ("p1".to_string(), 5.0),
                ("p2".to_string(), 4.0),
                ("p9".to_string(), 2.0),
            ]),
            ..UserProfile::default()
        });
        index
    }

    #[test]
    fn test_normalize_estimate() {
        assert_eq!(normalize_estimate(5.0), 1.0);
        assert_eq!(normalize_estimate(2.5), 0.5);
    }

    #[test]
    fn test_baseline_biases() {
        let index = create_test_index();
        let baseline = BaselinePredictor::fit_with_regularization(&index, 0.0, 0.0);

        // mu = (5 + 5 + 4 + 2) / 4 = 4.0
        assert_eq!(baseline.global_mean(), Some(4.0));
        // p9 only got a 2.0, so it must predict below p2
        let p2 = baseline.predict("u1", "p2").unwrap();
        let p9 = baseline.predict("u1", "p9").unwrap();
        assert!(p2 > p9);
        assert!((1.0..=5.0).contains(&p9));
    }

    #[test]
    fn test_empty_baseline_predicts_nothing() {
        let baseline = BaselinePredictor::fit(&DataIndex::new());
        assert_eq!(baseline.predict("u1", "p1"), None);
    }

    #[test]
    fn test_candidates_skip_rated_and_mark_unknown() {
        let index = Arc::new(create_test_index());
        let predictor = Arc::new(PrecomputedRatings::new(
            "u1",
            [("p2".to_string(), 4.0), ("p9".to_string(), 4.5)],
        ));
        let source = CollaborativeSource::new(Arc::clone(&index), predictor);
        let context = build_user_context(&index, "u1").unwrap();

        assert_eq!(source.candidate_place_ids(&context), vec!["p2", "p9"]);

        let candidates = source.get_candidates(&context, 10);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].place_id.as_deref(), Some("p9"));
        assert_eq!(candidates[0].name.as_deref(), Some("Unknown"));
        assert!((candidates[0].rank_score() - 0.9).abs() < 1e-6);
        assert_eq!(candidates[1].name.as_deref(), Some("Place p2"));
        assert!(candidates.iter().all(|c| c.source == Some(Source::Collaborative)));
    }

    #[test]
    fn test_precomputed_ignores_other_users() {
        let ratings = PrecomputedRatings::new("u1", [("p2".to_string(), 4.0)]);
        assert_eq!(ratings.predict("u2", "p2"), None);
        assert_eq!(ratings.predict("u1", "p2"), Some(4.0));
    }

    #[test]
    fn test_with_baseline_limit() {
        let index = Arc::new(create_test_index());
        let source = CollaborativeSource::with_baseline(Arc::clone(&index));
        let context = build_user_context(&index, "u1").unwrap();

        let candidates = source.get_candidates(&context, 1);
        assert_eq!(candidates.len(), 1);
    }
}
