//! State-vector encoding for the feedback learner.
//!
//! Each item becomes `[rating, price_level, score, one-hot categories...]`.
//! The three numeric columns are min-max scaled over the item set, so an
//! encoding is only meaningful relative to the items it was built from.

use data_loader::CategoryUniverse;
use rayon::prelude::*;
use sources::ScoredItem;

/// Number of numeric columns ahead of the category one-hot
pub const NUMERIC_FEATURES: usize = 3;

/// Min and max of one numeric column, plus the value used for missing cells
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnScale {
    min: f32,
    max: f32,
    fill: f32,
}

impl ColumnScale {
    fn fit(values: &[Option<f32>]) -> Self {
        let mut present: Vec<f32> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return Self { min: 0.0, max: 0.0, fill: 0.0 };
        }
        present.sort_by(|a, b| a.total_cmp(b));
        let mid = present.len() / 2;
        let fill = if present.len() % 2 == 0 {
            (present[mid - 1] + present[mid]) / 2.0
        } else {
            present[mid]
        };
        Self {
            min: present[0],
            max: present[present.len() - 1],
            fill,
        }
    }

    /// Scale into `[0, 1]`; a constant column maps to 0
    fn transform(&self, value: Option<f32>) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        (value.unwrap_or(self.fill) - self.min) / range
    }
}

fn column<F>(items: &[ScoredItem], get: F) -> (Vec<Option<f32>>, ColumnScale)
where
    F: Fn(&ScoredItem) -> Option<f32>,
{
    let values: Vec<Option<f32>> = items.iter().map(get).collect();
    let scale = ColumnScale::fit(&values);
    (values, scale)
}

/// Encodes scored items into fixed-width state vectors.
#[derive(Debug, Clone)]
pub struct StateEncoder {
    universe: CategoryUniverse,
}

impl Default for StateEncoder {
    fn default() -> Self {
        Self::new(CategoryUniverse::default())
    }
}

impl StateEncoder {
    pub fn new(universe: CategoryUniverse) -> Self {
        Self { universe }
    }

    pub fn universe(&self) -> &CategoryUniverse {
        &self.universe
    }

    /// Width of every encoded state
    pub fn state_size(&self) -> usize {
        NUMERIC_FEATURES + self.universe.len()
    }

    /// Encode all items, one state per item in the same order.
    pub fn encode(&self, items: &[ScoredItem]) -> Vec<Vec<f32>> {
        let (ratings, rating_scale) = column(items, |i| i.attributes.rating);
        let (prices, price_scale) = column(items, |i| i.attributes.price_level);
        let (scores, score_scale) = column(items, |i| i.score);

        items
            .par_iter()
            .enumerate()
            .map(|(idx, item)| {
                let mut state = Vec::with_capacity(self.state_size());
                state.push(rating_scale.transform(ratings[idx]));
                state.push(price_scale.transform(prices[idx]));
                state.push(score_scale.transform(scores[idx]));
                state.extend(self.universe.keys().map(|key| {
                    if item.categories.contains(key) { 1.0 } else { 0.0 }
                }));
                state
            })
            .collect()
    }
}
