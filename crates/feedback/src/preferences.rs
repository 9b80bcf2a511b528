//! Per-category preference accumulator and session summary.

use crate::action::Action;
use data_loader::CategoryUniverse;
use std::collections::BTreeSet;
use std::fmt;

/// Signed affinity per known category, all starting at zero.
///
/// Categories outside the universe are never added.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceVector {
    universe: CategoryUniverse,
    values: Vec<i32>,
}

impl PreferenceVector {
    pub fn new(universe: CategoryUniverse) -> Self {
        let values = vec![0; universe.len()];
        Self { universe, values }
    }

    pub fn universe(&self) -> &CategoryUniverse {
        &self.universe
    }

    /// Current accumulator for a category (None if unknown)
    pub fn get(&self, category: &str) -> Option<i32> {
        self.universe.position(category).map(|pos| self.values[pos])
    }

    /// Add the action's weight to every known category in `categories`
    pub fn apply<'a, I>(&mut self, action: Action, categories: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let weight = action.weight();
        for category in categories {
            if let Some(pos) = self.universe.position(category) {
                self.values[pos] += weight;
            }
        }
    }

    /// Sum of accumulators over the given categories
    pub fn score<'a, I>(&self, categories: I) -> i32
    where
        I: IntoIterator<Item = &'a String>,
    {
        categories.into_iter().filter_map(|c| self.get(c)).sum()
    }

    /// All categories with their accumulators, highest first.
    ///
    /// Ties keep universe order.
    pub fn ranked(&self) -> Vec<(&str, i32)> {
        let mut ranked: Vec<(&str, i32)> = self.universe.keys().zip(self.values.iter().copied()).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// The `n` highest-scoring categories
    pub fn top_categories(&self, n: usize) -> Vec<(&str, i32)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

/// Jaccard similarity of two category sets; 0 when both are empty
pub fn category_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / union as f32
}

/// Snapshot of what the session has learned about the user
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceSummary {
    pub categories: Vec<(String, i32)>,
    pub avg_price_level: Option<f32>,
    pub avg_rating: Option<f32>,
}

impl PreferenceSummary {
    pub fn new(preferences: &PreferenceVector, price_levels: &[f32], ratings: &[f32]) -> Self {
        let mean = |values: &[f32]| {
            (!values.is_empty()).then(|| values.iter().sum::<f32>() / values.len() as f32)
        };
        Self {
            categories: preferences
                .ranked()
                .into_iter()
                .map(|(c, v)| (c.to_string(), v))
                .collect(),
            avg_price_level: mean(price_levels),
            avg_rating: mean(ratings),
        }
    }

    /// The `n` highest-scoring categories
    pub fn top_categories(&self, n: usize) -> &[(String, i32)] {
        &self.categories[..n.min(self.categories.len())]
    }
}

impl fmt::Display for PreferenceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Categories:")?;
        for (category, value) in &self.categories {
            writeln!(f, "  - {category}: {value}")?;
        }
        if let Some(price) = self.avg_price_level {
            writeln!(f, "Avg. Price Level: {price:.2}")?;
        }
        if let Some(rating) = self.avg_rating {
            writeln!(f, "Avg. Rating: {rating:.2}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_starts_at_zero() {
        let prefs = PreferenceVector::new(CategoryUniverse::default());
        assert!(prefs.ranked().iter().all(|(_, v)| *v == 0));
        assert_eq!(prefs.get("halal"), Some(0));
        assert_eq!(prefs.get("italian"), None);
    }

    #[test]
    fn test_apply_ignores_unknown_categories() {
        let mut prefs = PreferenceVector::new(CategoryUniverse::default());
        prefs.apply(Action::Like, &cats(&["halal", "italian"]));
        prefs.apply(Action::Click, &cats(&["halal"]));

        assert_eq!(prefs.get("halal"), Some(3));
        assert_eq!(prefs.get("italian"), None);
        assert_eq!(prefs.score(&cats(&["halal", "italian", "cafe"])), 3);
    }

    #[test]
    fn test_top_categories_order() {
        let mut prefs = PreferenceVector::new(CategoryUniverse::from_keys(["a", "b", "c"]));
        prefs.apply(Action::Like, &cats(&["c"]));
        prefs.apply(Action::Unlike, &cats(&["a"]));

        assert_eq!(prefs.top_categories(2), vec![("c", 2), ("b", 0)]);
    }

    #[test]
    fn test_category_similarity() {
        assert_eq!(category_similarity(&cats(&[]), &cats(&[])), 0.0);
        assert_eq!(category_similarity(&cats(&["a", "b"]), &cats(&["b", "c"])), 1.0 / 3.0);
        assert_eq!(category_similarity(&cats(&["a"]), &cats(&["a"])), 1.0);
    }

    #[test]
    fn test_summary() {
        let mut prefs = PreferenceVector::new(CategoryUniverse::from_keys(["cafe", "bar"]));
        prefs.apply(Action::Like, &cats(&["bar"]));

        let summary = PreferenceSummary::new(&prefs, &[1.0, 2.0], &[]);
        assert_eq!(summary.avg_price_level, Some(1.5));
        assert_eq!(summary.avg_rating, None);
        assert_eq!(summary.top_categories(1), [("bar".to_string(), 2)]);
        assert_eq!(
            summary.to_string(),
            "Categories:\n  - bar: 2\n  - cafe: 0\nAvg. Price Level: 1.50\n"
        );
    }
}
