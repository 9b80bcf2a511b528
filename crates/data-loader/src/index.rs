//! DataIndex building and indexing logic.
//!
//! Builds the DataIndex from parsed data:
//! - Primary indices (restaurants, users, ratings)
//! - Secondary indices (category_index)
//! - Catalogue statistics used for imputation

use crate::categories::CategoryUniverse;
use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::path::Path;
use tracing::{info, warn};

/// Catalogue file name inside a data directory
pub const RESTAURANTS_FILE: &str = "restaurants.json";
/// User-profile file name inside a data directory
pub const USERS_FILE: &str = "users.json";

impl DataIndex {
    /// Load the catalogue and user profiles from a directory.
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Infer categories for restaurants that have none
    /// 3. Build primary and secondary indices
    /// 4. Compute catalogue statistics
    /// 5. Validate ratings
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading restaurant data from {:?}", data_dir);

        let restaurants_path = data_dir.join(RESTAURANTS_FILE);
        let users_path = data_dir.join(USERS_FILE);

        let (restaurants, users) = rayon::join(
            || parser::parse_restaurants(&restaurants_path),
            || parser::parse_users(&users_path),
        );
        let restaurants = restaurants?;
        let users = users?;

        info!(
            "Loaded {} restaurants, {} users",
            restaurants.len(),
            users.len()
        );

        Self::from_records(restaurants, users, &CategoryUniverse::default())
    }

    /// Build an index from already parsed records.
    pub fn from_records(
        mut restaurants: Vec<Restaurant>,
        users: Vec<UserProfile>,
        universe: &CategoryUniverse,
    ) -> Result<Self> {
        let inferred = infer_missing_categories(&mut restaurants, universe);
        if inferred > 0 {
            info!("Inferred categories for {} restaurants", inferred);
        }

        let mut index = DataIndex::new();
        for restaurant in restaurants {
            index.insert_restaurant(restaurant);
        }
        for user in users {
            index.insert_user(user);
        }

        index.build_secondary_indices();
        index.compute_stats();
        index.validate()?;

        let (restaurants, users, ratings) = index.counts();
        info!(
            restaurants,
            users, ratings, "DataIndex successfully built and validated"
        );
        Ok(index)
    }

    /// Rebuild the category index from the current catalogue.
    pub fn build_secondary_indices(&mut self) {
        self.category_index.clear();
        for place_id in &self.restaurant_order {
            let Some(restaurant) = self.restaurants.get(place_id) else {
                continue;
            };
            for category in restaurant.category_set() {
                self.category_index
                    .entry(category)
                    .or_default()
                    .push(place_id.clone());
            }
        }
    }

    /// Compute catalogue medians for rating and price level.
    ///
    /// Records missing a value are left out; an empty column yields 0.0.
    pub fn compute_stats(&mut self) {
        let (ratings, prices) = self
            .restaurants
            .par_iter()
            .map(|(_, r)| (r.attributes.rating, r.attributes.price_level))
            .fold(
                || (Vec::new(), Vec::new()),
                |(mut ratings, mut prices), (rating, price)| {
                    ratings.extend(rating);
                    prices.extend(price);
                    (ratings, prices)
                },
            )
            .reduce(
                || (Vec::new(), Vec::new()),
                |(mut r1, mut p1), (r2, p2)| {
                    r1.extend(r2);
                    p1.extend(p2);
                    (r1, p1)
                },
            );

        self.stats = CatalogueStats {
            median_rating: median(ratings),
            median_price_level: median(prices),
        };
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Every rating is in the valid range (1.0 - 5.0)
    /// - Every rating belongs to a known user
    ///
    /// Ratings for places missing from the catalogue are allowed; favourites
    /// that are missing are only reported.
    pub fn validate(&self) -> Result<()> {
        for (user_id, ratings) in &self.user_ratings {
            if !self.users.contains_key(user_id) {
                return Err(DataLoadError::MissingReference {
                    entity: "User".to_string(),
                    id: user_id.clone(),
                });
            }
            for rating in ratings {
                if !(1.0..=5.0).contains(&rating.rating) {
                    return Err(DataLoadError::InvalidValue {
                        field: format!("rating[{}][{}]", rating.user_id, rating.place_id),
                        value: rating.rating.to_string(),
                    });
                }
            }
        }

        for user in self.users.values() {
            let missing = user
                .favourite_restaurants
                .iter()
                .filter(|id| !self.restaurants.contains_key(id.as_str()))
                .count();
            if missing > 0 {
                warn!(
                    user_id = %user.user_id,
                    missing, "Favourite restaurants missing from catalogue"
                );
            }
        }
        Ok(())
    }
}

/// Fill in categories for records that arrived without any.
///
/// Returns how many records were updated.
fn infer_missing_categories(restaurants: &mut [Restaurant], universe: &CategoryUniverse) -> usize {
    restaurants
        .par_iter_mut()
        .filter(|r| r.categories.is_empty())
        .map(|r| {
            let text = r.descriptive_text();
            r.categories = universe.infer([text.as_str()], None).into_iter().collect();
            usize::from(!r.categories.is_empty())
        })
        .sum()
}

fn median(mut values: Vec<f32>) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn priced(id: &str, rating: Option<f32>, price: Option<f32>) -> Restaurant {
        let mut r = Restaurant::new(id, id, &["cafe"]);
        r.attributes.rating = rating;
        r.attributes.price_level = price;
        r
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![]), 0.0);
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), 2.5);
    }

    #[test]
    fn test_stats_skip_missing_values() {
        let restaurants = vec![
            priced("a", Some(4.0), None),
            priced("b", Some(3.0), Some(2.0)),
            priced("c", None, Some(1.0)),
        ];
        let index =
            DataIndex::from_records(restaurants, vec![], &CategoryUniverse::default()).unwrap();

        assert_eq!(index.stats().median_rating, 3.5);
        assert_eq!(index.stats().median_price_level, 1.5);
    }

    #[test]
    fn test_categories_inferred_when_missing() {
        let restaurants = vec![Restaurant::new("p1", "Sushi Zen", &[])];
        let index =
            DataIndex::from_records(restaurants, vec![], &CategoryUniverse::default()).unwrap();

        assert_eq!(index.get_restaurant("p1").unwrap().categories, vec!["japanese"]);
        assert_eq!(index.get_restaurants_by_category("japanese"), ["p1".to_string()]);
    }

    #[test]
    fn test_validate_rejects_out_of_range_rating() {
        let user = UserProfile {
            user_id: "u1".to_string(),
            ratings: HashMap::from([("p1".to_string(), 7.0)]),
            ..UserProfile::default()
        };
        let err = DataIndex::from_records(vec![], vec![user], &CategoryUniverse::default())
            .unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { .. }));
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(RESTAURANTS_FILE),
            r#"[
                {"place_id": "p1", "name": "Kopi House", "categories": ["cafe"], "rating": 4.5},
                {"place_id": "p2", "name": "Nasi Lemak Corner", "categories": "Unknown"}
            ]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join(USERS_FILE),
            r#"{"u1": {"ratings": {"p1": 5, "p9": 3}, "favourite_restaurants": ["p1"]}}"#,
        )
        .unwrap();

        let index = DataIndex::load_from_files(dir.path()).unwrap();
        assert_eq!(index.counts(), (2, 1, 2));
        assert_eq!(index.get_restaurant("p2").unwrap().categories, vec!["malay"]);
        assert_eq!(index.rated_place_ids(), ["p1".to_string(), "p9".to_string()]);
        assert_eq!(index.get_restaurant_ratings("p9").len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DataIndex::load_from_files(dir.path()).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
