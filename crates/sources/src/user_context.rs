//! Helper functions to build UserContext from DataIndex
//!
//! Aggregates everything the providers need about a user up front so that
//! candidate scoring never goes back to the profile store.

use crate::types::UserContext;
use anyhow::{anyhow, Result};
use data_loader::DataIndex;

/// Build a UserContext from DataIndex for a given user
///
/// Gathers:
/// - Places rated by the user
/// - Favourite restaurants (seeds for content-based scoring)
/// - Stated preferences
/// - Average rating given by the user
pub fn build_user_context(data_index: &DataIndex, user_id: &str) -> Result<UserContext> {
    let user = data_index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;

    let mut context = UserContext::new(user_id);
    context.favourite_restaurants = user.favourite_restaurants.clone();
    context.preferences = user.preferences.clone();

    let ratings = data_index.get_user_ratings(user_id);
    if ratings.is_empty() {
        return Ok(context);
    }

    let total: f32 = ratings.iter().map(|r| r.rating).sum();
    context.avg_rating = total / ratings.len() as f32;
    context.rated_places = ratings.iter().map(|r| r.place_id.clone()).collect();

    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::UserProfile;
    use std::collections::HashMap;

    fn create_test_index() -> DataIndex {
        let mut index = DataIndex::new();
        index.insert_user(UserProfile {
            user_id: "u1".to_string(),
            ratings: HashMap::from([
                ("p1".to_string(), 5.0),
                ("p2".to_string(), 3.0),
                ("p3".to_string(), 4.5),
            ]),
            favourite_restaurants: vec!["p1".to_string()],
            preferences: vec!["halal".to_string()],
        });
        index.insert_user(UserProfile {
            user_id: "u2".to_string(),
            ..UserProfile::default()
        });
        index
    }

    #[test]
    fn test_build_user_context_basic() {
        let index = create_test_index();
        let context = build_user_context(&index, "u1").unwrap();

        assert_eq!(context.user_id, "u1");
        assert_eq!(context.rated_places.len(), 3);
        assert!(context.has_rated("p2"));
        assert_eq!(context.favourite_restaurants, vec!["p1"]);
        assert_eq!(context.preferences, vec!["halal"]);
    }

    #[test]
    fn test_build_user_context_avg_rating() {
        let index = create_test_index();
        let context = build_user_context(&index, "u1").unwrap();

        // (5.0 + 3.0 + 4.5) / 3 = 4.166...
        assert!((context.avg_rating - 4.166).abs() < 0.01);
    }

    #[test]
    fn test_user_not_found() {
        let index = DataIndex::new();
        assert!(build_user_context(&index, "ghost").is_err());
    }

    #[test]
    fn test_user_with_no_ratings() {
        let index = create_test_index();
        let context = build_user_context(&index, "u2").unwrap();
        assert!(context.rated_places.is_empty());
        assert_eq!(context.avg_rating, 0.0);
    }
}
