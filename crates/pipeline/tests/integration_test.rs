//! Integration tests for the pipeline.
//!
//! Providers feed the hybrid merge, the ranking is persisted, evaluated and
//! encoded, all against one small in-memory catalogue.

use data_loader::{CategoryUniverse, DataIndex, Restaurant, UserProfile};
use pipeline::{
    load_hybrid_recommendations, merge, save_hybrid_recommendations, EvaluationReport,
    StateEncoder,
};
use sources::{
    user_context::build_user_context, CollaborativeSource, ContentBasedSource, PrecomputedRatings,
    ScoredItem, Source,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

fn restaurant(id: &str, name: &str, categories: &[&str], lat: f64, rating: f32) -> Restaurant {
    let mut r = Restaurant::new(id, name, categories);
    r.attributes.latitude = Some(lat);
    r.attributes.longitude = Some(101.69);
    r.attributes.rating = Some(rating);
    r.attributes.price_level = Some(2.0);
    r
}

fn create_test_setup() -> Arc<DataIndex> {
    let restaurants = vec![
        restaurant("fav", "Nasi Lemak Wangi", &["malay", "halal"], 3.14, 4.5),
        restaurant("r1", "Nasi Lemak Bumbung", &["malay"], 3.15, 4.4),
        restaurant("r2", "Kopi Tiam Lama", &["chinese", "cafe"], 3.20, 4.0),
        restaurant("r3", "Burger Lab", &["western"], 3.60, 3.8),
    ];
    let users = vec![
        UserProfile {
            user_id: "u1".to_string(),
            ratings: HashMap::from([("fav".to_string(), 5.0)]),
            favourite_restaurants: vec!["fav".to_string()],
            preferences: vec![],
        },
        UserProfile {
            user_id: "u2".to_string(),
            ratings: HashMap::from([
                ("fav".to_string(), 5.0),
                ("r2".to_string(), 4.0),
                ("gone".to_string(), 3.0),
            ]),
            ..UserProfile::default()
        },
    ];
    Arc::new(DataIndex::from_records(restaurants, users, &CategoryUniverse::default()).unwrap())
}

#[test]
fn test_full_pipeline() {
    let index = create_test_setup();
    let context = build_user_context(&index, "u1").unwrap();

    let content = ContentBasedSource::new(Arc::clone(&index)).get_candidates(&context, 10);
    let predictor = Arc::new(PrecomputedRatings::new(
        "u1",
        [("r2".to_string(), 4.5), ("gone".to_string(), 2.0)],
    ));
    let collab = CollaborativeSource::new(Arc::clone(&index), predictor).get_candidates(&context, 10);

    assert_eq!(content.len(), 3);
    assert_eq!(collab.len(), 2);

    let ranking = merge(content, collab).unwrap();

    // r1, r2, r3 from content plus "gone" from collaborative
    assert_eq!(ranking.len(), 4);
    let ids: HashSet<&str> = ranking.iter().filter_map(|i| i.identity_key()).collect();
    assert_eq!(ids.len(), 4);

    let r2 = ranking.iter().find(|i| i.place_id.as_deref() == Some("r2")).unwrap();
    assert_eq!(r2.source, Some(Source::Both));
    assert!((r2.rank_score() - 0.9).abs() < 1e-6);
    assert!(r2.common_categories.is_empty());

    let gone = ranking.iter().find(|i| i.place_id.as_deref() == Some("gone")).unwrap();
    assert_eq!(gone.source, Some(Source::Collaborative));
    assert_eq!(gone.name.as_deref(), Some("Unknown"));

    assert!(ranking.windows(2).all(|w| w[0].rank_score() >= w[1].rank_score()));
}

#[test]
fn test_persist_and_evaluate() {
    let ranking = merge(
        vec![
            ScoredItem::new("a", "A", &["cafe"], 0.9),
            ScoredItem::new("b", "B", &["bar"], 0.4),
        ],
        vec![ScoredItem::new("c", "C", &["halal"], 0.6)],
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = save_hybrid_recommendations(dir.path(), "u1", &ranking).unwrap();
    let reloaded = load_hybrid_recommendations(&path).unwrap();
    assert_eq!(reloaded, ranking);

    let ids: Vec<&str> = reloaded.iter().filter_map(|i| i.place_id.as_deref()).collect();
    assert_eq!(ids, vec!["a", "c", "b"]);

    let relevant: HashSet<&str> = ["c", "z"].into_iter().collect();
    let report = EvaluationReport::evaluate(&ids, &relevant, 2).unwrap();
    assert_eq!(report.precision, 0.5);
    assert_eq!(report.recall, 0.5);
    assert_eq!(report.mrr, 0.5);
}

#[test]
fn test_encoded_states_follow_ranking() {
    let ranking = merge(
        vec![ScoredItem::new("a", "A", &["cafe"], 0.9)],
        vec![ScoredItem::new("b", "B", &["bar"], 0.1)],
    )
    .unwrap();

    let encoder = StateEncoder::default();
    let states = encoder.encode(&ranking);
    assert_eq!(states.len(), 2);
    assert!(states.iter().all(|s| s.len() == encoder.state_size()));
    assert_eq!(states[0][2], 1.0);
    assert_eq!(states[1][2], 0.0);
}
