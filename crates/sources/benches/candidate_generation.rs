//! Benchmarks for candidate generation
//!
//! Run with: cargo bench --package sources
//!
//! Uses a synthetic catalogue of 2,000 restaurants and 500 users.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{CategoryUniverse, DataIndex, Restaurant, UserProfile};
use sources::{user_context::build_user_context, CollaborativeSource, ContentBasedSource};
use std::collections::HashMap;
use std::sync::Arc;

const CATEGORIES: [&str; 6] = ["cafe", "malay", "chinese", "western", "halal", "bar"];

fn synthetic_index() -> Arc<DataIndex> {
    let restaurants: Vec<Restaurant> = (0..2000)
        .map(|i| {
            let categories = [CATEGORIES[i % 6], CATEGORIES[(i / 6) % 6]];
            let mut r = Restaurant::new(format!("p{i}"), format!("Restaurant {i}"), &categories);
            r.attributes.latitude = Some(3.0 + (i % 50) as f64 * 0.01);
            r.attributes.longitude = Some(101.5 + (i / 50) as f64 * 0.01);
            r.attributes.rating = Some(3.0 + (i % 20) as f32 * 0.1);
            r.attributes.price_level = Some((i % 4) as f32);
            r
        })
        .collect();

    let users: Vec<UserProfile> = (0..500)
        .map(|u| UserProfile {
            user_id: format!("u{u}"),
            ratings: (0..20)
                .map(|j| (format!("p{}", (u * 7 + j * 13) % 2000), 1.0 + ((u + j) % 5) as f32))
                .collect::<HashMap<_, _>>(),
            favourite_restaurants: vec![format!("p{}", u % 2000)],
            preferences: Vec::new(),
        })
        .collect();

    let index = DataIndex::from_records(restaurants, users, &CategoryUniverse::default())
        .expect("Failed to build synthetic index");
    Arc::new(index)
}

fn bench_collaborative_candidates(c: &mut Criterion) {
    let data_index = synthetic_index();
    let collaborative = CollaborativeSource::with_baseline(data_index.clone());
    let context = build_user_context(&data_index, "u1").expect("Failed to build user context");

    c.bench_function("collaborative_get_candidates", |b| {
        b.iter(|| {
            let candidates = collaborative.get_candidates(black_box(&context), black_box(300));
            black_box(candidates)
        })
    });
}

fn bench_content_candidates(c: &mut Criterion) {
    let data_index = synthetic_index();
    let content = ContentBasedSource::new(data_index.clone());
    let context = build_user_context(&data_index, "u1").expect("Failed to build user context");

    c.bench_function("content_get_candidates", |b| {
        b.iter(|| {
            let candidates = content.get_candidates(black_box(&context), black_box(200));
            black_box(candidates)
        })
    });
}

fn bench_build_user_context(c: &mut Criterion) {
    let data_index = synthetic_index();

    c.bench_function("build_user_context", |b| {
        b.iter(|| {
            let context = build_user_context(&data_index, black_box("u1")).unwrap();
            black_box(context)
        })
    });
}

criterion_group!(
    benches,
    bench_collaborative_candidates,
    bench_content_candidates,
    bench_build_user_context
);
criterion_main!(benches);
