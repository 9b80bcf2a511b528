//! # Sources Crate
//!
//! Scoring providers for restaurant recommendations.
//!
//! ## Components
//!
//! ### Collaborative Source
//! Rating prediction for places the user has not rated:
//! - Any [`RatingPredictor`] can back it (baseline biases, a remote model, ...)
//! - Estimates are normalised from the 1-5 scale to `[0, 1]`
//!
//! ### Content-Based Source
//! Similarity to the user's favourite restaurants:
//! - Text similarity, category overlap, rating, price and distance
//! - Weighted blend configurable through [`ContentWeights`]
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{CollaborativeSource, ContentBasedSource, user_context::build_user_context};
//! use data_loader::DataIndex;
//! use std::sync::Arc;
//!
//! let data_index = Arc::new(DataIndex::load_from_files(Path::new("data"))?);
//! let context = build_user_context(&data_index, "u1")?;
//!
//! let collaborative = CollaborativeSource::with_baseline(data_index.clone());
//! let content = ContentBasedSource::new(data_index.clone());
//!
//! let collab_items = collaborative.get_candidates(&context, 50);
//! let content_items = content.get_candidates(&context, 50);
//! ```

pub mod collaborative;
pub mod content;
pub mod types;
pub mod user_context;

pub use collaborative::{BaselinePredictor, CollaborativeSource, PrecomputedRatings, RatingPredictor};
pub use content::{ContentBasedSource, ContentWeights, TermOverlapSimilarity, TextSimilarity};
pub use types::{ScoredItem, Source, UserContext};
