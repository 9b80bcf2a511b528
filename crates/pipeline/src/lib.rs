//! Ranking pipeline for restaurant recommendations.
//!
//! This crate provides:
//! - [`merge`]: the hybrid merge of content-based and collaborative lists
//! - Evaluation metrics (precision@k, recall@k, MRR) and [`EvaluationReport`]
//! - [`StateEncoder`] for the feedback learner's state vectors
//! - JSON persistence of merged rankings
//!
//! ## Architecture
//! Rankings flow through the pipeline in stages:
//! 1. Providers score candidates (see the `sources` crate)
//! 2. `merge` deduplicates and ranks them, tagging provenance
//! 3. The ranking is persisted and evaluated against a relevance set
//! 4. The feedback loop encodes it into states for online learning
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{merge, save_hybrid_recommendations, EvaluationReport};
//!
//! let ranking = merge(content_items, collab_items)?;
//! save_hybrid_recommendations(Path::new("hybrid_output"), "u1", &ranking)?;
//!
//! let ids: Vec<&str> = ranking.iter().filter_map(|i| i.place_id.as_deref()).collect();
//! println!("{}", EvaluationReport::evaluate(&ids, &relevant, 10)?);
//! ```

pub mod error;
pub mod evaluation;
pub mod export;
pub mod features;
pub mod hybrid;

pub use error::{PipelineError, Result};
pub use evaluation::{mean_reciprocal_rank, precision_at_k, recall_at_k, EvaluationReport};
pub use export::{load_hybrid_recommendations, save_hybrid_recommendations, DEFAULT_OUTPUT_DIR};
pub use features::StateEncoder;
pub use hybrid::merge;
