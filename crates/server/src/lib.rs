//! Server crate for the restaurant recommendation engine.
//!
//! This crate contains the orchestrator that runs both scoring providers,
//! merges their output and persists the hybrid ranking.

pub mod orchestrator;

pub use orchestrator::{HybridOrchestrator, HybridReport};
