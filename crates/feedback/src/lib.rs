//! # Feedback Crate
//!
//! Online preference learning from user reactions to recommendations.
//!
//! ## Components
//!
//! - **action**: the four user actions and their weights
//! - **preferences**: per-category accumulator and session summary
//! - **agent**: the learning-agent interface and a linear Q-learning default
//! - **session**: [`FeedbackSession`], a present/submit state machine
//!
//! ## Example Usage
//!
//! ```ignore
//! use feedback::{FeedbackSession, LinearQAgent};
//! use pipeline::StateEncoder;
//!
//! let universe = CategoryUniverse::default();
//! let agent = LinearQAgent::new(StateEncoder::new(universe.clone()).state_size(), 4);
//! let mut session = FeedbackSession::new(ranking, universe, agent, rand::rng())?;
//!
//! while let Some(presented) = session.present_item() {
//!     println!("{:?}", presented.item.name);
//!     session.submit_action("like")?;
//! }
//! println!("{}", session.summary());
//! ```

pub mod action;
pub mod agent;
pub mod error;
pub mod preferences;
pub mod session;

pub use action::Action;
pub use agent::{LearningAgent, LinearQAgent, Transition};
pub use error::{FeedbackError, Result};
pub use preferences::{category_similarity, PreferenceSummary, PreferenceVector};
pub use session::{FeedbackSession, Presented, UpdateResult, DEFAULT_EPISODES};
