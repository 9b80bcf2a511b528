//! One interactive feedback session over a ranked item list.
//!
//! The session alternates between presenting the unseen item with the highest
//! preference score and applying the user's reaction to it. Each answered
//! presentation, valid or not, uses up one episode.

use crate::action::Action;
use crate::agent::{LearningAgent, Transition};
use crate::error::{FeedbackError, Result};
use crate::preferences::{category_similarity, PreferenceSummary, PreferenceVector};
use data_loader::CategoryUniverse;
use pipeline::StateEncoder;
use rand::seq::IndexedRandom;
use rand::Rng;
use sources::ScoredItem;
use tracing::{debug, info, warn};

/// Episode budget when none is configured
pub const DEFAULT_EPISODES: usize = 20;

/// An item shown to the user, awaiting feedback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presented<'a> {
    pub index: usize,
    pub item: &'a ScoredItem,
    /// Sum of the preference accumulators over the item's categories
    pub preference_score: i32,
    /// What the agent expects the user to do
    pub predicted_action: Option<Action>,
}

/// Outcome of submitting feedback for the presented item
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateResult {
    Applied {
        action: Action,
        /// Action reward plus similarity bonus
        reward: f32,
        similarity: f32,
        /// Item drawn for the similarity bonus and the next state
        next_index: usize,
    },
    /// Input was not an action; nothing changed
    Rejected { input: String },
}

#[derive(Debug, Clone)]
struct Pending {
    index: usize,
    preference_score: i32,
    predicted_action: Option<Action>,
    /// Unseen pool at selection time, including `index`
    pool: Vec<usize>,
}

pub struct FeedbackSession<A, R> {
    items: Vec<ScoredItem>,
    states: Vec<Vec<f32>>,
    preferences: PreferenceVector,
    seen: Vec<bool>,
    pending: Option<Pending>,
    agent: A,
    rng: R,
    episode_budget: usize,
    episodes_used: usize,
    total_reward: f32,
    price_levels: Vec<f32>,
    ratings: Vec<f32>,
}

impl<A: LearningAgent, R: Rng> FeedbackSession<A, R> {
    /// Start a session over `items`.
    ///
    /// States are encoded up front; the agent must accept their width.
    pub fn new(items: Vec<ScoredItem>, universe: CategoryUniverse, agent: A, rng: R) -> Result<Self> {
        let encoder = StateEncoder::new(universe.clone());
        if agent.state_size() != encoder.state_size() {
            return Err(FeedbackError::StateSizeMismatch {
                expected: agent.state_size(),
                actual: encoder.state_size(),
            });
        }
        let states = encoder.encode(&items);
        info!(items = items.len(), "Starting feedback session");

        Ok(Self {
            seen: vec![false; items.len()],
            items,
            states,
            preferences: PreferenceVector::new(universe),
            pending: None,
            agent,
            rng,
            episode_budget: DEFAULT_EPISODES,
            episodes_used: 0,
            total_reward: 0.0,
            price_levels: Vec::new(),
            ratings: Vec::new(),
        })
    }

    /// Configure the number of episodes (default: 20)
    pub fn with_episode_budget(mut self, episodes: usize) -> Self {
        self.episode_budget = episodes;
        self
    }

    /// Pick and present the next item, or `None` once the session is over.
    ///
    /// Calling again before submitting feedback returns the same item.
    pub fn present_item(&mut self) -> Option<Presented<'_>> {
        if self.pending.is_none() {
            self.pending = self.select_next();
        }
        let pending = self.pending.as_ref()?;
        Some(Presented {
            index: pending.index,
            item: &self.items[pending.index],
            preference_score: pending.preference_score,
            predicted_action: pending.predicted_action,
        })
    }

    fn select_next(&mut self) -> Option<Pending> {
        if self.episodes_used >= self.episode_budget {
            return None;
        }
        let pool: Vec<usize> = (0..self.items.len()).filter(|&i| !self.seen[i]).collect();

        // Strictly greater keeps the lowest index among ties
        let mut best: Option<(usize, i32)> = None;
        for &i in &pool {
            let score = self.preferences.score(&self.items[i].categories);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((i, score));
            }
        }
        let (index, preference_score) = best?;

        self.seen[index] = true;
        let predicted_action = Action::from_index(self.agent.predict(&self.states[index]));
        debug!(index, preference_score, "Selected item");

        Some(Pending {
            index,
            preference_score,
            predicted_action,
            pool,
        })
    }

    /// Apply the user's reaction to the presented item.
    ///
    /// Unrecognised input is rejected without touching preferences or the
    /// agent, but still ends the episode.
    ///
    /// # Errors
    /// [`FeedbackError::NoPendingItem`] if nothing is being presented.
    pub fn submit_action(&mut self, input: &str) -> Result<UpdateResult> {
        let pending = self.pending.take().ok_or(FeedbackError::NoPendingItem)?;
        self.episodes_used += 1;

        let action = match input.parse::<Action>() {
            Ok(action) => action,
            Err(_) => {
                warn!(input = input.trim(), "Invalid feedback, skipping");
                return Ok(UpdateResult::Rejected {
                    input: input.trim().to_string(),
                });
            }
        };

        let item = &self.items[pending.index];
        self.preferences.apply(action, &item.categories);

        let next_index = pending.pool.choose(&mut self.rng).copied().unwrap_or(pending.index);
        let similarity = category_similarity(&item.categories, &self.items[next_index].categories);
        let reward = action.reward() + similarity;

        if let Some(price) = item.attributes.price_level {
            self.price_levels.push(price);
        }
        if let Some(rating) = item.attributes.rating {
            self.ratings.push(rating);
        }

        self.agent.remember(Transition {
            state: self.states[pending.index].clone(),
            action: action.index(),
            reward,
            next_state: self.states[next_index].clone(),
        });
        self.agent.replay();
        self.total_reward += reward;

        debug!(%action, reward, similarity, next_index, "Applied feedback");
        Ok(UpdateResult::Applied {
            action,
            reward,
            similarity,
            next_index,
        })
    }

    /// True once the budget is spent or every item has been shown
    pub fn is_finished(&self) -> bool {
        self.pending.is_none()
            && (self.episodes_used >= self.episode_budget || self.seen.iter().all(|&s| s))
    }

    pub fn preferences(&self) -> &PreferenceVector {
        &self.preferences
    }

    pub fn summary(&self) -> PreferenceSummary {
        PreferenceSummary::new(&self.preferences, &self.price_levels, &self.ratings)
    }

    pub fn items(&self) -> &[ScoredItem] {
        &self.items
    }

    pub fn episodes_used(&self) -> usize {
        self.episodes_used
    }

    pub fn total_reward(&self) -> f32 {
        self.total_reward
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }
}
