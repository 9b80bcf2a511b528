//! Online learning agent interface and a linear Q-learning default.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::debug;

/// One training sample handed to the agent
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: Vec<f32>,
    pub action: usize,
    pub reward: f32,
    pub next_state: Vec<f32>,
}

/// Black-box learner driven by the feedback loop.
pub trait LearningAgent {
    /// Width of the state vectors the agent was built for
    fn state_size(&self) -> usize;

    /// Pick an action id for a state
    fn predict(&mut self, state: &[f32]) -> usize;

    /// Store a transition for later training
    fn remember(&mut self, transition: Transition);

    /// Train on a minibatch drawn from memory
    fn replay(&mut self);
}

/// Epsilon-greedy agent with a linear Q-function per action.
///
/// Defaults: ε 1.0 decaying by 0.995 per replay down to 0.01, γ 0.95,
/// learning rate 0.001, replay memory of 2000, minibatch of 32.
#[derive(Debug, Clone)]
pub struct LinearQAgent {
    state_size: usize,
    action_size: usize,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
    memory: VecDeque<Transition>,
    memory_capacity: usize,
    batch_size: usize,
    gamma: f32,
    epsilon: f32,
    epsilon_min: f32,
    epsilon_decay: f32,
    learning_rate: f32,
    rng: StdRng,
}

impl LinearQAgent {
    pub fn new(state_size: usize, action_size: usize) -> Self {
        Self {
            state_size,
            action_size,
            weights: vec![vec![0.0; state_size]; action_size],
            bias: vec![0.0; action_size],
            memory: VecDeque::new(),
            memory_capacity: 2000,
            batch_size: 32,
            gamma: 0.95,
            epsilon: 1.0,
            epsilon_min: 0.01,
            epsilon_decay: 0.995,
            learning_rate: 0.001,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seed the exploration RNG for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Configure the starting exploration rate (default: 1.0)
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Configure the exploration floor (default: 0.01)
    pub fn with_epsilon_min(mut self, epsilon_min: f32) -> Self {
        self.epsilon_min = epsilon_min;
        self
    }

    /// Configure the per-replay decay factor (default: 0.995)
    pub fn with_epsilon_decay(mut self, decay: f32) -> Self {
        self.epsilon_decay = decay;
        self
    }

    /// Configure the discount factor (default: 0.95)
    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Configure the learning rate (default: 0.001)
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Configure the replay memory capacity (default: 2000)
    pub fn with_memory_capacity(mut self, capacity: usize) -> Self {
        self.memory_capacity = capacity.max(1);
        self
    }

    /// Configure the minibatch size (default: 32)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Q-value estimate for every action
    pub fn q_values(&self, state: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| b + w.iter().zip(state).map(|(wi, si)| wi * si).sum::<f32>())
            .collect()
    }

    fn best_action(&self, state: &[f32]) -> usize {
        self.q_values(state)
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |best, (i, &q)| if q > best.1 { (i, q) } else { best })
            .0
    }

    fn train_step(&mut self, transition: &Transition) {
        let future = self
            .q_values(&transition.next_state)
            .into_iter()
            .fold(f32::NEG_INFINITY, f32::max);
        let target = transition.reward + self.gamma * future;
        let current = self.q_values(&transition.state)[transition.action];
        let step = self.learning_rate * (target - current);

        for (w, s) in self.weights[transition.action].iter_mut().zip(&transition.state) {
            *w += step * s;
        }
        self.bias[transition.action] += step;
    }
}

impl LearningAgent for LinearQAgent {
    fn state_size(&self) -> usize {
        self.state_size
    }

    fn predict(&mut self, state: &[f32]) -> usize {
        if self.rng.random::<f32>() <= self.epsilon {
            return self.rng.random_range(0..self.action_size);
        }
        self.best_action(state)
    }

    fn remember(&mut self, transition: Transition) {
        if self.memory.len() == self.memory_capacity {
            self.memory.pop_front();
        }
        self.memory.push_back(transition);
    }

    fn replay(&mut self) {
        let amount = self.batch_size.min(self.memory.len());
        let picks = rand::seq::index::sample(&mut self.rng, self.memory.len(), amount);
        let batch: Vec<Transition> = picks.iter().map(|i| self.memory[i].clone()).collect();

        for transition in &batch {
            if transition.action < self.action_size {
                self.train_step(transition);
            }
        }

        if self.epsilon > self.epsilon_min {
            self.epsilon *= self.epsilon_decay;
        }
        debug!(batch = batch.len(), epsilon = self.epsilon, "Replayed minibatch");
    }
}
