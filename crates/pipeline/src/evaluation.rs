//! Offline ranking metrics against a held-out relevance set.
//!
//! All functions are pure. `recommended` is the ranked list, best first;
//! `relevant` is the set of ids considered correct for the user.

use crate::error::{PipelineError, Result};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

fn hits_in_top_k<T: Eq + Hash>(recommended: &[T], relevant: &HashSet<T>, k: usize) -> usize {
    let top_k: HashSet<&T> = recommended.iter().take(k).collect();
    top_k.into_iter().filter(|id| relevant.contains(*id)).count()
}

fn check_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(PipelineError::InvalidArgument("k must be positive".to_string()));
    }
    Ok(())
}

/// Fraction of the top `k` slots holding a relevant item.
///
/// The denominator is always `k`, even when fewer than `k` items were
/// recommended.
pub fn precision_at_k<T: Eq + Hash>(recommended: &[T], relevant: &HashSet<T>, k: usize) -> Result<f64> {
    check_k(k)?;
    Ok(hits_in_top_k(recommended, relevant, k) as f64 / k as f64)
}

/// Fraction of relevant items found in the top `k`; 0 when nothing is relevant.
pub fn recall_at_k<T: Eq + Hash>(recommended: &[T], relevant: &HashSet<T>, k: usize) -> Result<f64> {
    check_k(k)?;
    if relevant.is_empty() {
        return Ok(0.0);
    }
    Ok(hits_in_top_k(recommended, relevant, k) as f64 / relevant.len() as f64)
}

/// Reciprocal of the 1-based rank of the first relevant item, or 0.
pub fn mean_reciprocal_rank<T: Eq + Hash>(recommended: &[T], relevant: &HashSet<T>) -> f64 {
    recommended
        .iter()
        .position(|id| relevant.contains(id))
        .map_or(0.0, |idx| 1.0 / (idx + 1) as f64)
}

/// The three metrics for one ranking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationReport {
    pub k: usize,
    pub precision: f64,
    pub recall: f64,
    pub mrr: f64,
}

impl EvaluationReport {
    pub fn evaluate<T: Eq + Hash>(recommended: &[T], relevant: &HashSet<T>, k: usize) -> Result<Self> {
        Ok(Self {
            k,
            precision: precision_at_k(recommended, relevant, k)?,
            recall: recall_at_k(recommended, relevant, k)?,
            mrr: mean_reciprocal_rank(recommended, relevant),
        })
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Precision@{}: {}", self.k, significant(self.precision, 3))?;
        writeln!(f, "Recall@{}: {}", self.k, significant(self.recall, 3))?;
        write!(f, "MRR: {}", significant(self.mrr, 3))
    }
}

/// Format with `digits` significant digits, dropping trailing zeros (like `%g`).
pub fn significant(value: f64, digits: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits as i32 - 1 - magnitude).max(0) as usize;
    let formatted = format!("{value:.decimals$}");
    if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        formatted
    }
}
