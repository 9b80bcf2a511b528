//! Hybrid merge of content-based and collaborative recommendations.
//!
//! Both lists are folded into one ranking keyed by place id (or name when the
//! id is missing). When a key shows up a second time the entry is tagged
//! [`Source::Both`]; a collaborative record replaces whatever was stored under
//! its key, in place. The result is stably sorted by score, so ties keep
//! first-seen order.

use crate::error::{PipelineError, Result};
use sources::{ScoredItem, Source};
use std::collections::HashMap;
use tracing::debug;

struct Slot {
    item: ScoredItem,
    source: Source,
}

/// Merge two provider outputs into one deduplicated ranking.
///
/// Any key seen a second time, in either list, is tagged [`Source::Both`].
/// A repeated content-based key keeps the first record; a repeated
/// collaborative key takes the latest collaborative record. Items with no
/// score rank as 0.
///
/// # Errors
/// [`PipelineError::MalformedRecord`] if an item has neither a place id nor a
/// name.
pub fn merge(content: Vec<ScoredItem>, collaborative: Vec<ScoredItem>) -> Result<Vec<ScoredItem>> {
    let mut slots: Vec<Slot> = Vec::with_capacity(content.len() + collaborative.len());
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for (position, item) in content.into_iter().enumerate() {
        let key = identity(&item, "content", position)?;
        if let Some(&idx) = by_key.get(&key) {
            debug!(key = %key, "Repeated content-based item");
            slots[idx].source = Source::Both;
            continue;
        }
        by_key.insert(key, slots.len());
        slots.push(Slot {
            item,
            source: Source::ContentBased,
        });
    }

    for (position, item) in collaborative.into_iter().enumerate() {
        let key = identity(&item, "collaborative", position)?;
        match by_key.get(&key) {
            Some(&idx) => {
                slots[idx] = Slot {
                    item,
                    source: Source::Both,
                };
            }
            None => {
                by_key.insert(key, slots.len());
                slots.push(Slot {
                    item,
                    source: Source::Collaborative,
                });
            }
        }
    }

    let mut merged: Vec<ScoredItem> = slots
        .into_iter()
        .map(|slot| slot.item.with_source(slot.source))
        .collect();

    // sort_by is stable
    merged.sort_by(|a, b| b.rank_score().total_cmp(&a.rank_score()));

    debug!(
        merged = merged.len(),
        both = merged.iter().filter(|i| i.source == Some(Source::Both)).count(),
        "Hybrid merge complete"
    );
    Ok(merged)
}

fn identity(item: &ScoredItem, list: &'static str, position: usize) -> Result<String> {
    item.identity_key()
        .map(str::to_string)
        .ok_or(PipelineError::MalformedRecord {
            list,
            position,
            field: "place_id/name",
        })
}
