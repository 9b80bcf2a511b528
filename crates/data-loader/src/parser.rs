//! Parsers for the restaurant catalogue and the user-profile export.
//!
//! - `restaurants.json`: an array of restaurant records as emitted by the maps
//!   fetcher
//! - `users.json`: an object keyed by user id, each value a profile document
//!   (`ratings`, `favourite_restaurants`, `preferences`)
//!
//! The fetcher writes `"N/A"` for absent values and tabular exports store lists
//! as Python literals, so most field deserializers here are lenient.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(fs::read_to_string(path)?)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse the restaurant catalogue file.
pub fn parse_restaurants(path: &Path) -> Result<Vec<Restaurant>> {
    let content = read_file(path)?;
    parse_restaurants_str(&content, &file_label(path))
}

/// Parse a restaurant catalogue from a JSON string.
///
/// Records are parsed one by one so an error names the offending entry.
pub fn parse_restaurants_str(content: &str, file: &str) -> Result<Vec<Restaurant>> {
    let records: Vec<Value> = serde_json::from_str(content).map_err(|source| {
        DataLoadError::JsonError {
            file: file.to_string(),
            source,
        }
    })?;

    let mut restaurants = Vec::with_capacity(records.len());
    for (idx, record) in records.into_iter().enumerate() {
        let restaurant: Restaurant =
            serde_json::from_value(record).map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                record: idx.to_string(),
                reason: e.to_string(),
            })?;
        if restaurant.place_id.trim().is_empty() {
            return Err(DataLoadError::ParseError {
                file: file.to_string(),
                record: idx.to_string(),
                reason: "Missing place_id".to_string(),
            });
        }
        restaurants.push(restaurant);
    }
    Ok(restaurants)
}

/// Parse the user-profile export file.
pub fn parse_users(path: &Path) -> Result<Vec<UserProfile>> {
    let content = read_file(path)?;
    parse_users_str(&content, &file_label(path))
}

/// Parse user profiles from a JSON string keyed by user id.
///
/// Users come back sorted by id; the key always wins over any `user_id`
/// stored inside the document.
pub fn parse_users_str(content: &str, file: &str) -> Result<Vec<UserProfile>> {
    let documents: BTreeMap<String, Value> =
        serde_json::from_str(content).map_err(|source| DataLoadError::JsonError {
            file: file.to_string(),
            source,
        })?;

    let mut users = Vec::with_capacity(documents.len());
    for (user_id, document) in documents {
        let mut user: UserProfile =
            serde_json::from_value(document).map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                record: user_id.clone(),
                reason: e.to_string(),
            })?;
        user.user_id = user_id;
        users.push(user);
    }
    Ok(users)
}

// =============================================================================
// Lenient field deserializers
// =============================================================================

fn is_missing_marker(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case("n/a") || s.eq_ignore_ascii_case("nan")
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !is_missing_marker(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn deserialize_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value).filter(|v| v.is_finite()))
}

pub(crate) fn deserialize_f32<'de, D>(deserializer: D) -> std::result::Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_f64(deserializer)?.map(|v| v as f32))
}

pub(crate) fn deserialize_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_f64(deserializer)?
        .filter(|v| *v >= 0.0 && *v <= u32::MAX as f64)
        .map(|v| v as u32))
}

pub(crate) fn deserialize_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !is_missing_marker(&s) => Some(s),
        // editorial_summary sometimes arrives as the raw `{ "overview": ... }` object
        Value::Object(map) => map
            .get("overview")
            .and_then(Value::as_str)
            .filter(|s| !is_missing_marker(s))
            .map(str::to_string),
        _ => None,
    })
}

pub(crate) fn deserialize_categories<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => parse_list_literal(&s),
        _ => Vec::new(),
    })
}

pub(crate) fn deserialize_reviews<'de, D>(deserializer: D) -> std::result::Result<Vec<Review>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let text_review = |text: String| Review {
        text: Some(text),
        ..Review::default()
    };
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !is_missing_marker(&s) => Some(text_review(s)),
                Value::Object(_) => serde_json::from_value(item).ok(),
                _ => None,
            })
            .collect(),
        Value::String(s) if !is_missing_marker(&s) => vec![text_review(s)],
        _ => Vec::new(),
    })
}

/// Parse a Python list literal such as `"['halal', 'cafe']"`.
///
/// Anything that is not bracketed is treated as a single bare value;
/// `"Unknown"` and missing markers yield an empty list.
pub fn parse_list_literal(s: &str) -> Vec<String> {
    let trimmed = s.trim();
    if is_missing_marker(trimmed) || trimmed.eq_ignore_ascii_case("unknown") {
        return Vec::new();
    }
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed);

    inner
        .split(',')
        .map(|part| part.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
