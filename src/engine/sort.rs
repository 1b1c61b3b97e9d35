//! Stable sorting of a processed view.
//!
//! String keys compare case-insensitively over Unicode-lowercased text.
//! Numeric keys parse decimal strings with a default of `0` for missing or
//! malformed values; the default is part of the contract, not an error.
//! `Vec::sort_by` is stable, which makes equal-key order preservation a
//! hard guarantee rather than an accident.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::item::{Item, SortDirection, SortKey};

/// Sort the view in place by `key`, honoring `direction`.
pub fn apply(view: &mut [Arc<Item>], key: SortKey, direction: SortDirection) {
    view.sort_by(|a, b| {
        let ord = compare(a, b, key);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// Compare two items under a sort key, ascending.
pub fn compare(a: &Item, b: &Item, key: SortKey) -> Ordering {
    match (sort_value(a, key), sort_value(b, key)) {
        (SortValue::Text(a), SortValue::Text(b)) => locale_cmp(&a, &b),
        (SortValue::Number(a), SortValue::Number(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        // Mixed shapes cannot happen: sort_value is total per key.
        (SortValue::Text(_), SortValue::Number(_)) => Ordering::Less,
        (SortValue::Number(_), SortValue::Text(_)) => Ordering::Greater,
    }
}

enum SortValue {
    Text(String),
    Number(f64),
}

fn sort_value(item: &Item, key: SortKey) -> SortValue {
    match key {
        SortKey::Name => SortValue::Text(item.name()),
        SortKey::Price => match item {
            Item::Token { price, .. } => SortValue::Number(parse_numeric(price)),
            _ => SortValue::Number(0.0),
        },
        SortKey::Volume => match item {
            Item::Token { volume_24h, .. } | Item::Pool { volume_24h, .. } => {
                SortValue::Number(parse_numeric(volume_24h))
            }
            _ => SortValue::Number(0.0),
        },
        SortKey::Change => match item {
            Item::Token { change_24h, .. } => SortValue::Number(parse_numeric(change_24h)),
            _ => SortValue::Number(0.0),
        },
        SortKey::ChainId => match item {
            Item::Chain { chain_id, .. } => SortValue::Number(*chain_id as f64),
            _ => SortValue::Number(0.0),
        },
        SortKey::Liquidity => match item {
            Item::Pool { liquidity, .. } => SortValue::Number(parse_numeric(liquidity)),
            _ => SortValue::Number(0.0),
        },
        SortKey::Fees => match item {
            Item::Pool { fees_24h, .. } => SortValue::Number(parse_numeric(fees_24h)),
            _ => SortValue::Number(0.0),
        },
        SortKey::Apr => match item {
            Item::Pool { apr, .. } => SortValue::Number(parse_numeric(apr)),
            _ => SortValue::Number(0.0),
        },
    }
}

/// Parse the longest numeric prefix of a decimal string, defaulting to `0`
/// for missing or malformed values. Handles display suffixes such as `%`
/// and thousands separators.
pub fn parse_numeric(text: &str) -> f64 {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',' && *c != '$').collect();
    let end = cleaned
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    cleaned[..end].parse().unwrap_or(0.0)
}

/// Case-insensitive comparison over Unicode-lowercased text, falling back
/// to the raw strings so the ordering stays total and deterministic.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let lowered = a.to_lowercase().cmp(&b.to_lowercase());
    match lowered {
        Ordering::Equal => a.cmp(b),
        other => other,
    }
}
