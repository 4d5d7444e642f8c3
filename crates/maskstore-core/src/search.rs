//! # Search
//!
//! Relevance scoring, edit distance and ranked pagination over pharmacy and
//! mask hits. Everything here is a free function; nothing holds state.
//!
//! ## Relevance Ladder
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  name == term               → 1.0                                      │
//! │  name starts with term      → 0.8                                      │
//! │  name contains term         → 0.6                                      │
//! │  levenshtein(term, name) ≤ 2 → max(0.2, 1 - d / max_len)               │
//! │  otherwise                  → 0.0                                      │
//! │                                                                         │
//! │  Both sides are lowercased and trimmed first. An empty name is 0.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{InventoryLine, MaskType, OpeningHour, Pharmacy};
use crate::FUZZY_MAX_DISTANCE;

// =============================================================================
// Scoring
// =============================================================================

/// Scores how well `name` matches the search `term`, in `[0, 1]`.
///
/// ## Example
/// ```rust
/// use maskstore_core::search::relevance;
///
/// assert_eq!(relevance("mask", "MASK"), 1.0);
/// assert_eq!(relevance("mask", "Maskx"), 0.8);
/// assert_eq!(relevance("mask", "aMaskb"), 0.6);
/// assert_eq!(relevance("mask", "mast"), 0.75);
/// assert_eq!(relevance("mask", "pharmacy"), 0.0);
/// ```
pub fn relevance(term: &str, name: &str) -> f64 {
    let term = term.trim().to_lowercase();
    let name = name.trim().to_lowercase();

    if name.is_empty() {
        return 0.0;
    }
    if name == term {
        return 1.0;
    }
    if name.starts_with(&term) {
        return 0.8;
    }
    if name.contains(&term) {
        return 0.6;
    }

    let distance = levenshtein(&term, &name);
    let max_len = term.chars().count().max(name.chars().count());
    if distance <= FUZZY_MAX_DISTANCE && max_len > 0 {
        return (1.0 - distance as f64 / max_len as f64).max(0.2);
    }

    0.0
}

/// Levenshtein edit distance over Unicode scalar values.
///
/// Unit cost for insertion, deletion and substitution. Uses a single rolling
/// row, so memory is `O(len(b))`.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ca != cb);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Case-insensitive substring test used to select candidates.
pub fn contains_term(text: &str, term: &str) -> bool {
    text.to_lowercase().contains(&term.trim().to_lowercase())
}

// =============================================================================
// Hits
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchType {
    Pharmacy,
    Mask,
    #[default]
    All,
}

impl SearchType {
    pub fn includes_pharmacies(&self) -> bool {
        matches!(self, SearchType::Pharmacy | SearchType::All)
    }

    pub fn includes_masks(&self) -> bool {
        matches!(self, SearchType::Mask | SearchType::All)
    }
}

/// Detail payload of a pharmacy hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PharmacyHitData {
    pub pharmacy: Pharmacy,
    pub opening_hours: Vec<OpeningHour>,
}

/// Detail payload of a mask hit: the mask plus the stocking pharmacy's offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaskHitData {
    pub mask_type: MaskType,
    pub inventory_id: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub pharmacy_id: String,
    pub pharmacy_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum SearchHitData {
    Pharmacy(PharmacyHitData),
    Mask(MaskHitData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchHit {
    #[serde(rename = "type")]
    pub hit_type: SearchType,
    pub id: String,
    pub name: String,
    pub relevance: f64,
    pub pharmacy_name: Option<String>,
    pub data: SearchHitData,
}

/// Builds a pharmacy hit when the pharmacy name contains the term.
pub fn pharmacy_hit(term: &str, pharmacy: Pharmacy, opening_hours: Vec<OpeningHour>) -> Option<SearchHit> {
    if !contains_term(&pharmacy.name, term) {
        return None;
    }
    Some(SearchHit {
        hit_type: SearchType::Pharmacy,
        id: pharmacy.id.clone(),
        name: pharmacy.name.clone(),
        relevance: relevance(term, &pharmacy.name),
        pharmacy_name: None,
        data: SearchHitData::Pharmacy(PharmacyHitData {
            pharmacy,
            opening_hours,
        }),
    })
}

/// Builds a mask hit for one in-stock inventory line.
///
/// The line qualifies when brand, color or display name contains the term;
/// its score is the best of the three field scores.
pub fn mask_hit(term: &str, line: InventoryLine, pharmacy_name: &str) -> Option<SearchHit> {
    if line.quantity <= 0 {
        return None;
    }
    let mask = &line.mask_type;
    let fields = [mask.brand.as_str(), mask.color.as_str(), mask.display_name.as_str()];
    if !fields.iter().any(|field| contains_term(field, term)) {
        return None;
    }

    let score = fields
        .iter()
        .map(|field| relevance(term, field))
        .fold(0.0_f64, f64::max);

    Some(SearchHit {
        hit_type: SearchType::Mask,
        id: mask.id.clone(),
        name: mask.label(),
        relevance: score,
        pharmacy_name: Some(pharmacy_name.to_string()),
        data: SearchHitData::Mask(MaskHitData {
            inventory_id: line.inventory_id,
            price_cents: line.price_cents,
            quantity: line.quantity,
            pharmacy_id: line.pharmacy_id,
            pharmacy_name: pharmacy_name.to_string(),
            mask_type: line.mask_type,
        }),
    })
}

// =============================================================================
// Ranking
// =============================================================================

/// One page of ranked hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    /// Number of hits before pagination.
    pub total: usize,
    /// `offset / limit + 1`.
    pub page: u32,
    pub limit: u32,
    pub query: String,
    pub search_type: SearchType,
}

/// Sorts hits by descending relevance, then slices `[offset, offset + limit)`.
///
/// The sort is stable: equal scores keep their merge order (pharmacies
/// before masks, each in the order they were produced).
pub fn rank_and_paginate(mut hits: Vec<SearchHit>, limit: u32, offset: u32) -> (usize, u32, Vec<SearchHit>) {
    hits.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));

    let total = hits.len();
    let page = if limit == 0 { 1 } else { offset / limit + 1 };
    let page_hits = hits
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();

    (total, page, page_hits)
}

// =============================================================================
// Unit Tests
// =============================================================================
