//! # Search Engine
//!
//! Free-text search over pharmacy names and stocked mask types, ranked by
//! relevance.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "mask"                                                                │
//! │    │                                                                    │
//! │    ├─ PHARMACY/ALL ─► every pharmacy ─────────────────► pharmacy_hit  │
//! │    ├─ MASK/ALL ─────► every line with quantity > 0 ───► mask_hit      │
//! │    ▼                                                                    │
//! │  merge ─► stable sort by relevance DESC ─► skip(offset).take(limit)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Matching and scoring both happen in `maskstore_core::search`, which folds
//! case for any script. SQLite's `LOWER` would only fold ASCII.

use std::collections::HashMap;

use maskstore_core::search::{contains_term, mask_hit, pharmacy_hit, rank_and_paginate, SearchResponse, SearchType};
use maskstore_core::validation::{validate_search_limit, validate_search_query};
use maskstore_core::OpeningHour;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, instrument};
use ts_rs::TS;

use crate::config::EngineSettings;
use crate::error::DbResult;
use crate::repository::{hours, inventory, pharmacy};

/// A search as submitted by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub search_type: SearchType,
    /// Page size; the configured default when absent.
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        SearchRequest {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// Relevance-ranked search.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    pool: SqlitePool,
    settings: EngineSettings,
}

impl SearchEngine {
    pub fn new(pool: SqlitePool, settings: EngineSettings) -> Self {
        SearchEngine { pool, settings }
    }

    /// Runs one search and returns the requested page.
    ///
    /// ## Errors
    /// Validation errors for an empty or overlong query, or a limit outside
    /// `1..=search_max_limit`.
    #[instrument(skip(self))]
    pub async fn search(&self, request: &SearchRequest) -> DbResult<SearchResponse> {
        let term = validate_search_query(&request.query)?;
        let limit = request.limit.unwrap_or(self.settings.search_default_limit);
        validate_search_limit(limit, self.settings.search_max_limit)?;

        let mut conn = self.pool.acquire().await?;
        let mut hits = Vec::new();

        if request.search_type.includes_pharmacies() {
            let pharmacies: Vec<_> = pharmacy::list_all(&mut conn)
                .await?
                .into_iter()
                .filter(|found| contains_term(&found.name, &term))
                .collect();
            if !pharmacies.is_empty() {
                let mut hours_by_pharmacy: HashMap<String, Vec<OpeningHour>> = HashMap::new();
                for hour in hours::all(&mut conn).await? {
                    if let Some(opening) = OpeningHour::from_hour(&hour) {
                        hours_by_pharmacy.entry(hour.pharmacy_id).or_default().push(opening);
                    }
                }
                for found in pharmacies {
                    let opening_hours = hours_by_pharmacy.remove(&found.id).unwrap_or_default();
                    hits.extend(pharmacy_hit(&term, found, opening_hours));
                }
            }
        }

        if request.search_type.includes_masks() {
            for (line, pharmacy_name) in inventory::in_stock_lines(&mut conn).await? {
                hits.extend(mask_hit(&term, line, &pharmacy_name));
            }
        }

        let (total, page, results) = rank_and_paginate(hits, limit, request.offset);
        debug!(term = %term, total, page, "Search complete");

        Ok(SearchResponse {
            results,
            total,
            page,
            limit,
            query: term,
            search_type: request.search_type,
        })
    }
}
