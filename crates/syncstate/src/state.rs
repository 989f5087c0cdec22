// ── Resource state shape and selectors ──
//
// The per-entity container state mutated only by the reducer, plus the
// read-only derived queries consumers use. Derived values (pagination,
// fetch order) sit behind `Arc` so unchanged values keep their pointer
// identity across refetches.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entity::Timestamp;
use crate::records::Records;
use crate::status::StatusIds;

// ── Pagination ──────────────────────────────────────────────────────

/// Pagination block reported by a collection fetch. Replaced in state
/// only when structurally different from the previous value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_size: u32,
    pub total_pages: u32,
    pub current_page: u32,
}

// ── ResourceState ───────────────────────────────────────────────────

/// Container state for one entity name.
///
/// `error` reflects the currently outstanding failure and is cleared by
/// the next success; `last_error` is the most recent failure ever and
/// survives successes.
#[derive(Debug, Clone)]
pub struct ResourceState<R: Records> {
    pub data: R,
    pub pagination: Option<Arc<Pagination>>,
    pub error: Option<String>,
    pub last_error: Option<String>,
    pub last_fetch: Option<Timestamp>,
    pub loading_ids: StatusIds,
    pub updating_ids: StatusIds,
    pub last_fetch_order: Option<Arc<Vec<String>>>,
}

impl<R: Records> ResourceState<R> {
    /// Fresh initial state: empty data, no pagination, no errors, empty
    /// id lists. A new value per call, never a shared constant, so
    /// multiple mount points cannot alias each other.
    pub fn new() -> Self {
        Self::with_data(R::default())
    }

    /// Initial state seeded with existing data.
    pub fn with_data(data: R) -> Self {
        Self {
            data,
            pagination: None,
            error: None,
            last_error: None,
            last_fetch: None,
            loading_ids: StatusIds::new(),
            updating_ids: StatusIds::new(),
            last_fetch_order: None,
        }
    }

    // ── Selectors ───────────────────────────────────────────────────

    /// The cached resource for `id`, if any.
    pub fn get(&self, id: &str) -> Option<&Arc<R::Resource>> {
        self.data.get(id)
    }

    /// Whether any fetch is in flight.
    pub fn is_loading(&self) -> bool {
        !self.loading_ids.is_empty()
    }

    /// Whether a fetch for this specific id is in flight.
    pub fn is_loading_id(&self, id: &str) -> bool {
        self.loading_ids.contains_id(id)
    }

    /// First load versus refresh: the id is loading and nothing is
    /// cached for it yet.
    pub fn is_loading_initial(&self, id: &str) -> bool {
        self.is_loading_id(id) && self.data.get(id).is_none()
    }

    /// Whether any update is in flight.
    pub fn is_updating(&self) -> bool {
        !self.updating_ids.is_empty()
    }

    /// Whether an update for this specific id is in flight.
    pub fn is_updating_id(&self, id: &str) -> bool {
        self.updating_ids.contains_id(id)
    }

    /// Ids of the most recent successful collection fetch, in server
    /// order. Pointer-stable across value-identical refetches.
    pub fn last_fetch_order(&self) -> Option<&Arc<Vec<String>>> {
        self.last_fetch_order.as_ref()
    }

    /// Pagination of the most recent fetch, pointer-stable across
    /// value-identical refetches.
    pub fn pagination(&self) -> Option<&Arc<Pagination>> {
        self.pagination.as_ref()
    }

    /// The currently outstanding error, if any.
    pub fn current_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The most recent error ever recorded.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Stamp of the last successful fetch or update.
    pub fn last_fetch(&self) -> Option<Timestamp> {
        self.last_fetch
    }

    /// Cached resources in last-fetch order. Ids without a cached
    /// resource are skipped.
    pub fn in_order(&self) -> Vec<Arc<R::Resource>> {
        self.last_fetch_order.as_ref().map_or_else(Vec::new, |order| {
            order
                .iter()
                .filter_map(|id| self.data.get(id).cloned())
                .collect()
        })
    }
}

impl<R: Records> Default for ResourceState<R> {
    fn default() -> Self {
        Self::new()
    }
}
