//! Typed state containers for asynchronously fetched resources.
//!
//! A caller fetching data over the network dispatches plain actions
//! (`fetch_start` before the request, exactly one of `fetch_success` /
//! `fetch_success_ignore` / `fetch_error` after it resolves) and this
//! crate keeps the resulting collection state consistent: per-id and
//! whole-collection loading/updating tracking, order-preserving merges,
//! and pointer-stable derived values across value-identical refetches.
//! The core performs no I/O and makes no cancellation decisions; it only
//! records the transitions reported to it.
//!
//! - **[`Actions`]**: typed action constructors bound to one routing
//!   key ([`EntityName`]), stamping each terminal action with a
//!   [`Timestamp`].
//!
//! - **[`Reducer`]**: the pure, synchronous transition function
//!   `(state, action) → state`. Actions for other entities pass through
//!   unchanged, so independent containers can share one dispatch stream.
//!
//! - **[`ResourceState`]**: the per-entity state shape with its
//!   selector set (`get`, `is_loading_initial`, `in_order`, ...).
//!
//! - **[`Records`]**: storage strategy, where [`Indexed`] keeps an
//!   insertion-ordered id → resource mapping (resources must implement
//!   [`Identify`] with a non-empty id), [`Single`] keeps one raw
//!   payload.
//!
//! - **[`Store`]**: a mounted container publishing snapshots through a
//!   `tokio::sync::watch` channel; [`IndexedStore`] / [`SingleStore`]
//!   pick the storage mode at the type level.
//!
//! Race policy: last applied action wins. Concurrent operations over
//! disjoint id sets compose safely; callers racing the same id must
//! discard stale responses before dispatching.

pub mod action;
pub mod entity;
pub mod error;
pub mod records;
pub mod reducer;
pub mod state;
pub mod status;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use action::{Action, ActionKind, Actions, Payload};
pub use entity::{EntityName, Identify, Timestamp};
pub use error::StoreError;
pub use records::{Indexed, Merged, Records, Single, derive_order, reconcile};
pub use reducer::Reducer;
pub use state::{Pagination, ResourceState};
pub use status::{StatusId, StatusIds};
pub use store::{IndexedStore, SingleStore, Store, StoreBuilder};
