// ── Action constructors and wire shape ──
//
// The closed set of operations a caller reports to a container, plus the
// factory producing them for one routing key. The wire contract between
// caller orchestration and this core is
// `{ "entity": ..., "type": "FETCH_START" | ..., "payload": { ... } }`,
// rendered by serde as an adjacently tagged enum flattened next to the
// routing key.

use std::marker::PhantomData;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityName, Timestamp};
use crate::state::Pagination;

// ── Payload ─────────────────────────────────────────────────────────

/// Data accepted by fetch and merge actions: one resource, a list, or an
/// id → resource map (insertion-ordered).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload<T> {
    One(T),
    Many(Vec<T>),
    Map(IndexMap<String, T>),
}

impl<T> Payload<T> {
    pub fn one(resource: T) -> Self {
        Self::One(resource)
    }

    pub fn many(resources: impl IntoIterator<Item = T>) -> Self {
        Self::Many(resources.into_iter().collect())
    }

    pub fn map(entries: impl IntoIterator<Item = (String, T)>) -> Self {
        Self::Map(entries.into_iter().collect())
    }
}

impl<T> From<Vec<T>> for Payload<T> {
    fn from(resources: Vec<T>) -> Self {
        Self::Many(resources)
    }
}

impl<T> From<IndexMap<String, T>> for Payload<T> {
    fn from(entries: IndexMap<String, T>) -> Self {
        Self::Map(entries)
    }
}

// ── ActionKind ──────────────────────────────────────────────────────

/// The closed operation set. Unhandled variants in the reducer are a
/// compile error, not a silently ignored string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, strum::AsRefStr)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind<T> {
    /// Mark the given ids as loading, or the whole collection when no
    /// ids are given.
    FetchStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ids: Option<Vec<String>>,
    },

    /// Merge fetched data, clear the matching loading ids, reconcile
    /// pagination and fetch order.
    FetchSuccess {
        data: Payload<T>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pagination: Option<Pagination>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        order: Option<Vec<String>>,
        time: Timestamp,
    },

    /// Clear the matching loading ids without merging: a poll confirmed
    /// nothing changed, but the loading flag must still resolve.
    FetchSuccessIgnore { data: Payload<T>, time: Timestamp },

    /// Record a fetch failure. The message and stamp are defaulted on the
    /// wire; the reducer drops the action when either is missing, so a
    /// malformed error event from a less-trusted caller cannot clear
    /// loading state.
    FetchError {
        #[serde(default)]
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ids: Option<Vec<String>>,
        #[serde(default)]
        time: Option<Timestamp>,
    },

    /// Optimistically merge data and mark its id (or the whole
    /// collection) as updating.
    UpdateStart { data: T },

    /// Resolve an update: clear the updating id, optionally replace the
    /// stored resource wholesale.
    UpdateSuccess {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<T>,
        time: Timestamp,
    },

    /// Record an update failure against a specific id.
    UpdateError {
        error: String,
        id: String,
        time: Timestamp,
    },
}

// ── Action ──────────────────────────────────────────────────────────

/// A routed action: the routing key plus the operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action<T> {
    pub entity: EntityName,
    #[serde(flatten)]
    pub kind: ActionKind<T>,
}

// ── Actions factory ─────────────────────────────────────────────────

/// Typed action constructors bound to one routing key.
///
/// Terminal constructors stamp the current time; `last_fetch` in state is
/// populated from that stamp.
#[derive(Debug, Clone)]
pub struct Actions<T> {
    entity: EntityName,
    _resource: PhantomData<fn() -> T>,
}

impl<T> Actions<T> {
    pub fn new(entity: impl Into<EntityName>) -> Self {
        Self {
            entity: entity.into(),
            _resource: PhantomData,
        }
    }

    pub fn entity(&self) -> &EntityName {
        &self.entity
    }

    /// Mark the whole collection as loading.
    pub fn fetch_start(&self) -> Action<T> {
        self.routed(ActionKind::FetchStart { ids: None })
    }

    /// Mark specific ids as loading.
    pub fn fetch_start_ids<I, S>(&self, ids: I) -> Action<T>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.routed(ActionKind::FetchStart {
            ids: Some(ids.into_iter().map(Into::into).collect()),
        })
    }

    /// Merge fetched data and resolve the matching loading ids.
    pub fn fetch_success(&self, data: impl Into<Payload<T>>) -> Action<T> {
        self.fetch_success_with(data, None, None)
    }

    /// `fetch_success` with explicit pagination and/or server order.
    pub fn fetch_success_with(
        &self,
        data: impl Into<Payload<T>>,
        pagination: Option<Pagination>,
        order: Option<Vec<String>>,
    ) -> Action<T> {
        self.routed(ActionKind::FetchSuccess {
            data: data.into(),
            pagination,
            order,
            time: Timestamp::now(),
        })
    }

    /// Resolve the matching loading ids without merging data.
    pub fn fetch_success_ignore(&self, data: impl Into<Payload<T>>) -> Action<T> {
        self.routed(ActionKind::FetchSuccessIgnore {
            data: data.into(),
            time: Timestamp::now(),
        })
    }

    /// Record a whole-collection fetch failure.
    pub fn fetch_error(&self, error: impl Into<String>) -> Action<T> {
        self.routed(ActionKind::FetchError {
            error: error.into(),
            ids: None,
            time: Some(Timestamp::now()),
        })
    }

    /// Record a fetch failure for specific ids.
    pub fn fetch_error_ids<I, S>(&self, error: impl Into<String>, ids: I) -> Action<T>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.routed(ActionKind::FetchError {
            error: error.into(),
            ids: Some(ids.into_iter().map(Into::into).collect()),
            time: Some(Timestamp::now()),
        })
    }

    /// Optimistically merge data and mark it as updating.
    pub fn update_start(&self, data: T) -> Action<T> {
        self.routed(ActionKind::UpdateStart { data })
    }

    /// Resolve an update, keeping the optimistically merged resource.
    pub fn update_success(&self, id: impl Into<String>) -> Action<T> {
        self.routed(ActionKind::UpdateSuccess {
            id: id.into(),
            data: None,
            time: Timestamp::now(),
        })
    }

    /// Resolve an update, replacing the stored resource wholesale.
    pub fn update_success_with(&self, id: impl Into<String>, data: T) -> Action<T> {
        self.routed(ActionKind::UpdateSuccess {
            id: id.into(),
            data: Some(data),
            time: Timestamp::now(),
        })
    }

    /// Record an update failure against a specific id.
    pub fn update_error(&self, error: impl Into<String>, id: impl Into<String>) -> Action<T> {
        self.routed(ActionKind::UpdateError {
            error: error.into(),
            id: id.into(),
            time: Timestamp::now(),
        })
    }

    fn routed(&self, kind: ActionKind<T>) -> Action<T> {
        Action {
            entity: self.entity.clone(),
            kind,
        }
    }
}
