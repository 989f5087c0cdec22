// ── Storage strategies and merge utilities ──
//
// `Records` abstracts how a container stores fetched payloads: `Indexed`
// keeps an insertion-ordered id → resource mapping, `Single` keeps the
// raw last payload. Id validation, order derivation, and the
// reference-stability gate (`reconcile`) live here.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::action::Payload;
use crate::entity::{EntityName, Identify};
use crate::error::StoreError;

// ── Merge outcome ───────────────────────────────────────────────────

/// What a merge covered: the ids the payload carried (`None` means the
/// whole collection) and whether the payload was a collection rather
/// than a lone resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
    pub ids: Option<Vec<String>>,
    pub collection: bool,
}

// ── Records ─────────────────────────────────────────────────────────

/// Storage strategy for one container: how payloads fold into state and
/// which ids an operation covers.
pub trait Records: Clone + Default {
    type Resource: Clone;

    /// Whether terminal actions clear loading state per id (indexed) or
    /// for the whole collection at once.
    const INDEXED: bool;

    /// Fold a payload into storage, upserting by id in indexed mode and
    /// replacing wholesale otherwise. Fails, leaving storage untouched,
    /// when an indexed payload carries an empty id.
    fn merge(
        &mut self,
        entity: &EntityName,
        payload: Payload<Self::Resource>,
    ) -> Result<Merged, StoreError>;

    /// The ids a payload covers, without merging it.
    fn payload_ids(
        entity: &EntityName,
        payload: &Payload<Self::Resource>,
    ) -> Result<Merged, StoreError>;

    /// The updating tag for an optimistic write: a specific id, or `None`
    /// for the whole collection.
    fn update_id(
        entity: &EntityName,
        resource: &Self::Resource,
    ) -> Result<Option<String>, StoreError>;

    /// Replace whatever is stored under `id` wholesale (not a merge).
    fn replace(&mut self, id: &str, resource: Self::Resource);

    fn get(&self, id: &str) -> Option<&Arc<Self::Resource>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Indexed ─────────────────────────────────────────────────────────

/// Insertion-ordered id → resource mapping.
///
/// Entities are held behind `Arc` so snapshots and selector results are
/// cheap clones, mirroring how reactive consumers hold on to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Indexed<T>(IndexMap<String, Arc<T>>);

impl<T> Indexed<T> {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<T>> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<T>)> {
        self.0.iter().map(|(id, resource)| (id.as_str(), resource))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for Indexed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(String, T)> for Indexed<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(entries: I) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(id, resource)| (id, Arc::new(resource)))
                .collect(),
        )
    }
}

impl<T: Identify + Clone> Records for Indexed<T> {
    type Resource = T;

    const INDEXED: bool = true;

    fn merge(&mut self, entity: &EntityName, payload: Payload<T>) -> Result<Merged, StoreError> {
        // Validate before touching storage: a bad id fails the whole
        // merge, never a partial one.
        let merged = Self::payload_ids(entity, &payload)?;
        match payload {
            Payload::One(resource) => {
                self.0.insert(resource.id().to_owned(), Arc::new(resource));
            }
            Payload::Many(resources) => {
                for resource in resources {
                    self.0.insert(resource.id().to_owned(), Arc::new(resource));
                }
            }
            Payload::Map(entries) => {
                for (id, resource) in entries {
                    self.0.insert(id, Arc::new(resource));
                }
            }
        }
        Ok(merged)
    }

    fn payload_ids(entity: &EntityName, payload: &Payload<T>) -> Result<Merged, StoreError> {
        let (ids, collection): (Vec<String>, bool) = match payload {
            Payload::One(resource) => (vec![resource.id().to_owned()], false),
            Payload::Many(resources) => {
                (resources.iter().map(|r| r.id().to_owned()).collect(), true)
            }
            Payload::Map(entries) => (entries.keys().cloned().collect(), true),
        };
        if ids.iter().any(String::is_empty) {
            return Err(StoreError::MissingId {
                entity: entity.clone(),
            });
        }
        Ok(Merged {
            ids: Some(ids),
            collection,
        })
    }

    fn update_id(entity: &EntityName, resource: &T) -> Result<Option<String>, StoreError> {
        let id = resource.id();
        if id.is_empty() {
            return Err(StoreError::MissingId {
                entity: entity.clone(),
            });
        }
        Ok(Some(id.to_owned()))
    }

    fn replace(&mut self, id: &str, resource: T) {
        self.0.insert(id.to_owned(), Arc::new(resource));
    }

    fn get(&self, id: &str) -> Option<&Arc<T>> {
        self.0.get(id)
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

// ── Single ──────────────────────────────────────────────────────────

/// The raw last-fetched payload, no identifier constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Single<T>(Option<Arc<T>>);

impl<T> Single<T> {
    pub fn new() -> Self {
        Self(None)
    }

    /// Storage seeded with an initial payload.
    pub fn of(payload: T) -> Self {
        Self(Some(Arc::new(payload)))
    }

    pub fn payload(&self) -> Option<&Arc<T>> {
        self.0.as_ref()
    }
}

impl<T> Default for Single<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Records for Single<T> {
    type Resource = T;

    const INDEXED: bool = false;

    fn merge(&mut self, entity: &EntityName, payload: Payload<T>) -> Result<Merged, StoreError> {
        match payload {
            Payload::One(resource) => {
                self.0 = Some(Arc::new(resource));
                Ok(Merged {
                    ids: None,
                    collection: false,
                })
            }
            Payload::Many(_) | Payload::Map(_) => Err(StoreError::SingularPayload {
                entity: entity.clone(),
            }),
        }
    }

    fn payload_ids(entity: &EntityName, payload: &Payload<T>) -> Result<Merged, StoreError> {
        match payload {
            Payload::One(_) => Ok(Merged {
                ids: None,
                collection: false,
            }),
            Payload::Many(_) | Payload::Map(_) => Err(StoreError::SingularPayload {
                entity: entity.clone(),
            }),
        }
    }

    fn update_id(_entity: &EntityName, _resource: &T) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn replace(&mut self, _id: &str, resource: T) {
        self.0 = Some(Arc::new(resource));
    }

    fn get(&self, _id: &str) -> Option<&Arc<T>> {
        None
    }

    fn len(&self) -> usize {
        usize::from(self.0.is_some())
    }
}

// ── Reference stability ─────────────────────────────────────────────

/// Keep the previous allocation when the next value is structurally
/// equal. Consumers treat pointer identity of derived values (fetch
/// order, pagination) as "unchanged"; a value-identical refetch must not
/// hand them a fresh allocation.
pub fn reconcile<V: PartialEq>(previous: Option<&Arc<V>>, next: Option<V>) -> Option<Arc<V>> {
    match (previous, next) {
        (Some(prev), Some(next)) if **prev == next => Some(Arc::clone(prev)),
        (_, Some(next)) => Some(Arc::new(next)),
        (_, None) => None,
    }
}

/// Next fetch order after a successful merge: an explicit server order
/// wins, a collection payload supplies its own id sequence, and a lone
/// resource keeps whatever order was there. Value-identical results keep
/// the previous allocation.
pub fn derive_order(
    merged: &Merged,
    previous: Option<&Arc<Vec<String>>>,
    explicit: Option<Vec<String>>,
) -> Option<Arc<Vec<String>>> {
    let next = match explicit {
        Some(order) => Some(order),
        None if merged.collection => merged.ids.clone(),
        None => return previous.cloned(),
    };
    reconcile(previous, next)
}
