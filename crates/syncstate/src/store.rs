// ── Mounted store: reducer + snapshot publication ──
//
// Binds a routing key and reducer to a current state value. Snapshots
// are published through a `watch` channel: readers take cheap `Arc`
// clones, subscribers wake on every applied action. Exactly one writer
// path (dispatch) produces whole new state values, so a partially
// applied action is never observable.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

use crate::action::{Action, Actions};
use crate::entity::EntityName;
use crate::error::StoreError;
use crate::records::{Indexed, Records, Single};
use crate::reducer::Reducer;
use crate::state::ResourceState;

/// Store over an id → resource mapping.
pub type IndexedStore<T> = Store<Indexed<T>>;

/// Store over one raw payload.
pub type SingleStore<T> = Store<Single<T>>;

/// A mounted container: one entity name, one state value.
///
/// Several stores can consume the same action stream; each applies only
/// the actions bearing its own routing key.
pub struct Store<R: Records> {
    entity: EntityName,
    reducer: Reducer,
    state: watch::Sender<Arc<ResourceState<R>>>,
}

impl<R: Records> Store<R> {
    /// A store with a fresh initial state.
    pub fn new(entity: impl Into<EntityName>) -> Self {
        Self::builder(entity).build()
    }

    pub fn builder(entity: impl Into<EntityName>) -> StoreBuilder<R> {
        StoreBuilder {
            entity: entity.into(),
            namespace: None,
            initial: None,
        }
    }

    pub fn entity(&self) -> &EntityName {
        &self.entity
    }

    /// Action constructors bound to this store's routing key.
    pub fn actions(&self) -> Actions<R::Resource> {
        Actions::new(self.entity.clone())
    }

    /// The current state snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<ResourceState<R>> {
        self.state.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ResourceState<R>>> {
        self.state.subscribe()
    }

    /// Apply one action. Actions routed to another entity are skipped
    /// without waking subscribers; a failed merge leaves the published
    /// snapshot untouched.
    pub fn dispatch(&self, action: Action<R::Resource>) -> Result<(), StoreError> {
        if action.entity != self.entity {
            trace!(entity = %self.entity, target = %action.entity, "skipping action for another entity");
            return Ok(());
        }

        let mut outcome = Ok(());
        self.state.send_if_modified(|current| {
            match self.reducer.reduce(current.as_ref(), action) {
                Ok(next) => {
                    *current = Arc::new(next);
                    true
                }
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            }
        });
        outcome
    }
}

impl<R: Records> std::fmt::Debug for Store<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("entity", &self.entity).finish_non_exhaustive()
    }
}

/// Builder exposing the mount-time options: a namespace prefix for the
/// routing key and a data seed.
#[derive(Debug)]
pub struct StoreBuilder<R: Records> {
    entity: EntityName,
    namespace: Option<String>,
    initial: Option<R>,
}

impl<R: Records> StoreBuilder<R> {
    /// Prefix the routing key, isolating this store from same-named
    /// containers in other parts of the tree.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Seed the store with existing data.
    pub fn initial_data(mut self, data: R) -> Self {
        self.initial = Some(data);
        self
    }

    pub fn build(self) -> Store<R> {
        let entity = match self.namespace {
            Some(ns) => EntityName::namespaced(ns, self.entity.as_str()),
            None => self.entity,
        };
        let state = self
            .initial
            .map_or_else(ResourceState::new, ResourceState::with_data);
        let (tx, _) = watch::channel(Arc::new(state));
        Store {
            reducer: Reducer::new(entity.clone()),
            entity,
            state: tx,
        }
    }
}
