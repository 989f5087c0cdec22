// ── Pure state machine ──
//
// Consumes routed actions against the status tracker and merge
// utilities. Synchronous and side-effect free: every transition produces
// a whole new state value, so readers never observe a half-applied
// action. Race policy is last-applied-action-wins: no sequence numbers,
// no stamp comparison. Concurrent operations over disjoint id sets
// compose safely; callers racing the same id must discard stale
// responses before dispatching.

use tracing::{debug, trace, warn};

use crate::action::{Action, ActionKind, Payload};
use crate::entity::EntityName;
use crate::error::StoreError;
use crate::records::{Merged, Records, derive_order, reconcile};
use crate::state::ResourceState;
use crate::status::StatusIds;

/// The pure transition function for one entity name.
///
/// Actions routed to a different entity pass through unchanged, which is
/// what lets several containers share one dispatch stream. The only
/// fallible transitions are indexed merges meeting an empty id; every
/// other action is infallible.
#[derive(Debug, Clone)]
pub struct Reducer {
    entity: EntityName,
}

impl Reducer {
    pub fn new(entity: impl Into<EntityName>) -> Self {
        Self {
            entity: entity.into(),
        }
    }

    pub fn entity(&self) -> &EntityName {
        &self.entity
    }

    /// Apply one action. On error the input state is still valid and
    /// unchanged for the caller to keep.
    pub fn reduce<R: Records>(
        &self,
        state: &ResourceState<R>,
        action: Action<R::Resource>,
    ) -> Result<ResourceState<R>, StoreError> {
        if action.entity != self.entity {
            trace!(entity = %self.entity, target = %action.entity, "ignoring action for another entity");
            return Ok(state.clone());
        }
        debug!(entity = %self.entity, kind = action.kind.as_ref(), "applying action");

        match action.kind {
            ActionKind::FetchStart { ids } => {
                let mut next = state.clone();
                next.loading_ids.apply(ids.as_deref());
                Ok(next)
            }

            ActionKind::FetchSuccess {
                data,
                pagination,
                order,
                time,
            } => {
                let mut next = state.clone();
                let merged = next.data.merge(&self.entity, data)?;
                clear_loading(&mut next.loading_ids, &merged);
                next.last_fetch_order =
                    derive_order(&merged, state.last_fetch_order.as_ref(), order);
                next.pagination = reconcile(state.pagination.as_ref(), pagination);
                next.last_fetch = Some(time);
                next.error = None;
                Ok(next)
            }

            ActionKind::FetchSuccessIgnore { data, time } => {
                // Data, order, and pagination stay byte-for-byte as they
                // were; only the loading flags resolve. Conditional-GET
                // polling relies on this.
                let merged = R::payload_ids(&self.entity, &data)?;
                let mut next = state.clone();
                clear_loading(&mut next.loading_ids, &merged);
                next.last_fetch = Some(time);
                next.error = None;
                Ok(next)
            }

            ActionKind::FetchError { error, ids, time } => {
                if error.is_empty() || time.is_none() {
                    warn!(entity = %self.entity, "dropping malformed fetch error");
                    return Ok(state.clone());
                }
                let mut next = state.clone();
                if R::INDEXED {
                    next.loading_ids.remove(ids.as_deref());
                } else {
                    next.loading_ids.clear();
                }
                next.error = Some(error.clone());
                next.last_error = Some(error);
                Ok(next)
            }

            ActionKind::UpdateStart { data } => {
                let mut next = state.clone();
                let tag = R::update_id(&self.entity, &data)?.map(|id| vec![id]);
                next.data.merge(&self.entity, Payload::One(data))?;
                next.updating_ids.apply(tag.as_deref());
                Ok(next)
            }

            ActionKind::UpdateSuccess { id, data, time } => {
                let mut next = state.clone();
                next.updating_ids.remove(Some(std::slice::from_ref(&id)));
                if let Some(resource) = data {
                    next.data.replace(&id, resource);
                }
                next.last_fetch = Some(time);
                next.error = None;
                Ok(next)
            }

            ActionKind::UpdateError { error, id, time: _ } => {
                let mut next = state.clone();
                next.updating_ids.remove(Some(std::slice::from_ref(&id)));
                next.error = Some(error.clone());
                next.last_error = Some(error);
                Ok(next)
            }
        }
    }
}

/// Resolve loading state after a successful fetch: indexed payloads clear
/// exactly the ids they carried (plus the sentinel), whole-collection
/// payloads clear everything.
fn clear_loading(loading: &mut StatusIds, merged: &Merged) {
    match merged.ids.as_deref() {
        Some(ids) => loading.remove(Some(ids)),
        None => loading.clear(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::action::Actions;
    use crate::entity::{Identify, Timestamp};
    use crate::records::{Indexed, Single};

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: String,
        label: String,
    }

    impl Tag {
        fn new(id: &str, label: &str) -> Self {
            Self {
                id: id.to_owned(),
                label: label.to_owned(),
            }
        }
    }

    impl Identify for Tag {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn setup() -> (Reducer, Actions<Tag>, ResourceState<Indexed<Tag>>) {
        (
            Reducer::new("tags"),
            Actions::new("tags"),
            ResourceState::new(),
        )
    }

    #[test]
    fn fetch_start_without_ids_marks_the_collection() {
        let (reducer, actions, state) = setup();
        let state = reducer.reduce(&state, actions.fetch_start()).unwrap();
        assert!(state.is_loading());
        assert!(state.loading_ids.contains_all());
    }

    #[test]
    fn fetch_success_clears_only_the_fetched_ids() {
        let (reducer, actions, state) = setup();
        let state = reducer
            .reduce(&state, actions.fetch_start_ids(["a", "b"]))
            .unwrap();
        let state = reducer
            .reduce(&state, actions.fetch_success(vec![Tag::new("a", "one")]))
            .unwrap();

        assert!(!state.is_loading_id("a"));
        assert!(state.is_loading_id("b"));
    }

    #[test]
    fn fetch_success_resolves_a_whole_collection_start() {
        let (reducer, actions, state) = setup();
        let state = reducer.reduce(&state, actions.fetch_start()).unwrap();
        let state = reducer
            .reduce(&state, actions.fetch_success(vec![Tag::new("a", "one")]))
            .unwrap();
        assert!(!state.is_loading());
    }

    #[test]
    fn fetch_success_records_data_and_order() {
        let (reducer, actions, state) = setup();
        let state = reducer
            .reduce(
                &state,
                actions.fetch_success(vec![Tag::new("a", "one"), Tag::new("b", "two")]),
            )
            .unwrap();

        assert_eq!(state.data.len(), 2);
        assert_eq!(state.get("a").unwrap().label, "one");
        assert_eq!(
            **state.last_fetch_order().unwrap(),
            vec!["a".to_owned(), "b".to_owned()]
        );
        assert!(state.last_fetch().is_some());
    }

    #[test]
    fn fetch_success_clears_error_but_not_last_error() {
        let (reducer, actions, state) = setup();
        let state = reducer
            .reduce(&state, actions.fetch_error("boom"))
            .unwrap();
        let state = reducer
            .reduce(&state, actions.fetch_success(vec![Tag::new("a", "one")]))
            .unwrap();

        assert_eq!(state.current_error(), None);
        assert_eq!(state.last_error(), Some("boom"));
    }

    #[test]
    fn fetch_success_for_a_lone_resource_keeps_the_collection_order() {
        let (reducer, actions, state) = setup();
        let state = reducer
            .reduce(
                &state,
                actions.fetch_success(vec![Tag::new("a", "one"), Tag::new("b", "two")]),
            )
            .unwrap();
        let before = Arc::clone(state.last_fetch_order().unwrap());

        let state = reducer
            .reduce(
                &state,
                actions.fetch_success(Payload::one(Tag::new("a", "uno"))),
            )
            .unwrap();

        assert!(Arc::ptr_eq(&before, state.last_fetch_order().unwrap()));
        assert_eq!(state.get("a").unwrap().label, "uno");
    }

    #[test]
    fn fetch_success_ignore_leaves_data_alone() {
        let (reducer, actions, state) = setup();
        let state = reducer
            .reduce(&state, actions.fetch_success(vec![Tag::new("a", "one")]))
            .unwrap();
        let state = reducer
            .reduce(&state, actions.fetch_start_ids(["a"]))
            .unwrap();
        let state = reducer
            .reduce(
                &state,
                actions.fetch_success_ignore(vec![Tag::new("a", "stale")]),
            )
            .unwrap();

        assert!(!state.is_loading_id("a"));
        assert_eq!(state.get("a").unwrap().label, "one");
    }

    #[test]
    fn malformed_fetch_error_is_a_no_op() {
        let (reducer, actions, state) = setup();
        let state = reducer.reduce(&state, actions.fetch_start()).unwrap();

        let action = Action {
            entity: actions.entity().clone(),
            kind: ActionKind::FetchError {
                error: String::new(),
                ids: None,
                time: Some(Timestamp::from_millis(1)),
            },
        };
        let state = reducer.reduce(&state, action).unwrap();
        assert!(state.is_loading());
        assert!(state.current_error().is_none());

        let action = Action {
            entity: actions.entity().clone(),
            kind: ActionKind::FetchError {
                error: "boom".to_owned(),
                ids: None,
                time: None,
            },
        };
        let state = reducer.reduce(&state, action).unwrap();
        assert!(state.is_loading());
        assert!(state.current_error().is_none());
    }

    #[test]
    fn fetch_error_records_both_error_fields_and_keeps_data() {
        let (reducer, actions, state) = setup();
        let state = reducer
            .reduce(&state, actions.fetch_success(vec![Tag::new("a", "one")]))
            .unwrap();
        let state = reducer
            .reduce(&state, actions.fetch_start_ids(["a"]))
            .unwrap();
        let state = reducer
            .reduce(&state, actions.fetch_error_ids("boom", ["a"]))
            .unwrap();

        assert_eq!(state.current_error(), Some("boom"));
        assert_eq!(state.last_error(), Some("boom"));
        assert!(!state.is_loading_id("a"));
        assert_eq!(state.get("a").unwrap().label, "one");
    }

    #[test]
    fn update_start_merges_optimistically_and_marks_updating() {
        let (reducer, actions, state) = setup();
        let state = reducer
            .reduce(&state, actions.update_start(Tag::new("a", "draft")))
            .unwrap();

        assert!(state.is_updating_id("a"));
        assert_eq!(state.get("a").unwrap().label, "draft");
    }

    #[test]
    fn update_success_replaces_wholesale_and_clears_error() {
        let (reducer, actions, state) = setup();
        let state = reducer
            .reduce(&state, actions.update_start(Tag::new("a", "draft")))
            .unwrap();
        let state = reducer
            .reduce(&state, actions.update_error("rejected", "a"))
            .unwrap();
        assert_eq!(state.current_error(), Some("rejected"));

        let state = reducer
            .reduce(
                &state,
                actions.update_success_with("a", Tag::new("a", "final")),
            )
            .unwrap();

        assert!(!state.is_updating_id("a"));
        assert_eq!(state.get("a").unwrap().label, "final");
        assert_eq!(state.current_error(), None);
        assert_eq!(state.last_error(), Some("rejected"));
    }

    #[test]
    fn update_success_without_data_keeps_the_optimistic_merge() {
        let (reducer, actions, state) = setup();
        let state = reducer
            .reduce(&state, actions.update_start(Tag::new("a", "draft")))
            .unwrap();
        let state = reducer
            .reduce(&state, actions.update_success("a"))
            .unwrap();

        assert!(!state.is_updating());
        assert_eq!(state.get("a").unwrap().label, "draft");
    }

    #[test]
    fn update_start_with_an_empty_id_fails_loudly() {
        let (reducer, actions, state) = setup();
        let err = reducer
            .reduce(&state, actions.update_start(Tag::new("", "ghost")))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::MissingId {
                entity: EntityName::new("tags")
            }
        );
    }

    #[test]
    fn foreign_entity_actions_pass_through_unchanged() {
        let (reducer, _, state) = setup();
        let foreign: Actions<Tag> = Actions::new("rules");

        let state = reducer.reduce(&state, foreign.fetch_start()).unwrap();
        assert!(!state.is_loading());

        let state = reducer
            .reduce(&state, foreign.fetch_success(vec![Tag::new("a", "one")]))
            .unwrap();
        assert!(state.data.is_empty());
    }

    #[test]
    fn single_mode_success_clears_all_loading_ids() {
        let reducer = Reducer::new("profile");
        let actions: Actions<String> = Actions::new("profile");
        let state: ResourceState<Single<String>> = ResourceState::new();

        let state = reducer.reduce(&state, actions.fetch_start()).unwrap();
        assert!(state.loading_ids.contains_all());

        let state = reducer
            .reduce(&state, actions.fetch_success(Payload::one("me".to_owned())))
            .unwrap();
        assert!(!state.is_loading());
        assert_eq!(**state.data.payload().unwrap(), "me");
    }

    #[test]
    fn single_mode_update_uses_the_sentinel() {
        let reducer = Reducer::new("profile");
        let actions: Actions<String> = Actions::new("profile");
        let state: ResourceState<Single<String>> = ResourceState::new();

        let state = reducer
            .reduce(&state, actions.update_start("draft".to_owned()))
            .unwrap();
        assert!(state.updating_ids.contains_all());

        let state = reducer
            .reduce(&state, actions.update_success("profile"))
            .unwrap();
        assert!(!state.is_updating());
    }
}
