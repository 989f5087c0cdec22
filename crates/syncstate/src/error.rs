use thiserror::Error;

use crate::entity::EntityName;

/// Failures surfaced by merges and dispatch.
///
/// Ordinary state transitions never fail; the only error paths are
/// invariant violations in the storage layer, raised loudly because
/// silently dropping data is worse than a failed dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Indexed storage received a resource without a usable id.
    #[error("cannot merge a `{entity}` resource with an empty id")]
    MissingId { entity: EntityName },

    /// Single-payload storage received a list or map payload.
    #[error("`{entity}` stores one payload per fetch; dispatch a single resource")]
    SingularPayload { entity: EntityName },
}
