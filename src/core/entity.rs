//! Entity traits defining the core abstraction for mirrored collections
//!
//! A [`CollectionStore`] is generic over one entity type. The [`Entity`]
//! trait supplies the remote table name, the read shape (join specification)
//! used when rows come back from the remote store, and the draft/patch
//! schemas for mutations. Validation lives on the draft so a store can fail
//! fast before any network call.
//!
//! [`CollectionStore`]: crate::core::store::CollectionStore

use crate::core::error::ValidationError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// A record mirrored from one remote table.
///
/// Rows are identified by an immutable `id`. Beyond the id and the few
/// typed fields each entity declares, the internal shape of a record is not
/// validated by this layer.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The create-request schema for this entity
    type Draft: Draft;

    /// The update-request schema. Unset fields must serialize to nothing so
    /// a patch only touches the columns it names.
    type Patch: Serialize + Send + Sync;

    /// Whether `add` runs a pre-flight connectivity check before inserting.
    /// Only guest creation does this today.
    const PREFLIGHT: bool = false;

    /// The remote table name (e.g. "rooms")
    fn table() -> &'static str;

    /// The singular entity name used in events and notification copy
    /// (e.g. "room")
    fn entity_name() -> &'static str;

    /// The read shape passed through to the remote store so related rows
    /// come back embedded. `None` means the bare row.
    fn read_shape() -> Option<&'static str> {
        None
    }

    /// The unique identifier of this row
    fn id(&self) -> Uuid;
}

/// Create-request schema with entity-specific required-field validation
pub trait Draft: Serialize + Send + Sync {
    /// Check required fields. Runs before any network call; an `Err` here
    /// means the insert is never attempted.
    fn validate(&self) -> Result<(), ValidationError>;
}
