//! Remote store abstraction and backends
//!
//! [`RemoteStore`] is the seam between the collection stores and whatever
//! actually holds the data. It is object-safe and injected as
//! `Arc<dyn RemoteStore>` so every store is testable against a fake.
//!
//! Two backends ship with the crate:
//! - [`InMemoryRemote`] (feature `in-memory`, default): for tests and
//!   development
//! - [`RestRemote`] (feature `rest`): PostgREST-convention HTTP backend

use crate::core::error::RemoteError;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

#[cfg(feature = "in-memory")]
pub mod in_memory;
#[cfg(feature = "rest")]
pub mod rest;

#[cfg(feature = "in-memory")]
pub use in_memory::InMemoryRemote;
#[cfg(feature = "rest")]
pub use rest::RestRemote;

/// Uniform row-level interface to the remote data store
///
/// Rows travel as JSON values; the typed layer above deserializes them into
/// entity structs. `read_shape` is the backend's join specification; when
/// present, reads (and the rows returned by mutations) embed related
/// records.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the entire collection, in backend order
    async fn list_all(
        &self,
        table: &str,
        read_shape: Option<&str>,
    ) -> Result<Vec<Value>, RemoteError>;

    /// Insert exactly one record; returns the inserted row in read shape
    async fn insert(
        &self,
        table: &str,
        record: Value,
        read_shape: Option<&str>,
    ) -> Result<Value, RemoteError>;

    /// Update the row with the given id; returns the updated row in read
    /// shape
    async fn update(
        &self,
        table: &str,
        id: Uuid,
        patch: Value,
        read_shape: Option<&str>,
    ) -> Result<Value, RemoteError>;

    /// Delete the row with the given id
    async fn delete(&self, table: &str, id: Uuid) -> Result<(), RemoteError>;

    /// Invoke a named server-side procedure with JSON arguments
    async fn call_procedure(&self, name: &str, args: Value) -> Result<Value, RemoteError>;

    /// Cheap connectivity probe against a table, used as a pre-flight check
    async fn ping(&self, table: &str) -> Result<(), RemoteError>;
}
