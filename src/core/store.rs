//! Generic collection store: a local mirror of one remote table
//!
//! A [`CollectionStore`] owns an in-memory list mirroring one remote
//! collection. It fetches the full collection once on activation and then
//! keeps the mirror consistent with the outcome of each mutation by
//! patching it optimistically from the mutation's response (prepend on
//! insert, replace-in-place on update, filter on delete) instead of
//! re-reading the whole table.
//!
//! # State machine
//!
//! `Unloaded → Loading → Ready | Failed`. The initial read runs once;
//! `Ready` and `Failed` are never revisited automatically; only explicit
//! mutations change the mirror afterwards. A caller that wants a fresh read
//! constructs a new store.
//!
//! # Consistency contract
//!
//! Operations do not queue or serialize against each other. Each one
//! re-acquires the mirror lock after its remote call resolves and applies
//! its patch to whatever mirror value is current at that moment, so
//! overlapping mutations are last-applied-wins. The lock is never held
//! across an await point. No cancellation, no retries, no layer-level
//! timeout: a failed operation surfaces exactly once and stays failed.

use crate::core::entity::{Draft, Entity};
use crate::core::error::{DataError, DataResult, RemoteError};
use crate::core::events::{EventBus, Operation, StoreEvent};
use crate::remote::RemoteStore;
use serde_json::Value;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Lifecycle of the local mirror
enum MirrorState<T> {
    /// Created, initial read not started
    Unloaded,
    /// Initial read in flight
    Loading,
    /// Mirror populated; holds exactly the rows of the last successful
    /// read or mutation
    Ready(Vec<T>),
    /// Initial read failed; mirror stays absent
    Failed(DataError),
}

/// Point-in-time view of a store's status and data
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<DataError>,
    pub data: Option<Vec<T>>,
}

/// Local mirror of one remote collection, generic over the entity type
///
/// The remote store is injected so every instance is testable against a
/// fake. All stores of one application context share an [`EventBus`];
/// presentation subscribes there instead of being called from here.
pub struct CollectionStore<T: Entity> {
    remote: Arc<dyn RemoteStore>,
    events: EventBus,
    mirror: RwLock<MirrorState<T>>,
}

impl<T: Entity> CollectionStore<T> {
    /// Create an unloaded store
    pub fn new(remote: Arc<dyn RemoteStore>, events: EventBus) -> Self {
        Self {
            remote,
            events,
            mirror: RwLock::new(MirrorState::Unloaded),
        }
    }

    /// Create a store and run its initial read
    pub async fn activate(remote: Arc<dyn RemoteStore>, events: EventBus) -> Self {
        let store = Self::new(remote, events);
        store.load().await;
        store
    }

    /// The event bus this store publishes to
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn read_mirror(&self) -> RwLockReadGuard<'_, MirrorState<T>> {
        self.mirror.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_mirror(&self) -> RwLockWriteGuard<'_, MirrorState<T>> {
        self.mirror.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Run the initial "list all" read.
    ///
    /// Only acts when the store is `Unloaded`; on any other state this is a
    /// no-op returning the current snapshot, so calling it twice issues a
    /// single remote read.
    pub async fn load(&self) -> Snapshot<T> {
        {
            let mut mirror = self.write_mirror();
            match *mirror {
                MirrorState::Unloaded => *mirror = MirrorState::Loading,
                _ => {
                    drop(mirror);
                    return self.snapshot();
                }
            }
        }

        match self.fetch_all().await {
            Ok(rows) => {
                tracing::debug!(
                    entity = T::entity_name(),
                    count = rows.len(),
                    "collection loaded"
                );
                self.events.publish(StoreEvent::Loaded {
                    entity: T::entity_name().to_string(),
                    count: rows.len(),
                });
                *self.write_mirror() = MirrorState::Ready(rows);
            }
            Err(error) => {
                tracing::error!(
                    entity = T::entity_name(),
                    error = %error,
                    "failed to load collection"
                );
                self.events.publish(StoreEvent::LoadFailed {
                    entity: T::entity_name().to_string(),
                    error: error.clone(),
                });
                *self.write_mirror() = MirrorState::Failed(error);
            }
        }
        self.snapshot()
    }

    async fn fetch_all(&self) -> DataResult<Vec<T>> {
        let rows = self
            .remote
            .list_all(T::table(), T::read_shape())
            .await
            .map_err(DataError::Remote)?;
        rows.into_iter().map(|row| Self::decode(row)).collect()
    }

    /// Current mirror and status flags. No side effect.
    pub fn snapshot(&self) -> Snapshot<T> {
        match &*self.read_mirror() {
            MirrorState::Unloaded | MirrorState::Loading => Snapshot {
                is_loading: true,
                is_error: false,
                error: None,
                data: None,
            },
            MirrorState::Ready(rows) => Snapshot {
                is_loading: false,
                is_error: false,
                error: None,
                data: Some(rows.clone()),
            },
            MirrorState::Failed(error) => Snapshot {
                is_loading: false,
                is_error: true,
                error: Some(error.clone()),
                data: None,
            },
        }
    }

    /// Insert one record and prepend the returned row to the mirror.
    ///
    /// Validation runs first and fails without any network call. Entities
    /// that request it get a pre-flight connectivity probe before the
    /// insert. On success the returned row goes to the front of the mirror
    /// (newest-first is a contract callers rely on); a mirror that was not
    /// `Ready` becomes a one-element `Ready` mirror. On failure the mirror
    /// is left untouched and the error is returned so the caller can react.
    pub async fn add(&self, draft: T::Draft) -> DataResult<T> {
        if let Err(error) = draft.validate() {
            return Err(self.mutation_failure(Operation::Add, error.into()));
        }

        if T::PREFLIGHT {
            if let Err(error) = self.remote.ping(T::table()).await {
                return Err(self.mutation_failure(Operation::Add, DataError::Connectivity(error)));
            }
        }

        let record = match Self::encode(&draft) {
            Ok(record) => record,
            Err(error) => return Err(self.mutation_failure(Operation::Add, error)),
        };

        let row = self
            .remote
            .insert(T::table(), record, T::read_shape())
            .await
            .map_err(DataError::Remote)
            .and_then(Self::decode)
            .map_err(|error| self.mutation_failure(Operation::Add, error))?;

        {
            let mut mirror = self.write_mirror();
            match &mut *mirror {
                MirrorState::Ready(rows) => rows.insert(0, row.clone()),
                state => *state = MirrorState::Ready(vec![row.clone()]),
            }
        }

        tracing::debug!(entity = T::entity_name(), id = %row.id(), "record created");
        self.events.publish(StoreEvent::Created {
            entity: T::entity_name().to_string(),
            id: row.id(),
        });
        Ok(row)
    }

    /// Update the row with the given id and replace it in place.
    ///
    /// The first mirror entry with a matching id is swapped for the
    /// returned row, preserving its position; everything else is
    /// untouched. A mirror that is not `Ready` is left as is. On failure
    /// the mirror is untouched and the error is returned.
    pub async fn update(&self, id: Uuid, patch: T::Patch) -> DataResult<T> {
        let payload = match Self::encode(&patch) {
            Ok(payload) => payload,
            Err(error) => return Err(self.mutation_failure(Operation::Update, error)),
        };

        let row = self
            .remote
            .update(T::table(), id, payload, T::read_shape())
            .await
            .map_err(DataError::Remote)
            .and_then(Self::decode)
            .map_err(|error| self.mutation_failure(Operation::Update, error))?;

        {
            let mut mirror = self.write_mirror();
            if let MirrorState::Ready(rows) = &mut *mirror {
                if let Some(slot) = rows.iter_mut().find(|r| r.id() == id) {
                    *slot = row.clone();
                }
            }
        }

        tracing::debug!(entity = T::entity_name(), id = %id, "record updated");
        self.events.publish(StoreEvent::Updated {
            entity: T::entity_name().to_string(),
            id,
        });
        Ok(row)
    }

    /// Delete the row with the given id and drop it from the mirror.
    ///
    /// All mirror entries with a matching id are removed (at most one in
    /// practice), relative order of the rest unchanged. On failure the
    /// mirror is untouched and the error is returned.
    pub async fn remove(&self, id: Uuid) -> DataResult<()> {
        self.remote
            .delete(T::table(), id)
            .await
            .map_err(|error| self.mutation_failure(Operation::Remove, DataError::Remote(error)))?;

        {
            let mut mirror = self.write_mirror();
            if let MirrorState::Ready(rows) = &mut *mirror {
                rows.retain(|r| r.id() != id);
            }
        }

        tracing::debug!(entity = T::entity_name(), id = %id, "record deleted");
        self.events.publish(StoreEvent::Deleted {
            entity: T::entity_name().to_string(),
            id,
        });
        Ok(())
    }

    /// Invoke a named remote procedure. No mirror change on any outcome.
    pub async fn call_procedure(&self, name: &str, args: Value) -> DataResult<Value> {
        self.remote
            .call_procedure(name, args)
            .await
            .map_err(|error| self.procedure_failure(name, DataError::Remote(error)))
    }

    /// Record a procedure failure: log it, publish it, hand it back
    pub(crate) fn procedure_failure(&self, name: &str, error: DataError) -> DataError {
        tracing::error!(procedure = name, error = %error, "remote procedure failed");
        self.events.publish(StoreEvent::ProcedureFailed {
            procedure: name.to_string(),
            error: error.clone(),
        });
        error
    }

    fn mutation_failure(&self, operation: Operation, error: DataError) -> DataError {
        tracing::error!(
            entity = T::entity_name(),
            operation = operation.verb(),
            error = %error,
            "mutation failed"
        );
        self.events.publish(StoreEvent::MutationFailed {
            entity: T::entity_name().to_string(),
            operation,
            error: error.clone(),
        });
        error
    }

    fn encode<S: serde::Serialize>(value: &S) -> DataResult<Value> {
        serde_json::to_value(value)
            .map_err(|e| RemoteError::message(format!("failed to encode record: {}", e)).into())
    }

    fn decode(row: Value) -> DataResult<T> {
        serde_json::from_value(row).map_err(|e| {
            RemoteError::message(format!(
                "invalid {} row from backend: {}",
                T::entity_name(),
                e
            ))
            .into()
        })
    }
}
