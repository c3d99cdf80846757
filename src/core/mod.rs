//! Core module containing the store state machine and its supporting types

pub mod entity;
pub mod error;
pub mod events;
pub mod store;
pub mod validation;

pub use entity::{Draft, Entity};
pub use error::{DataError, DataResult, ErrorKind, RemoteError, ValidationError};
pub use events::{EventBus, EventEnvelope, Operation, StoreEvent};
pub use store::{CollectionStore, Snapshot};
