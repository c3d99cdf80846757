//! # StaySync
//!
//! An async data layer for hotel management front ends: local collection
//! mirrors kept in sync with a remote relational backend.
//!
//! ## Features
//!
//! - **Collection Mirrors**: Each entity collection (rooms, guests,
//!   bookings, payments) lives in a [`core::CollectionStore`] that loads
//!   once, then applies every confirmed mutation locally
//! - **Pluggable Remotes**: Stores talk to a [`remote::RemoteStore`] trait
//!   object; ships with a PostgREST-style HTTP backend and an in-memory
//!   backend for tests and demos
//! - **Event Bus**: Every operation outcome is published as a
//!   [`core::StoreEvent`]; presentation subscribes, the stores never
//!   render anything
//! - **Error Classification**: Remote failures are classified into
//!   user-phrasable kinds (duplicate, invalid data, connectivity, ...)
//!   without changing control flow
//! - **Remote Procedures**: Availability checks and total calculation run
//!   server-side and are decoded into typed results
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use staysync::prelude::*;
//!
//! let remote: Arc<dyn RemoteStore> = Arc::new(InMemoryRemote::new());
//! let events = EventBus::default();
//! NotificationRelay::spawn(&events, Arc::new(TracingNotifier));
//!
//! let rooms = CollectionStore::<Room>::activate(remote.clone(), events.clone()).await;
//! let room = rooms
//!     .add(NewRoom {
//!         number: "101".to_string(),
//!         room_type: "suite".to_string(),
//!         status: "available".to_string(),
//!         rate: dec!(250.00),
//!         extra: Default::default(),
//!     })
//!     .await?;
//!
//! let snapshot = rooms.snapshot();
//! assert_eq!(snapshot.data.unwrap()[0].id, room.id);
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod notify;
pub mod remote;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        entity::{Draft, Entity},
        error::{DataError, DataResult, ErrorKind, RemoteError, ValidationError},
        events::{EventBus, EventEnvelope, Operation, StoreEvent},
        store::{CollectionStore, Snapshot},
    };

    // === Entities ===
    pub use crate::entities::{
        Booking, BookingPatch, Guest, GuestPatch, NewBooking, NewGuest, NewPayment, NewRoom,
        Payment, PaymentPatch, Room, RoomPatch,
    };

    // === Remote backends ===
    pub use crate::remote::RemoteStore;
    #[cfg(feature = "in-memory")]
    pub use crate::remote::InMemoryRemote;
    #[cfg(feature = "rest")]
    pub use crate::remote::RestRemote;

    // === Notifications ===
    pub use crate::notify::{NotificationRelay, Notifier, TracingNotifier};

    // === Config ===
    pub use crate::config::RemoteConfig;

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use rust_decimal::{Decimal, dec};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::Value;
    pub use uuid::Uuid;
}
