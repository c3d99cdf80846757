//! Typed entity schemas for the four hotel collections
//!
//! Each entity module defines three shapes:
//!
//! - the read row (what the remote store returns, including embedded
//!   related records where the read shape joins them)
//! - a draft (`New*`) for creation, carrying the entity's required fields
//!   as non-optional struct fields
//! - a patch (`*Patch`) for updates, where unset fields serialize to
//!   nothing so only the named columns are touched
//!
//! Every shape carries a flattened [`ExtraFields`] map so free-form columns
//! added on the backend survive a round trip without a schema change here.

pub mod booking;
pub mod guest;
pub mod payment;
pub mod room;

pub use booking::{Booking, BookingPatch, NewBooking};
pub use guest::{Guest, GuestPatch, NewGuest};
pub use payment::{NewPayment, Payment, PaymentPatch};
pub use room::{NewRoom, Room, RoomPatch};

/// Free-form extension point for columns this layer does not model
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;
