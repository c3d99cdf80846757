//! Booking entity
//!
//! Bookings join one guest and one room for read: the read shape embeds a
//! [`GuestSummary`] and a [`RoomSummary`] alongside the booking's own
//! columns. The summaries are read-only reconstructions by the remote
//! store, never mirrored as owned foreign objects. Create and update
//! requests carry plain foreign keys.

use crate::core::entity::{Draft, Entity};
use crate::core::error::ValidationError;
use crate::entities::ExtraFields;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reservation as read from the `bookings` table, with embedded guest
/// and room summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub guest_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Joined guest record, present when the read shape requested it
    #[serde(rename = "guests", default, skip_serializing_if = "Option::is_none")]
    pub guest: Option<GuestSummary>,
    /// Joined room record, present when the read shape requested it
    #[serde(rename = "rooms", default, skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomSummary>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// The guest columns embedded in a booking read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// The room columns embedded in a booking read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: Uuid,
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub status: String,
    pub rate: Decimal,
}

/// Create request for a booking; carries foreign keys only
#[derive(Debug, Clone, Serialize)]
pub struct NewBooking {
    pub guest_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Update request for a booking; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Entity for Booking {
    type Draft = NewBooking;
    type Patch = BookingPatch;

    fn table() -> &'static str {
        "bookings"
    }

    fn entity_name() -> &'static str {
        "booking"
    }

    fn read_shape() -> Option<&'static str> {
        Some("*,guests(id,name,email,phone),rooms(id,number,type,status,rate)")
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Draft for NewBooking {
    fn validate(&self) -> Result<(), ValidationError> {
        // Foreign keys are typed; referential checks belong to the backend
        Ok(())
    }
}

/// Remote procedure checking whether a room is free for a stay
const CHECK_AVAILABILITY: &str = "check_room_availability";
/// Remote procedure pricing a stay
const CALCULATE_TOTAL: &str = "calculate_booking_total";

/// Booking-specific remote procedures.
///
/// Both delegate to server-side functions and never touch the mirror;
/// failures are classified and surfaced the same way mutation failures are.
impl crate::core::store::CollectionStore<Booking> {
    /// Whether the room is free between `check_in` and `check_out`
    pub async fn check_availability(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> crate::core::error::DataResult<bool> {
        let result = self
            .call_procedure(
                CHECK_AVAILABILITY,
                serde_json::json!({
                    "room_id": room_id,
                    "check_in_date": check_in,
                    "check_out_date": check_out,
                }),
            )
            .await?;
        serde_json::from_value(result).map_err(|e| {
            self.procedure_failure(
                CHECK_AVAILABILITY,
                crate::core::error::RemoteError::message(format!(
                    "invalid availability result: {}",
                    e
                ))
                .into(),
            )
        })
    }

    /// Total price for the stay, as computed by the backend
    pub async fn calculate_total(
        &self,
        room_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> crate::core::error::DataResult<Decimal> {
        let result = self
            .call_procedure(
                CALCULATE_TOTAL,
                serde_json::json!({
                    "room_id": room_id,
                    "check_in_date": check_in,
                    "check_out_date": check_out,
                }),
            )
            .await?;
        serde_json::from_value(result).map_err(|e| {
            self.procedure_failure(
                CALCULATE_TOTAL,
                crate::core::error::RemoteError::message(format!("invalid total result: {}", e))
                    .into(),
            )
        })
    }
}
