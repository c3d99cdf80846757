//! Payment entity
//!
//! Payments join their booking for read, and the booking summary in turn
//! carries partial guest and room columns. Status updates stamp
//! `updated_at` on the patch, matching the backend's audit expectations.

use crate::core::entity::{Draft, Entity};
use crate::core::error::ValidationError;
use crate::entities::ExtraFields;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A payment as read from the `payments` table, with its embedded booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Joined booking record, present when the read shape requested it
    #[serde(rename = "bookings", default, skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingSummary>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// The booking columns embedded in a payment read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(rename = "guests", default, skip_serializing_if = "Option::is_none")]
    pub guest: Option<GuestBrief>,
    #[serde(rename = "rooms", default, skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomBrief>,
}

/// Guest columns nested inside a payment's booking summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestBrief {
    pub name: String,
    pub email: String,
}

/// Room columns nested inside a payment's booking summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomBrief {
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: String,
}

/// Create request for a payment
#[derive(Debug, Clone, Serialize)]
pub struct NewPayment {
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Update request for a payment; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
pub struct PaymentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl PaymentPatch {
    /// A status change, stamped with the current time
    pub fn status_change(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            updated_at: Some(Utc::now()),
            extra: ExtraFields::new(),
        }
    }
}

impl Entity for Payment {
    type Draft = NewPayment;
    type Patch = PaymentPatch;

    fn table() -> &'static str {
        "payments"
    }

    fn entity_name() -> &'static str {
        "payment"
    }

    fn read_shape() -> Option<&'static str> {
        Some("*,bookings(id,check_in,check_out,total_amount,guests(name,email),rooms(number,type))")
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Draft for NewPayment {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
