//! Room entity

use crate::core::entity::{Draft, Entity};
use crate::core::error::ValidationError;
use crate::entities::ExtraFields;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A hotel room as read from the `rooms` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub status: String,
    pub rate: Decimal,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Create request for a room
#[derive(Debug, Clone, Serialize)]
pub struct NewRoom {
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub status: String,
    pub rate: Decimal,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Update request for a room; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoomPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Entity for Room {
    type Draft = NewRoom;
    type Patch = RoomPatch;

    fn table() -> &'static str {
        "rooms"
    }

    fn entity_name() -> &'static str {
        "room"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Draft for NewRoom {
    fn validate(&self) -> Result<(), ValidationError> {
        // Room fields are opaque to this layer; nothing is required here
        Ok(())
    }
}
