//! Guest entity
//!
//! The only entity with required-field validation: creation demands a
//! non-empty `name` and `email`, checked before any network call. Guest
//! creation also runs the pre-flight connectivity probe, so a dead backend
//! surfaces as a connection problem rather than a cryptic insert failure.

use crate::core::entity::{Draft, Entity};
use crate::core::error::ValidationError;
use crate::core::validation::non_empty;
use crate::entities::ExtraFields;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered guest as read from the `guests` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Create request for a guest; `name` and `email` are required
#[derive(Debug, Clone, Serialize)]
pub struct NewGuest {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl NewGuest {
    /// Convenience constructor for the two required fields
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            document: None,
            extra: ExtraFields::new(),
        }
    }
}

/// Update request for a guest; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
pub struct GuestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Entity for Guest {
    type Draft = NewGuest;
    type Patch = GuestPatch;

    const PREFLIGHT: bool = true;

    fn table() -> &'static str {
        "guests"
    }

    fn entity_name() -> &'static str {
        "guest"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Draft for NewGuest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("name", &self.name)?;
        non_empty("email", &self.email)
    }
}
