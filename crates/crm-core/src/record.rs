//! Record types returned by the remote store.

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use std::fmt;
use std::hash::Hash;

use crate::kind::{KindDescriptor, BOOKINGS, CONSULTATIONS};
use crate::timestamp::parse_instant;

/// Opaque record identifier assigned by the remote store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    /// Check if the identifier is empty (record arrived without `_id`).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Record attributes addressable by the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Contact,
    Place,
    Email,
    Duration,
    PackageBooked,
    CreatedAt,
}

impl Field {
    /// JSON attribute name on the wire.
    pub fn json_name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Contact => "contact",
            Field::Place => "place",
            Field::Email => "email",
            Field::Duration => "duration",
            Field::PackageBooked => "packageBooked",
            Field::CreatedAt => "createdAt",
        }
    }
}

/// A record the console can list, search, sort, and delete.
///
/// Every attribute is optional. Implementations return `None` for fields
/// their schema does not define, so the engine treats them as absent.
pub trait Record: Clone + fmt::Debug + DeserializeOwned + Send + Sync + 'static {
    /// Descriptor for this record kind.
    fn descriptor() -> &'static KindDescriptor;

    /// Store-assigned identifier.
    fn id(&self) -> &RecordId;

    /// Raw text of an attribute, if present.
    fn field(&self, field: Field) -> Option<&str>;

    /// `createdAt` as an instant. Absent or unparseable yields `None`.
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.field(Field::CreatedAt).and_then(parse_instant)
    }
}

/// A consultation request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRecord {
    #[serde(rename = "_id", default)]
    pub id: RecordId,

    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub contact: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub place: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub duration: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
}

impl Record for ConsultationRecord {
    fn descriptor() -> &'static KindDescriptor {
        &CONSULTATIONS
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Contact => self.contact.as_deref(),
            Field::Place => self.place.as_deref(),
            Field::Duration => self.duration.as_deref(),
            Field::CreatedAt => self.created_at.as_deref(),
            Field::Email | Field::PackageBooked => None,
        }
    }
}

/// A package booking.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    #[serde(rename = "_id", default)]
    pub id: RecordId,

    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub contact: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub place: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub duration: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub package_booked: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
}

impl Record for BookingRecord {
    fn descriptor() -> &'static KindDescriptor {
        &BOOKINGS
    }

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Contact => self.contact.as_deref(),
            Field::Place => self.place.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::Duration => self.duration.as_deref(),
            Field::PackageBooked => self.package_booked.as_deref(),
            Field::CreatedAt => self.created_at.as_deref(),
        }
    }
}

/// Accept strings, numbers, and booleans as text; anything else is absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}
