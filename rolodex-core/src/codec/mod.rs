//! Backend-aware value marshalling.
//!
//! Some domain values have no single portable storage representation: a
//! UUID is a native column type on PostgreSQL but a 32-character string
//! elsewhere, and enumerated choices are persisted as short keys while
//! callers see labels. The codecs here translate in both directions as pure
//! functions of `(value, backend)`.

mod backend;
mod choice;
mod uuid_codec;

pub use backend::{BackendCapabilities, BackendKind};
pub use choice::ChoiceCodec;
pub use uuid_codec::UuidCodec;

use rolodex_model::{Choice, Gender, Role};
use uuid::Uuid;

use crate::error::{Result, RolodexError};

/// Storage representation of a codec-managed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoredValue {
    Null,
    Uuid(Uuid),
    Text(String),
}

impl StoredValue {
    pub fn is_null(&self) -> bool {
        matches!(self, StoredValue::Null)
    }
}

/// Every codec the stores need, bound to one backend kind.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct ValueCodec {
    backend: BackendKind,
    uuid: UuidCodec,
    gender: ChoiceCodec,
    role: ChoiceCodec,
}

impl ValueCodec {
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            uuid: UuidCodec,
            gender: ChoiceCodec::of::<Gender>(),
            role: ChoiceCodec::of::<Role>(),
        }
    }

    pub fn encode_uuid(&self, value: Option<&str>) -> Result<StoredValue> {
        self.uuid.encode(value, self.backend)
    }

    pub fn decode_uuid(&self, stored: StoredValue) -> Result<Option<String>> {
        self.uuid.decode(stored, self.backend)
    }

    /// Encode a typed identifier; always succeeds past the parse step.
    pub fn encode_id(&self, id: Uuid) -> Result<StoredValue> {
        self.encode_uuid(Some(id.simple().to_string().as_str()))
    }

    /// Decode a stored identifier back into a typed [`Uuid`].
    pub fn decode_id(&self, stored: StoredValue) -> Result<Uuid> {
        let rendered = self.decode_uuid(stored)?.ok_or_else(|| {
            RolodexError::InvalidValue("identifier column is null".to_string())
        })?;
        Uuid::parse_str(&rendered).map_err(|err| {
            RolodexError::InvalidValue(format!(
                "'{rendered}' is not a valid UUID: {err}"
            ))
        })
    }

    pub fn encode_gender(
        &self,
        gender: Option<Gender>,
    ) -> Result<Option<&'static str>> {
        self.gender.encode(gender.map(Choice::label))
    }

    pub fn decode_gender(&self, key: Option<&str>) -> Result<Option<Gender>> {
        self.gender.decode_as::<Gender>(key)
    }

    pub fn encode_role(&self, role: Role) -> Result<&'static str> {
        self.role.encode(Some(role.label()))?.ok_or_else(|| {
            RolodexError::InvalidValue(format!("role '{role}' has no key"))
        })
    }

    pub fn decode_role(&self, key: &str) -> Result<Role> {
        self.role.decode_as::<Role>(Some(key))?.ok_or_else(|| {
            RolodexError::UnknownKey(format!("role key '{key}'"))
        })
    }
}
