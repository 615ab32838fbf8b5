use uuid::Uuid;

use super::{BackendKind, StoredValue};
use crate::error::{Result, RolodexError};

/// How a backend stores UUIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UuidStrategy {
    /// Native UUID column type.
    Native,
    /// 32 lowercase hex digits, no hyphens.
    Text,
}

impl UuidStrategy {
    fn for_backend(backend: BackendKind) -> Self {
        if backend.capabilities().native_uuid {
            UuidStrategy::Native
        } else {
            UuidStrategy::Text
        }
    }
}

/// Converts between the external UUID string form and the backend's
/// storage representation.
///
/// Externally a UUID is always rendered as 32 hex digits. Parsing accepts
/// anything [`Uuid::parse_str`] accepts (hyphenated, simple, braced, urn).
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCodec;

impl UuidCodec {
    /// Encode an external value for storage. `None` maps to
    /// [`StoredValue::Null`] without a parse attempt.
    pub fn encode(
        &self,
        value: Option<&str>,
        backend: BackendKind,
    ) -> Result<StoredValue> {
        let Some(raw) = value else {
            return Ok(StoredValue::Null);
        };

        let parsed = Uuid::parse_str(raw).map_err(|err| {
            RolodexError::InvalidValue(format!(
                "'{raw}' is not a valid UUID: {err}"
            ))
        })?;

        Ok(match UuidStrategy::for_backend(backend) {
            UuidStrategy::Native => StoredValue::Uuid(parsed),
            UuidStrategy::Text => {
                StoredValue::Text(parsed.simple().to_string())
            }
        })
    }

    /// Decode a stored value into its external form.
    ///
    /// On text backends the stored string is trusted: hyphens are stripped
    /// and nothing else is checked. A native backend handing back text is
    /// parsed strictly.
    pub fn decode(
        &self,
        stored: StoredValue,
        backend: BackendKind,
    ) -> Result<Option<String>> {
        match stored {
            StoredValue::Null => Ok(None),
            StoredValue::Uuid(uuid) => Ok(Some(uuid.simple().to_string())),
            StoredValue::Text(text) => match UuidStrategy::for_backend(backend)
            {
                UuidStrategy::Text => Ok(Some(text.replace('-', ""))),
                UuidStrategy::Native => {
                    let parsed = Uuid::parse_str(&text).map_err(|err| {
                        RolodexError::InvalidValue(format!(
                            "'{text}' is not a valid UUID: {err}"
                        ))
                    })?;
                    Ok(Some(parsed.simple().to_string()))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HYPHENATED: &str = "c2d29867-3d0b-d497-9191-18a9d8ee7830";
    const SIMPLE: &str = "c2d298673d0bd497919118a9d8ee7830";

    #[test]
    fn none_encodes_to_null_everywhere() {
        for backend in BackendKind::all() {
            assert_eq!(
                UuidCodec.encode(None, *backend).unwrap(),
                StoredValue::Null
            );
            assert_eq!(
                UuidCodec.decode(StoredValue::Null, *backend).unwrap(),
                None
            );
        }
    }

    #[test]
    fn native_backend_stores_uuid() {
        let stored = UuidCodec
            .encode(Some(HYPHENATED), BackendKind::Postgres)
            .unwrap();
        assert_eq!(
            stored,
            StoredValue::Uuid(Uuid::parse_str(HYPHENATED).unwrap())
        );
        assert_eq!(
            UuidCodec.decode(stored, BackendKind::Postgres).unwrap(),
            Some(SIMPLE.to_string())
        );
    }

    #[test]
    fn text_backends_store_simple_hex() {
        for backend in [BackendKind::MySql, BackendKind::Sqlite] {
            let stored = UuidCodec.encode(Some(HYPHENATED), backend).unwrap();
            assert_eq!(stored, StoredValue::Text(SIMPLE.to_string()));
            assert_eq!(
                UuidCodec.decode(stored, backend).unwrap(),
                Some(SIMPLE.to_string())
            );
        }
    }

    #[test]
    fn accepts_any_parseable_form() {
        let braced = format!("{{{HYPHENATED}}}");
        let stored = UuidCodec.encode(Some(&braced), BackendKind::Sqlite);
        assert_eq!(stored.unwrap(), StoredValue::Text(SIMPLE.to_string()));
    }

    #[test]
    fn rejects_malformed_input() {
        for backend in BackendKind::all() {
            assert!(matches!(
                UuidCodec.encode(Some("not-a-uuid"), *backend),
                Err(RolodexError::InvalidValue(_))
            ));
        }
    }

    #[test]
    fn text_decode_does_not_validate() {
        // Stored strings on text backends are only stripped of hyphens.
        let decoded = UuidCodec
            .decode(
                StoredValue::Text("zz-not-hex".to_string()),
                BackendKind::Sqlite,
            )
            .unwrap();
        assert_eq!(decoded, Some("zznothex".to_string()));

        assert!(
            UuidCodec
                .decode(
                    StoredValue::Text("zz-not-hex".to_string()),
                    BackendKind::Postgres,
                )
                .is_err()
        );
    }
}
