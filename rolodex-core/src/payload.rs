use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Result, RolodexError};

/// Parsed request body handed to the controller: string keys to JSON values.
///
/// A key holding `null` is treated as absent, so a partial update can
/// never clear a field by accident.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !value.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// String value of `key`. Non-string values are rejected.
    pub fn text(&self, key: &str) -> Result<Option<&str>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.as_str())),
            Some(_) => Err(RolodexError::BadRequest(format!(
                "{key} must be a string"
            ))),
        }
    }

    /// Like [`Payload::text`], but an empty string also counts as absent.
    pub fn non_empty_text(&self, key: &str) -> Result<Option<&str>> {
        Ok(self.text(key)?.filter(|text| !text.is_empty()))
    }

    pub fn required_text(&self, key: &str) -> Result<&str> {
        self.non_empty_text(key)?.ok_or_else(|| {
            RolodexError::BadRequest(format!("Missing required parameter {key}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> Payload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn null_counts_as_absent() {
        let payload = payload(json!({ "bio": null, "name": "n" }));
        assert!(!payload.contains("bio"));
        assert_eq!(payload.text("bio").unwrap(), None);
        assert_eq!(payload.text("name").unwrap(), Some("n"));
    }

    #[test]
    fn required_reports_missing_key() {
        let payload = payload(json!({ "email": "", "password": 3 }));
        assert_eq!(
            payload.required_text("email").unwrap_err().to_string(),
            "Missing required parameter email"
        );
        assert!(matches!(
            payload.required_text("password"),
            Err(RolodexError::BadRequest(_))
        ));
        assert_eq!(
            payload.required_text("role").unwrap_err().to_string(),
            "Missing required parameter role"
        );
    }
}
