use rolodex_model::Choice;

use crate::error::{Result, RolodexError};

/// Bidirectional mapping between external labels and storage keys.
///
/// Encoding scans the table in order and the first matching label wins.
/// Decoding treats the table like a key-indexed map, so when a key repeats
/// the later entry overrides the earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceCodec {
    name: &'static str,
    entries: Vec<(&'static str, &'static str)>,
}

impl ChoiceCodec {
    /// Codec over every member of a [`Choice`] set.
    pub fn of<C: Choice>() -> Self {
        Self {
            name: C::SET_NAME,
            entries: C::table(),
        }
    }

    /// Codec over an explicit `(key, label)` table.
    pub fn from_table(
        name: &'static str,
        entries: &[(&'static str, &'static str)],
    ) -> Self {
        Self {
            name,
            entries: entries.to_vec(),
        }
    }

    /// Label to storage key. `None` passes through.
    pub fn encode(&self, label: Option<&str>) -> Result<Option<&'static str>> {
        let Some(label) = label else {
            return Ok(None);
        };

        self.entries
            .iter()
            .find(|(_, candidate)| *candidate == label)
            .map(|(key, _)| Some(*key))
            .ok_or_else(|| {
                RolodexError::InvalidValue(format!(
                    "'{label}' is not a valid {}",
                    self.name
                ))
            })
    }

    /// Storage key to label. `None` passes through.
    pub fn decode(&self, key: Option<&str>) -> Result<Option<&'static str>> {
        let Some(key) = key else {
            return Ok(None);
        };

        self.entries
            .iter()
            .rev()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, label)| Some(*label))
            .ok_or_else(|| {
                RolodexError::UnknownKey(format!("{} key '{key}'", self.name))
            })
    }

    /// Decode straight into a typed member of `C`.
    pub fn decode_as<C: Choice>(&self, key: Option<&str>) -> Result<Option<C>> {
        match self.decode(key)? {
            None => Ok(None),
            Some(label) => C::from_label(label).map(Some).ok_or_else(|| {
                RolodexError::UnknownKey(format!(
                    "{} label '{label}'",
                    C::SET_NAME
                ))
            }),
        }
    }
}
