use serde::{Deserialize, Serialize};

use crate::{choice::Choice, error::ModelError};

/// Gender recorded on a profile. Absent when the caller never supplied one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Choice for Gender {
    const SET_NAME: &'static str = "gender";
    const ALL: &'static [Self] = &[Gender::Male, Gender::Female, Gender::Other];

    fn key(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl Gender {
    /// Message listing the valid labels, e.g. `Gender must be one of ('male','female','other')`.
    pub fn constraint_message() -> String {
        let quoted = Self::labels()
            .into_iter()
            .map(|label| format!("'{label}'"))
            .collect::<Vec<_>>()
            .join(",");
        format!("Gender must be one of ({quoted})")
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Gender {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::from_label(s).ok_or_else(|| ModelError::UnknownLabel {
            set: Self::SET_NAME,
            label: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_message_lists_every_label() {
        assert_eq!(
            Gender::constraint_message(),
            "Gender must be one of ('male','female','other')"
        );
    }

    #[test]
    fn parses_labels_only() {
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert!("F".parse::<Gender>().is_err());
        assert!("unknown".parse::<Gender>().is_err());
    }

    #[test]
    fn serde_uses_labels() {
        let json = serde_json::to_string(&Gender::Other).unwrap();
        assert_eq!(json, "\"other\"");
    }
}
