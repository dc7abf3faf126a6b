//! Gender value object.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Closed set of gender values. `Unspecified` is the valid "unset" state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    SomethingElse,
    PreferNotToSay,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl Gender {
    /// Parse a gender, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        match raw.trim().to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "something_else" => Ok(Gender::SomethingElse),
            "prefer_not_to_say" => Ok(Gender::PreferNotToSay),
            "" => Ok(Gender::Unspecified),
            _ => Err(DomainError::validation("invalid gender")),
        }
    }

    /// Storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::SomethingElse => "something_else",
            Gender::PreferNotToSay => "prefer_not_to_say",
            Gender::Unspecified => "",
        }
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Gender::Unspecified)
    }

    /// Human-readable label; empty for `Unspecified`.
    pub fn display_name(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::SomethingElse => "Something else",
            Gender::PreferNotToSay => "Prefer not to say",
            Gender::Unspecified => "",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse(" Female ").unwrap(), Gender::Female);
        assert_eq!(Gender::parse("PREFER_NOT_TO_SAY").unwrap(), Gender::PreferNotToSay);
        assert_eq!(Gender::parse("").unwrap(), Gender::Unspecified);
        assert!(Gender::parse("robot").is_err());
    }

    #[test]
    fn test_gender_storage_form_round_trips() {
        for gender in [
            Gender::Male,
            Gender::Female,
            Gender::SomethingElse,
            Gender::PreferNotToSay,
            Gender::Unspecified,
        ] {
            assert_eq!(Gender::parse(gender.as_str()).unwrap(), gender);
        }
    }

    #[test]
    fn test_gender_serde_uses_storage_form() {
        let json = serde_json::to_string(&Gender::SomethingElse).unwrap();
        assert_eq!(json, "\"something_else\"");
        let unset: Gender = serde_json::from_str("\"\"").unwrap();
        assert!(unset.is_unspecified());
    }
}
