//! Provider place identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PlaceId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaceIdError {
    /// The input string is empty.
    #[error("place id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("place id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the allowed set.
    #[error("place id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// An opaque place identifier issued by the places provider.
///
/// Place IDs are interpolated into provider URL paths, so the accepted
/// alphabet is restricted to characters that never need escaping.
///
/// ## Constraints
///
/// - Length: 1-256 characters
/// - ASCII letters, digits, `-` and `_` only
///
/// ## Examples
///
/// ```
/// use ristretto_core::PlaceId;
///
/// assert!(PlaceId::parse("ChIJN1t_tDeuEmsRUsoyG83frY4").is_ok());
/// assert!(PlaceId::parse("mock_1").is_ok());
///
/// assert!(PlaceId::parse("").is_err());
/// assert!(PlaceId::parse("../admin").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PlaceId(String);

impl PlaceId {
    /// Maximum length of a place ID.
    pub const MAX_LENGTH: usize = 256;

    /// Parse a `PlaceId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 256 characters,
    /// or contains anything other than ASCII alphanumerics, `-` or `_`.
    pub fn parse(s: &str) -> Result<Self, PlaceIdError> {
        if s.is_empty() {
            return Err(PlaceIdError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(PlaceIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(PlaceIdError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the place ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PlaceId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PlaceId {
    type Err = PlaceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PlaceId {
    type Error = PlaceIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PlaceId> for String {
    fn from(id: PlaceId) -> Self {
        id.0
    }
}

impl AsRef<str> for PlaceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_ids() {
        assert!(PlaceId::parse("ChIJN1t_tDeuEmsRUsoyG83frY4").is_ok());
        assert!(PlaceId::parse("abc").is_ok());
        assert!(PlaceId::parse("mock-1").is_ok());
        assert!(PlaceId::parse(&"a".repeat(PlaceId::MAX_LENGTH)).is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(PlaceId::parse(""), Err(PlaceIdError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(PlaceId::MAX_LENGTH + 1);
        assert!(matches!(
            PlaceId::parse(&long),
            Err(PlaceIdError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_path_characters() {
        assert_eq!(
            PlaceId::parse("places/abc"),
            Err(PlaceIdError::InvalidCharacter('/'))
        );
        assert_eq!(
            PlaceId::parse("abc?key=1"),
            Err(PlaceIdError::InvalidCharacter('?'))
        );
        assert_eq!(
            PlaceId::parse("caf\u{e9}"),
            Err(PlaceIdError::InvalidCharacter('\u{e9}'))
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let id: PlaceId = serde_json::from_str("\"p1\"").unwrap();
        assert_eq!(id.as_str(), "p1");

        assert!(serde_json::from_str::<PlaceId>("\"\"").is_err());
        assert!(serde_json::from_str::<PlaceId>("\"a b\"").is_err());
    }

    #[test]
    fn test_display() {
        let id = PlaceId::parse("p1").unwrap();
        assert_eq!(id.to_string(), "p1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p1\"");
    }
}
