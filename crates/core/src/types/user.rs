//! Anonymous per-device user identifier.
//!
//! The identifier is minted on the client the first time a device favourites
//! something and is then reused for the lifetime of that device. The server
//! never creates, stores or deletes users on its own; a user exists only as the
//! set of favourites carrying its identifier.

use core::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of random base-36 characters in a generated identifier.
const RANDOM_CHARS: usize = 9;

/// Errors that can occur when parsing an [`AnonymousUserId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnonymousUserIdError {
    /// The input is empty or whitespace.
    #[error("anonymous user id cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("anonymous user id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace or control characters.
    #[error("anonymous user id contains invalid characters")]
    InvalidCharacters,
}

/// A client-generated identifier standing in for an unauthenticated visitor.
///
/// ```
/// use vitrine_core::AnonymousUserId;
///
/// assert!(AnonymousUserId::parse("user_1718000000000_k3j9x0a2b").is_ok());
/// assert!(AnonymousUserId::parse("").is_err());
/// assert!(AnonymousUserId::parse("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnonymousUserId(String);

impl AnonymousUserId {
    /// Maximum accepted length.
    pub const MAX_LENGTH: usize = 128;

    /// Parse an identifier received from a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than
    /// [`Self::MAX_LENGTH`], or contains whitespace/control characters.
    pub fn parse(s: &str) -> Result<Self, AnonymousUserIdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AnonymousUserIdError::Empty);
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(AnonymousUserIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AnonymousUserIdError::InvalidCharacters);
        }
        Ok(Self(s.to_owned()))
    }

    /// Mint a new identifier of the form `user_<unix-millis>_<9 base-36 chars>`.
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..RANDOM_CHARS)
            .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
            .collect();
        Self(format!("user_{}_{suffix}", now.timestamp_millis()))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnonymousUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AnonymousUserId {
    type Error = AnonymousUserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AnonymousUserId> for String {
    fn from(id: AnonymousUserId) -> Self {
        id.0
    }
}

impl AsRef<str> for AnonymousUserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let id = AnonymousUserId::parse("  user_1_abc  ").unwrap();
        assert_eq!(id.as_str(), "user_1_abc");
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = "u".repeat(AnonymousUserId::MAX_LENGTH + 1);
        assert_eq!(
            AnonymousUserId::parse(&long),
            Err(AnonymousUserIdError::TooLong {
                max: AnonymousUserId::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_parse_rejects_control_characters() {
        assert_eq!(
            AnonymousUserId::parse("user\n1"),
            Err(AnonymousUserIdError::InvalidCharacters)
        );
    }

    #[test]
    fn test_generate_shape() {
        let now = DateTime::from_timestamp_millis(1_718_000_000_123).unwrap();
        let id = AnonymousUserId::generate(now);
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts.first(), Some(&"user"));
        assert_eq!(parts.get(1), Some(&"1718000000123"));
        let suffix = parts.get(2).unwrap();
        assert_eq!(suffix.len(), RANDOM_CHARS);
        assert!(
            suffix
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
        );
        assert!(AnonymousUserId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<AnonymousUserId>("\"\"").is_err());
        let id: AnonymousUserId = serde_json::from_str("\"user_1_x\"").unwrap();
        assert_eq!(id.as_str(), "user_1_x");
    }
}
