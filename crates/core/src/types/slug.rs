//! URL-safe item slugs.
//!
//! A slug is the lower-cased name with every run of non-alphanumeric
//! characters collapsed to one hyphen, followed by a hyphen and a 6-character
//! hex token drawn from the thread-local CSPRNG:
//!
//! ```text
//! "Blue Ceramic Mug!"  ->  "blue-ceramic-mug-3f9a0c"
//! "!!!"                ->  "-3f9a0c"
//! ```
//!
//! The token makes collisions rare but not impossible, so callers must check
//! the candidate against the store and draw again on a hit. See
//! `CatalogService::create` in the server crate.

use core::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Number of random bytes in the suffix (hex-encoded to twice as many chars).
pub const TOKEN_BYTES: usize = 3;

/// A URL-safe item identifier derived from its display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a candidate slug for `name` using the thread-local RNG.
    #[must_use]
    pub fn generate(name: &str) -> Self {
        Self::generate_with(name, &mut rand::rng())
    }

    /// Derive a candidate slug for `name` using the given RNG.
    #[must_use]
    pub fn generate_with<R: RngCore + ?Sized>(name: &str, rng: &mut R) -> Self {
        let mut token = [0u8; TOKEN_BYTES];
        rng.fill_bytes(&mut token);
        Self(format!("{}-{}", base(name), hex::encode(token)))
    }

    /// Wrap a slug read back from storage or a URL path.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The deterministic part of a slug: `[a-z0-9]+` runs joined by single hyphens.
///
/// Anything outside ASCII `a-z0-9` after lower-casing counts as a separator,
/// so `"Café au lait"` becomes `"caf-au-lait"`.
#[must_use]
pub fn base(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_base_collapses_separators() {
        assert_eq!(base("Blue Ceramic  Mug!"), "blue-ceramic-mug");
        assert_eq!(base("  --Hello__World--  "), "hello-world");
        assert_eq!(base("A/B\\C"), "a-b-c");
    }

    #[test]
    fn test_base_of_symbols_is_empty() {
        assert_eq!(base(""), "");
        assert_eq!(base("!!! ???"), "");
    }

    #[test]
    fn test_base_drops_non_ascii_letters() {
        assert_eq!(base("Café au lait"), "caf-au-lait");
        assert_eq!(base("ÄÖÜ 42"), "42");
    }

    #[test]
    fn test_generate_appends_hex_token() {
        let slug = Slug::generate("Blue Mug");
        let (prefix, token) = slug.as_str().rsplit_once('-').unwrap_or_default();
        assert_eq!(prefix, "blue-mug");
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_symbol_only_name_yields_bare_token() {
        let slug = Slug::generate("***");
        assert!(slug.as_str().starts_with('-'));
        assert_eq!(slug.as_str().len(), 1 + TOKEN_BYTES * 2);
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let a = Slug::generate_with("mug", &mut StdRng::seed_from_u64(7));
        let b = Slug::generate_with("mug", &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_tokens_vary() {
        let slugs: HashSet<Slug> = (0..32).map(|_| Slug::generate("mug")).collect();
        assert!(slugs.len() > 1);
    }
}
