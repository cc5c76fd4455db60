//! Category filtering for item listings.

/// Reserved category value meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

/// A listing filter derived from the optional `category` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every item, regardless of category.
    #[default]
    All,
    /// Only items whose category equals the value exactly.
    Only(String),
}

impl CategoryFilter {
    /// Interpret a raw query value.
    ///
    /// Absent, blank and `"all"` all mean [`CategoryFilter::All`].
    #[must_use]
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("" | ALL_CATEGORIES) => Self::All,
            Some(category) => Self::Only(category.to_owned()),
        }
    }

    /// The category to match, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Only(category) => Some(category),
        }
    }

    /// Whether an item in `category` passes the filter.
    #[must_use]
    pub fn matches(&self, category: &str) -> bool {
        self.category().is_none_or(|wanted| wanted == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_and_absent_are_unfiltered() {
        assert_eq!(CategoryFilter::from_query(None), CategoryFilter::All);
        assert_eq!(CategoryFilter::from_query(Some("all")), CategoryFilter::All);
        assert_eq!(CategoryFilter::from_query(Some("  ")), CategoryFilter::All);
    }

    #[test]
    fn test_named_category() {
        let filter = CategoryFilter::from_query(Some("mugs"));
        assert_eq!(filter.category(), Some("mugs"));
        assert!(filter.matches("mugs"));
        assert!(!filter.matches("plates"));
    }

    #[test]
    fn test_all_matches_everything() {
        assert!(CategoryFilter::All.matches("anything"));
    }
}
