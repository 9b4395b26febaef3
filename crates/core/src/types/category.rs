//! Product categories and the category selector used when filtering.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string names no known category.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct CategoryParseError(pub String);

/// The category a product is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Development,
    Design,
    #[serde(rename = "AI")]
    Ai,
    Tools,
}

impl Category {
    /// Every category, in selector order.
    pub const ALL: [Self; 4] = [Self::Development, Self::Design, Self::Ai, Self::Tools];

    /// Display label, as stored in catalog data.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Development => "Development",
            Self::Design => "Design",
            Self::Ai => "AI",
            Self::Tools => "Tools",
        }
    }

    /// Lowercase key used by category selectors.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Design => "design",
            Self::Ai => "ai",
            Self::Tools => "tools",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    /// Case-insensitive match against the category label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.key() == lower)
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

/// Category selector for catalog filtering.
///
/// `all` matches every product; anything else must name a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Selector key used for the "match everything" entry.
    pub const ALL_KEY: &'static str = "all";

    /// Whether a product in `category` passes this selector.
    #[must_use]
    pub fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }

    /// Selector entries in display order, starting with `all`.
    #[must_use]
    pub fn options() -> Vec<Self> {
        core::iter::once(Self::All)
            .chain(Category::ALL.into_iter().map(Self::Only))
            .collect()
    }

    /// Lowercase selector key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::All => Self::ALL_KEY,
            Self::Only(category) => category.key(),
        }
    }

    /// Button label: the key with its first letter uppercased.
    #[must_use]
    pub fn label(self) -> String {
        let key = self.key();
        let mut chars = key.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}

impl FromStr for CategoryFilter {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(Self::ALL_KEY) {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}
