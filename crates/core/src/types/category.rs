//! Product categories.
//!
//! Categories are an open set: sellers pick from a suggested list but the
//! store accepts any string.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A product category label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Search-form sentinel meaning "no category filter".
    pub const ALL: &'static str = "Все категории";

    /// Categories offered when listing a product.
    pub const SUGGESTED: &'static [&'static str] =
        &["Запчасти", "Телефоны", "Планшеты", "Ноутбуки", "Аксессуары"];

    /// Create a category label. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn new(label: &str) -> Self {
        Self(label.trim().to_owned())
    }

    /// Interpret a search-form selection: blank input and the
    /// "all categories" sentinel mean no filter.
    #[must_use]
    pub fn from_selection(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() || label == Self::ALL {
            None
        } else {
            Some(Self::new(label))
        }
    }

    /// The category label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the label is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Self::new(&label)
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_categories_sentinel_means_no_filter() {
        assert_eq!(Category::from_selection("Все категории"), None);
        assert_eq!(Category::from_selection("  "), None);
        assert_eq!(
            Category::from_selection(" Телефоны "),
            Some(Category::new("Телефоны"))
        );
    }
}
