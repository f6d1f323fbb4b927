//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Error, kind::Kind};

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// Leading and trailing whitespace is removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    /// The key used to compare names: trimmed and lowercased.
    pub fn comparison_key(&self) -> String {
        normalize_name(&self.0)
    }
}

/// Trim and lowercase a category name for case-insensitive comparison.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category.
pub type CategoryId = i64;

/// A category for grouping transactions (e.g., 'Groceries', 'Salary').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name.
    pub name: CategoryName,
    /// Whether the category groups income or expenses.
    pub kind: Kind,
    /// The monthly spending limit, zero when no limit is set.
    pub budget: Decimal,
}

/// Request body for creating a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryForm {
    /// The category name.
    pub name: String,
    /// Whether the category groups income or expenses.
    pub kind: Kind,
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        category::{CategoryName, domain::normalize_name},
    };

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(CategoryName::new(""), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(CategoryName::new("\n\t \r"), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_trims_name() {
        assert_eq!(CategoryName::new("  Groceries ").unwrap().as_ref(), "Groceries");
    }

    #[test]
    fn comparison_ignores_case_and_whitespace() {
        assert_eq!(
            CategoryName::new_unchecked(" SALARY ").comparison_key(),
            normalize_name("salary")
        );
        assert_eq!(normalize_name("Saúde"), normalize_name("SAÚDE"));
    }
}
