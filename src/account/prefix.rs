//! Command prefix sets.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix used by accounts that never configured their own.
pub const DEFAULT_PREFIX: &str = ".";

/// Errors produced when building a [`PrefixSet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefixError {
    #[error("At least one prefix is required")]
    EmptySet,

    #[error("Prefix at position {index} is empty")]
    EmptyPrefix { index: usize },
}

/// Ordered, non-empty list of command prefixes for one account.
///
/// Order is significant: when a message starts with several prefixes, the
/// earlier one is tried first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PrefixSet(Vec<String>);

impl PrefixSet {
    /// Builds a prefix set, rejecting an empty list or empty prefixes.
    pub fn new<I, S>(prefixes: I) -> Result<Self, PrefixError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();

        if prefixes.is_empty() {
            return Err(PrefixError::EmptySet);
        }

        if let Some(index) = prefixes.iter().position(String::is_empty) {
            return Err(PrefixError::EmptyPrefix { index });
        }

        Ok(Self(prefixes))
    }

    /// Returns the prefixes in priority order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns the highest-priority prefix.
    #[must_use]
    pub fn primary(&self) -> &str {
        // Non-empty by construction.
        self.0.first().map_or(DEFAULT_PREFIX, String::as_str)
    }

    /// Yields what remains of `text` after each prefix it starts with,
    /// in priority order.
    ///
    /// Prefixes are compared literally; no character is special.
    pub fn strip_all<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter_map(move |prefix| text.strip_prefix(prefix.as_str()))
    }
}

impl Default for PrefixSet {
    fn default() -> Self {
        Self(vec![DEFAULT_PREFIX.to_owned()])
    }
}

impl TryFrom<Vec<String>> for PrefixSet {
    type Error = PrefixError;

    fn try_from(prefixes: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(prefixes)
    }
}

impl From<PrefixSet> for Vec<String> {
    fn from(set: PrefixSet) -> Self {
        set.0
    }
}

impl fmt::Display for PrefixSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_dot() {
        let set = PrefixSet::default();
        assert_eq!(set.as_slice(), ["."]);
        assert_eq!(set.primary(), ".");
    }

    #[test]
    fn test_rejects_empty_set() {
        assert_eq!(PrefixSet::new(Vec::<String>::new()), Err(PrefixError::EmptySet));
    }

    #[test]
    fn test_rejects_empty_prefix() {
        assert_eq!(
            PrefixSet::new(["!", ""]),
            Err(PrefixError::EmptyPrefix { index: 1 })
        );
    }

    #[test]
    fn test_strip_all_keeps_order() {
        let set = PrefixSet::new([".", ".."]).unwrap();
        let stripped: Vec<&str> = set.strip_all("..ping").collect();
        assert_eq!(stripped, [".ping", "ping"]);
    }

    #[test]
    fn test_strip_all_is_literal() {
        let set = PrefixSet::new(["$^", "*"]).unwrap();
        assert_eq!(set.strip_all("$^ping").collect::<Vec<_>>(), ["ping"]);
        assert_eq!(set.strip_all("ping").count(), 0);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: PrefixSet = serde_json::from_str(r#"["!", "."]"#).unwrap();
        assert_eq!(ok.to_string(), "! .");
        assert!(serde_json::from_str::<PrefixSet>("[]").is_err());
    }
}
