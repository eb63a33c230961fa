//! Column scopes: which columns a rule applies to.

use crate::types::DatasetProfile;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single column name or glob pattern.
///
/// `*` matches any run of characters, so `*` alone selects every column and
/// `*_rate` selects every column ending in `_rate`. Anything without a `*`
/// is an exact column name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnPattern {
    raw: String,
    glob: Option<Regex>,
}

impl ColumnPattern {
    pub fn new(pattern: impl Into<String>) -> Result<Self, regex::Error> {
        let raw = pattern.into();
        let glob = if raw.contains('*') {
            let body = raw
                .split('*')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(".*");
            Some(Regex::new(&format!("^{}$", body))?)
        } else {
            None
        };
        Ok(Self { raw, glob })
    }

    /// Pattern matching every column.
    pub fn any() -> Self {
        Self {
            raw: "*".to_string(),
            glob: None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_wildcard(&self) -> bool {
        self.raw.contains('*')
    }

    pub fn matches(&self, column: &str) -> bool {
        if self.raw == "*" {
            return true;
        }
        match &self.glob {
            Some(glob) => glob.is_match(column),
            None => self.raw == column,
        }
    }
}

impl PartialEq for ColumnPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl TryFrom<String> for ColumnPattern {
    type Error = regex::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ColumnPattern> for String {
    fn from(pattern: ColumnPattern) -> Self {
        pattern.raw
    }
}

impl fmt::Display for ColumnPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// The set of columns a rule applies to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnScope(Vec<ColumnPattern>);

impl ColumnScope {
    /// Scope covering every column.
    pub fn all() -> Self {
        Self(vec![ColumnPattern::any()])
    }

    /// Scope from names or glob patterns.
    pub fn of<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        patterns
            .into_iter()
            .map(ColumnPattern::new)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn patterns(&self) -> &[ColumnPattern] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, column: &str) -> bool {
        self.0.iter().any(|pattern| pattern.matches(column))
    }

    /// Exact column names in the scope that the profile does not contain.
    pub fn unmatched_names<'a>(&'a self, profile: &DatasetProfile) -> Vec<&'a str> {
        self.0
            .iter()
            .filter(|pattern| !pattern.is_wildcard())
            .map(ColumnPattern::as_str)
            .filter(|name| profile.column(name).is_none())
            .collect()
    }
}
