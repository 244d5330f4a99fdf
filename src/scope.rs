//! Visibility scope lattice: none < own < team < all
//!
//! The lattice is a total order used only for max-selection when merging
//! permissions across roles. Unknown or missing scope strings collapse to
//! `None` so a typo in configuration can never widen visibility.

use serde::{Deserialize, Serialize};

/// Data-visibility scope attached to a module permission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ScopeLevel {
    /// No rows visible
    #[default]
    None = 0,
    /// Rows owned by the acting user
    Own = 1,
    /// Rows owned by the user or by the CSMs they manage (one level)
    Team = 2,
    /// Unrestricted
    All = 3,
}

impl From<Option<String>> for ScopeLevel {
    fn from(s: Option<String>) -> Self {
        s.as_deref().map(ScopeLevel::parse).unwrap_or_default()
    }
}

impl From<ScopeLevel> for String {
    fn from(s: ScopeLevel) -> Self {
        s.as_str().to_string()
    }
}

impl ScopeLevel {
    /// Rank in the lattice; used only for comparison
    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// The wider of two scopes; ties keep `self`
    #[inline]
    pub fn widest(self, other: ScopeLevel) -> ScopeLevel {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    /// Parse a configuration string; anything unrecognized maps to `None`
    pub fn parse(s: &str) -> ScopeLevel {
        match s {
            "own" => ScopeLevel::Own,
            "team" => ScopeLevel::Team,
            "all" => ScopeLevel::All,
            _ => ScopeLevel::None,
        }
    }

    /// Lowercase configuration name
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeLevel::None => "none",
            ScopeLevel::Own => "own",
            ScopeLevel::Team => "team",
            ScopeLevel::All => "all",
        }
    }
}
