//! Domain primitives shared by the catalog client and the view-models.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Identity of an anime as the backend hands it out.
///
/// The primary metadata API uses integer ids while the fallback API uses
/// slugs, so both forms are accepted and carried through untouched.
///
/// # Examples
///
/// ```rust
/// use anikii::domain::AnimeId;
///
/// let id: AnimeId = "21".parse().unwrap();
/// assert_eq!(id, AnimeId::Numeric(21));
///
/// let slug: AnimeId = "tate-no-yuusha".parse().unwrap();
/// assert_eq!(slug.to_string(), "tate-no-yuusha");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnimeId {
    Numeric(i64),
    Text(String),
}

impl AnimeId {
    /// Returns true for an empty text identity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }
}

impl Default for AnimeId {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for AnimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for AnimeId {
    type Err = Infallible;

    /// Only canonical integers become `Numeric`, so `"007"` stays text and
    /// prints back exactly as it was given.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => Ok(Self::Numeric(n)),
            _ => Ok(Self::Text(s.to_string())),
        }
    }
}

impl From<i64> for AnimeId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for AnimeId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for AnimeId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}
