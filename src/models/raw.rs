//! Upstream payload shapes returned by `/api/details`.
//!
//! The backend answers either with the primary metadata shape (`AniList`
//! style, camelCase, nested title/cover objects) or with the fallback scraper
//! shape (flat snake_case fields). Optional fields are read leniently: a field
//! with an unexpected type is treated as absent instead of failing the payload.

use crate::domain::AnimeId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Deserializes any JSON value and keeps it only if it fits `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keeps the string members of an array, dropping nulls and other junk.
fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    #[serde(default, deserialize_with = "lenient")]
    pub english: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub native: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub romaji: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub user_preferred: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    #[serde(default, deserialize_with = "lenient")]
    pub extra_large: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub large: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub color: Option<String>,
}

/// Upper bound on an episode count taken from upstream. Longer counts are
/// clamped so a bogus payload cannot make the episode list unbounded.
pub const MAX_EPISODE_COUNT: u32 = 10_000;

/// Episode data as delivered upstream: a plain count, or one tuple per
/// episode whose first element is the episode number token.
///
/// Tuple entries are reduced to that first token. Numeric tokens keep their
/// JSON text; entries without a usable token become an empty token, which
/// the episode list later skips as unparseable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EpisodeSource {
    Count(u32),
    Listed(Vec<String>),
}

impl EpisodeSource {
    /// A count, clamped to [`MAX_EPISODE_COUNT`].
    #[must_use]
    pub fn count(count: u64) -> Self {
        match u32::try_from(count) {
            Ok(n) if n <= MAX_EPISODE_COUNT => Self::Count(n),
            _ => {
                warn!(count, max = MAX_EPISODE_COUNT, "Clamping implausible episode count");
                Self::Count(MAX_EPISODE_COUNT)
            }
        }
    }

    /// Number of episodes the upstream claims, including malformed entries.
    #[must_use]
    pub fn len(&self) -> u32 {
        match self {
            Self::Count(n) => *n,
            Self::Listed(tokens) => u32::try_from(tokens.len()).unwrap_or(u32::MAX),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(count) = n.as_u64() {
                    Some(Self::count(count))
                } else if n.as_i64().is_some() {
                    // negative counts carry no episodes
                    Some(Self::Count(0))
                } else {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let count = n.as_f64().map(|f| f.max(0.0) as u64);
                    count.map(Self::count)
                }
            }
            Value::String(s) => s.trim().parse().ok().map(Self::count),
            Value::Array(entries) => Some(Self::Listed(
                entries.into_iter().map(episode_token).collect(),
            )),
            _ => None,
        }
    }
}

fn episode_token(entry: Value) -> String {
    let first = match entry {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        Value::Array(_) => return String::new(),
        other => other,
    };

    match first {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

impl<'de> Deserialize<'de> for EpisodeSource {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value)
            .ok_or_else(|| serde::de::Error::custom("expected an episode count or episode list"))
    }
}

/// Primary upstream shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryAnime {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<AnimeId>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<Title>,
    #[serde(default, deserialize_with = "lenient")]
    pub cover_image: Option<CoverImage>,
    #[serde(default, deserialize_with = "lenient")]
    pub banner_image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub season: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub season_year: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub average_score: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub episodes: Option<EpisodeSource>,
    #[serde(default, deserialize_with = "string_list")]
    pub genres: Option<Vec<String>>,

    // fallback-shape fields, used only where the primary field is missing
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(rename = "plot_summary", default, deserialize_with = "lenient")]
    pub plot_summary: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub genre: Option<String>,
    #[serde(rename = "other_name", default, deserialize_with = "lenient")]
    pub other_name: Option<String>,
}

/// Fallback upstream shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FallbackAnime {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<AnimeId>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub plot_summary: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub other_name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub released: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub episodes: Option<EpisodeSource>,

    // primary-shape fields a scraper payload may still carry
    #[serde(default, deserialize_with = "string_list")]
    pub genres: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(rename = "bannerImage", default, deserialize_with = "lenient")]
    pub banner_image: Option<String>,
}

/// A detail payload after shape classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawAnime {
    Primary(PrimaryAnime),
    Fallback(FallbackAnime),
}

impl RawAnime {
    #[must_use]
    pub const fn id(&self) -> Option<&AnimeId> {
        match self {
            Self::Primary(a) => a.id.as_ref(),
            Self::Fallback(b) => b.id.as_ref(),
        }
    }

    /// Fills in the identity when the payload did not carry one.
    #[must_use]
    pub fn with_fallback_id(mut self, id: &AnimeId) -> Self {
        let slot = match &mut self {
            Self::Primary(a) => &mut a.id,
            Self::Fallback(b) => &mut b.id,
        };
        if slot.is_none() {
            *slot = Some(id.clone());
        }
        self
    }

    #[must_use]
    pub const fn episodes(&self) -> Option<&EpisodeSource> {
        match self {
            Self::Primary(a) => a.episodes.as_ref(),
            Self::Fallback(b) => b.episodes.as_ref(),
        }
    }
}
