use crate::domain::AnimeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
struct RecommendationTitle {
    #[serde(rename = "userPreferred", default)]
    user_preferred: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RecommendationCover {
    #[serde(default)]
    large: Option<String>,
}

/// Wire form of one `/api/recommendations` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecommendation {
    id: AnimeId,
    #[serde(default)]
    title: Option<RecommendationTitle>,
    #[serde(default)]
    cover_image: Option<RecommendationCover>,
    #[serde(default)]
    average_score: Option<f64>,
}

/// Card shown under "You may like".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub id: AnimeId,
    pub title: String,
    pub cover_image: String,
    pub average_score: Option<f64>,
}

impl From<RawRecommendation> for Recommendation {
    fn from(raw: RawRecommendation) -> Self {
        Self {
            id: raw.id,
            title: raw.title.and_then(|t| t.user_preferred).unwrap_or_default(),
            cover_image: raw.cover_image.and_then(|c| c.large).unwrap_or_default(),
            average_score: raw.average_score,
        }
    }
}
