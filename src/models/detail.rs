use crate::domain::AnimeId;
use crate::models::raw::EpisodeSource;
use serde::Serialize;

/// Canonical view-model the detail page renders from, whichever upstream
/// shape supplied the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimeDetail {
    pub id: AnimeId,
    pub display_title: String,
    pub hero_image: String,
    pub cover_image: String,
    pub overview: String,
    pub other_names: Vec<String>,
    pub genre_list: Vec<String>,
    pub episode_count: u32,
    /// "{season} {year} {type}" when the season is known, else just the type.
    pub airing_label: String,
    pub score: Option<u32>,
    #[serde(skip)]
    pub episodes: Option<EpisodeSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Episode {
    pub episode_number: u32,
    pub episode_descriptor: String,
}
