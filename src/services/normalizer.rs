//! Normalization of detail payloads into the canonical [`AnimeDetail`].
//!
//! Shape classification happens once, in [`classify`]. After that each output
//! field is resolved on its own: the first non-empty candidate in a fixed
//! order, primary-shape fields ahead of their fallback-shape counterparts.
//! A field value always comes from a single source field.

use crate::domain::AnimeId;
use crate::models::raw::{FallbackAnime, MAX_EPISODE_COUNT, PrimaryAnime, RawAnime, Title};
use crate::models::{AnimeDetail, Episode, EpisodeSource};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// A single episode tuple whose number token is not numeric.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Episode number is not numeric: {token:?}")]
pub struct EpisodeParseError {
    pub token: String,
}

/// Decides which upstream shape a payload is.
///
/// An object with a `title` or `coverImage` object is the primary shape; one
/// with a `name` or `image` string is the fallback shape.
pub fn classify(value: Value) -> Result<RawAnime, NormalizeError> {
    let Value::Object(map) = &value else {
        return Err(NormalizeError::InvalidInput(format!(
            "expected a JSON object, got {}",
            kind_of(&value)
        )));
    };

    let has_object = |key: &str| map.get(key).is_some_and(Value::is_object);
    let has_string = |key: &str| map.get(key).is_some_and(Value::is_string);

    if has_object("title") || has_object("coverImage") {
        let primary: PrimaryAnime = serde_json::from_value(value)
            .map_err(|e| NormalizeError::InvalidInput(e.to_string()))?;
        Ok(RawAnime::Primary(primary))
    } else if has_string("name") || has_string("image") {
        let fallback: FallbackAnime = serde_json::from_value(value)
            .map_err(|e| NormalizeError::InvalidInput(e.to_string()))?;
        Ok(RawAnime::Fallback(fallback))
    } else {
        Err(NormalizeError::InvalidInput(
            "payload has neither title/coverImage nor name/image".to_string(),
        ))
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Classifies and normalizes a raw JSON payload.
pub fn normalize_value(value: Value) -> Result<AnimeDetail, NormalizeError> {
    classify(value).map(|raw| normalize(&raw))
}

/// Builds the canonical view-model. Total over both shapes.
#[must_use]
pub fn normalize(raw: &RawAnime) -> AnimeDetail {
    match raw {
        RawAnime::Primary(a) => normalize_primary(a),
        RawAnime::Fallback(b) => normalize_fallback(b),
    }
}

fn normalize_primary(a: &PrimaryAnime) -> AnimeDetail {
    let title = a.title.as_ref();
    let cover = a.cover_image.as_ref();

    let display_title = first_present([
        title.and_then(|t| t.user_preferred.as_deref()),
        title.and_then(|t| t.romaji.as_deref()),
        title.and_then(|t| t.english.as_deref()),
        title.and_then(|t| t.native.as_deref()),
        a.name.as_deref(),
    ]);

    let cover_image = first_present([
        cover.and_then(|c| c.extra_large.as_deref()),
        cover.and_then(|c| c.large.as_deref()),
        a.image.as_deref(),
    ]);

    let hero_image = first_present([a.banner_image.as_deref(), Some(cover_image.as_str())]);

    let kind = present(a.kind.as_deref());
    let airing_label = match present(a.season.as_deref()) {
        Some(season) => {
            let year = a.season_year.map(|y| y.to_string());
            [Some(season), year.as_deref(), kind]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ")
        }
        None => kind.unwrap_or_default().to_string(),
    };

    AnimeDetail {
        id: a.id.clone().unwrap_or_default(),
        display_title,
        hero_image,
        cover_image,
        overview: first_present([a.description.as_deref(), a.plot_summary.as_deref()]),
        other_names: other_names(a.other_name.as_deref(), title),
        genre_list: genre_list(a.genres.as_deref(), a.genre.as_deref()),
        episode_count: a.episodes.as_ref().map_or(0, EpisodeSource::len),
        airing_label,
        score: a.average_score,
        episodes: a.episodes.clone(),
    }
}

fn normalize_fallback(b: &FallbackAnime) -> AnimeDetail {
    let image = first_present([b.image.as_deref()]);

    AnimeDetail {
        id: b.id.clone().unwrap_or_default(),
        display_title: first_present([b.name.as_deref()]),
        hero_image: first_present([b.banner_image.as_deref(), Some(image.as_str())]),
        cover_image: image,
        overview: first_present([b.description.as_deref(), b.plot_summary.as_deref()]),
        other_names: other_names(b.other_name.as_deref(), None),
        genre_list: genre_list(b.genres.as_deref(), b.genre.as_deref()),
        episode_count: b.episodes.as_ref().map_or(0, EpisodeSource::len),
        airing_label: present(b.kind.as_deref()).unwrap_or_default().to_string(),
        score: None,
        episodes: b.episodes.clone(),
    }
}

/// `other_name` as a single entry, else the english/native/romaji variants.
fn other_names(other_name: Option<&str>, title: Option<&Title>) -> Vec<String> {
    if let Some(name) = present(other_name) {
        return vec![name.to_string()];
    }

    title
        .map(|t| {
            [&t.english, &t.native, &t.romaji]
                .into_iter()
                .filter_map(|name| present(name.as_deref()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// The `genres` array when it has entries, else the comma-joined `genre`.
fn genre_list(genres: Option<&[String]>, genre: Option<&str>) -> Vec<String> {
    let listed: Vec<String> = genres
        .unwrap_or_default()
        .iter()
        .filter_map(|g| present(Some(g.as_str())))
        .map(str::to_string)
        .collect();
    if !listed.is_empty() {
        return listed;
    }

    genre
        .map(|joined| {
            joined
                .split(',')
                .filter_map(|g| present(Some(g)))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Trimmed value if it is non-empty.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn first_present<const N: usize>(candidates: [Option<&str>; N]) -> String {
    candidates
        .into_iter()
        .find_map(present)
        .unwrap_or_default()
        .to_string()
}

/// Reads the leading integer of an episode token, the way upstream pages
/// number episodes ("12", "12.5" and "12-end" all give 12).
///
/// Signed tokens such as "-1", tokens with no leading digit, and numbers past
/// `u32::MAX` are errors, so [`derive_episode_list`] skips those entries.
pub fn parse_episode_token(token: &str) -> Result<u32, EpisodeParseError> {
    let trimmed = token.trim_start();
    let digits = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed, |end| &trimmed[..end]);

    digits.parse().map_err(|_| EpisodeParseError {
        token: token.to_string(),
    })
}

/// Derives the episode list for an anime.
///
/// A count `N` yields episodes `1..=N`. A listed source yields one entry per
/// parseable token in upstream order; descriptors reuse the original token.
/// Unparseable tokens are skipped. Counts are capped at
/// [`MAX_EPISODE_COUNT`].
#[must_use]
pub fn derive_episode_list(identity: &AnimeId, source: &EpisodeSource) -> Vec<Episode> {
    match source {
        EpisodeSource::Count(count) => (1..=cap_count(identity, *count))
            .map(|episode_number| Episode {
                episode_number,
                episode_descriptor: format!("{identity}-episode-{episode_number}"),
            })
            .collect(),
        EpisodeSource::Listed(tokens) => tokens
            .iter()
            .filter_map(|token| match parse_episode_token(token) {
                Ok(episode_number) => Some(Episode {
                    episode_number,
                    episode_descriptor: format!("{identity}-episode-{token}"),
                }),
                Err(e) => {
                    warn!(anime_id = %identity, "Skipping episode entry: {e}");
                    None
                }
            })
            .collect(),
    }
}

fn cap_count(identity: &AnimeId, count: u32) -> u32 {
    if count > MAX_EPISODE_COUNT {
        warn!(anime_id = %identity, count, "Episode count over {MAX_EPISODE_COUNT}, truncating list");
        MAX_EPISODE_COUNT
    } else {
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shield_hero() -> Value {
        json!({
            "id": 1,
            "title": {
                "english": "The Rising of the Shield Hero",
                "native": "盾の勇者の成り上がり",
                "romaji": "Tate no Yuusha no Nariagari",
                "userPreferred": "Shield Hero"
            },
            "coverImage": { "extraLarge": "a.jpg", "large": "a-l.jpg", "color": "#e4a15d" },
            "bannerImage": "banner.jpg",
            "season": "WINTER",
            "seasonYear": 2019,
            "description": "Naofumi is summoned...",
            "type": "ANIME",
            "episodes": 25,
            "genres": ["Action", " Adventure ", ""],
            "averageScore": 78
        })
    }

    #[test]
    fn primary_shape_is_fully_resolved() {
        let detail = normalize_value(shield_hero()).unwrap();
        assert_eq!(detail.id, AnimeId::Numeric(1));
        assert_eq!(detail.display_title, "Shield Hero");
        assert_eq!(detail.hero_image, "banner.jpg");
        assert_eq!(detail.cover_image, "a.jpg");
        assert_eq!(detail.overview, "Naofumi is summoned...");
        assert_eq!(
            detail.other_names,
            vec![
                "The Rising of the Shield Hero",
                "盾の勇者の成り上がり",
                "Tate no Yuusha no Nariagari"
            ]
        );
        assert_eq!(detail.genre_list, vec!["Action", "Adventure"]);
        assert_eq!(detail.episode_count, 25);
        assert_eq!(detail.airing_label, "WINTER 2019 ANIME");
        assert_eq!(detail.score, Some(78));
    }

    #[test]
    fn minimal_primary_scenario() {
        let detail = normalize_value(json!({
            "id": 1,
            "title": { "userPreferred": "Shield Hero" },
            "episodes": 25,
            "coverImage": { "extraLarge": "a.jpg" }
        }))
        .unwrap();

        assert_eq!(detail.display_title, "Shield Hero");
        assert_eq!(detail.episode_count, 25);
        assert_eq!(detail.hero_image, "a.jpg");
        assert!(detail.genre_list.is_empty());
        assert!(detail.overview.is_empty());

        let episodes = derive_episode_list(&detail.id, detail.episodes.as_ref().unwrap());
        assert_eq!(episodes.len(), 25);
        assert_eq!(episodes[24].episode_descriptor, "1-episode-25");
    }

    #[test]
    fn fallback_scenario() {
        let detail = normalize_value(json!({
            "id": "x",
            "name": "Foo",
            "image": "b.jpg",
            "genre": " A , B "
        }))
        .unwrap();

        assert_eq!(detail.id, AnimeId::from("x"));
        assert_eq!(detail.display_title, "Foo");
        assert_eq!(detail.genre_list, vec!["A", "B"]);
        assert_eq!(detail.cover_image, "b.jpg");
        assert_eq!(detail.hero_image, "b.jpg");
        assert_eq!(detail.episode_count, 0);
    }

    #[test]
    fn fallback_genre_string_splits_on_commas() {
        let detail = normalize_value(json!({
            "name": "Bar",
            "genre": "Action, Comedy",
            "other_name": "  Baa  ",
            "plot_summary": "Things happen."
        }))
        .unwrap();

        assert_eq!(detail.genre_list, vec!["Action", "Comedy"]);
        assert_eq!(detail.other_names, vec!["Baa"]);
        assert_eq!(detail.overview, "Things happen.");
    }

    #[test]
    fn fallback_episode_tuples_count_every_entry() {
        let detail = normalize_value(json!({
            "id": "foo",
            "name": "Foo",
            "episodes": [["1", "u1"], ["2", "u2"], ["special", "u3"]]
        }))
        .unwrap();
        assert_eq!(detail.episode_count, 3);

        let episodes = derive_episode_list(&detail.id, detail.episodes.as_ref().unwrap());
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[1].episode_descriptor, "foo-episode-2");
    }

    #[test]
    fn empty_user_preferred_falls_through_to_romaji() {
        let detail = normalize_value(json!({
            "title": { "userPreferred": "  ", "romaji": "Mushishi" }
        }))
        .unwrap();
        assert_eq!(detail.display_title, "Mushishi");
    }

    #[test]
    fn missing_banner_uses_cover_as_hero() {
        let detail = normalize_value(json!({
            "coverImage": { "large": "l.jpg" },
            "bannerImage": null
        }))
        .unwrap();
        assert_eq!(detail.cover_image, "l.jpg");
        assert_eq!(detail.hero_image, "l.jpg");
        assert_eq!(detail.display_title, "");
    }

    #[test]
    fn airing_label_without_season_is_the_type() {
        let detail = normalize_value(json!({
            "title": { "userPreferred": "Movie" },
            "type": "MOVIE"
        }))
        .unwrap();
        assert_eq!(detail.airing_label, "MOVIE");
    }

    #[test]
    fn primary_shape_falls_back_per_field() {
        let detail = normalize_value(json!({
            "id": 1,
            "title": { "userPreferred": "X" },
            "genre": "Action, Comedy",
            "image": "b.jpg",
            "plot_summary": "Plot."
        }))
        .unwrap();
        assert_eq!(detail.display_title, "X");
        assert_eq!(detail.genre_list, vec!["Action", "Comedy"]);
        assert_eq!(detail.cover_image, "b.jpg");
        assert_eq!(detail.hero_image, "b.jpg");
        assert_eq!(detail.overview, "Plot.");
    }

    #[test]
    fn primary_fields_win_when_present() {
        let detail = normalize_value(json!({
            "title": { "userPreferred": "Primary", "english": "Primary EN" },
            "coverImage": { "extraLarge": "primary.jpg" },
            "description": "Primary plot.",
            "genres": ["Drama"],
            "name": "Fallback",
            "image": "fallback.jpg",
            "plot_summary": "Fallback plot.",
            "genre": "Action, Comedy"
        }))
        .unwrap();
        assert_eq!(detail.display_title, "Primary");
        assert_eq!(detail.cover_image, "primary.jpg");
        assert_eq!(detail.overview, "Primary plot.");
        assert_eq!(detail.genre_list, vec!["Drama"]);
        assert_eq!(detail.other_names, vec!["Primary EN"]);
    }

    #[test]
    fn other_name_replaces_title_variants() {
        let detail = normalize_value(json!({
            "title": { "userPreferred": "Y", "english": "Why", "romaji": "Wai" },
            "other_name": " Y-chan "
        }))
        .unwrap();
        assert_eq!(detail.other_names, vec!["Y-chan"]);
    }

    #[test]
    fn fallback_shape_prefers_primary_style_fields() {
        let detail = normalize_value(json!({
            "name": "Foo",
            "image": "b.jpg",
            "bannerImage": "wide.jpg",
            "description": "From description.",
            "plot_summary": "From summary.",
            "genres": ["Mecha"],
            "genre": "Action"
        }))
        .unwrap();
        assert_eq!(detail.hero_image, "wide.jpg");
        assert_eq!(detail.cover_image, "b.jpg");
        assert_eq!(detail.overview, "From description.");
        assert_eq!(detail.genre_list, vec!["Mecha"]);
    }

    #[test]
    fn empty_genres_array_uses_genre_string() {
        let detail = normalize_value(json!({
            "title": { "userPreferred": "Z" },
            "genres": [],
            "genre": "Action, Comedy"
        }))
        .unwrap();
        assert_eq!(detail.genre_list, vec!["Action", "Comedy"]);
    }

    #[test]
    fn rejects_payloads_matching_neither_shape() {
        for value in [json!(null), json!([1, 2]), json!("x"), json!({ "id": 3 })] {
            assert!(matches!(
                normalize_value(value),
                Err(NormalizeError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn classification_picks_the_shape_once() {
        assert!(matches!(
            classify(shield_hero()).unwrap(),
            RawAnime::Primary(_)
        ));
        assert!(matches!(
            classify(json!({ "name": "n" })).unwrap(),
            RawAnime::Fallback(_)
        ));
        // a title string is not the primary title object
        assert!(matches!(
            classify(json!({ "title": "t", "image": "i.jpg" })).unwrap(),
            RawAnime::Fallback(_)
        ));
    }

    #[test]
    fn normalize_is_deterministic() {
        let raw = classify(shield_hero()).unwrap();
        assert_eq!(normalize(&raw), normalize(&raw));
    }

    #[test]
    fn count_yields_contiguous_numbers() {
        for n in [0_u32, 1, 7, 120] {
            let episodes = derive_episode_list(&AnimeId::Numeric(9), &EpisodeSource::Count(n));
            assert_eq!(episodes.len(), n as usize);
            for (k, episode) in episodes.iter().enumerate() {
                assert_eq!(episode.episode_number as usize, k + 1);
            }
        }
    }

    #[test]
    fn huge_counts_stay_bounded() {
        let detail = normalize_value(json!({ "name": "n", "episodes": 4_294_967_296_u64 })).unwrap();
        assert_eq!(detail.episode_count, MAX_EPISODE_COUNT);

        let episodes = derive_episode_list(&AnimeId::from("n"), &EpisodeSource::Count(u32::MAX));
        assert_eq!(episodes.len(), MAX_EPISODE_COUNT as usize);
        assert_eq!(
            episodes.last().map(|e| e.episode_number),
            Some(MAX_EPISODE_COUNT)
        );
    }

    #[test]
    fn listed_tokens_keep_order_gaps_and_duplicates() {
        let source = EpisodeSource::Listed(
            ["3", "1", "1", "07", "x", "10"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        );
        let episodes = derive_episode_list(&AnimeId::from("naruto"), &source);

        let numbers: Vec<u32> = episodes.iter().map(|e| e.episode_number).collect();
        assert_eq!(numbers, vec![3, 1, 1, 7, 10]);
        assert_eq!(episodes[3].episode_descriptor, "naruto-episode-07");
    }

    #[test]
    fn episode_tokens_parse_leading_integer() {
        assert_eq!(parse_episode_token("12"), Ok(12));
        assert_eq!(parse_episode_token(" 12.5"), Ok(12));
        assert_eq!(parse_episode_token("12-end"), Ok(12));
        assert!(parse_episode_token("").is_err());
        assert!(parse_episode_token("ova").is_err());
        assert!(parse_episode_token("99999999999").is_err());
        assert_eq!(
            parse_episode_token("-1"),
            Err(EpisodeParseError {
                token: "-1".to_string()
            })
        );
    }
}
