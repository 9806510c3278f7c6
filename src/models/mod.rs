pub mod detail;
pub mod raw;
pub mod recommendation;

pub use detail::{AnimeDetail, Episode};
pub use raw::{CoverImage, EpisodeSource, FallbackAnime, PrimaryAnime, RawAnime, Title};
pub use recommendation::Recommendation;
