pub mod detail_page;
pub mod normalizer;

pub use detail_page::{DetailModel, DetailPage, DetailView, FetchState, LoadFailure};
pub use normalizer::{
    EpisodeParseError, NormalizeError, classify, derive_episode_list, normalize, normalize_value,
};
