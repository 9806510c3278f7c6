//! Detail page controller.
//!
//! The page has two independent data slots, the anime detail and its
//! recommendations. Each fetch is stamped with a [`Ticket`] holding the slot's
//! generation at issue time; a result is applied only while that generation is
//! still current, so a slow response for an old identity (or a superseded
//! retry) can never overwrite newer state.

use crate::clients::catalog::{CatalogApi, CatalogError};
use crate::domain::AnimeId;
use crate::models::{AnimeDetail, Episode, RawAnime, Recommendation};
use crate::services::normalizer::{derive_episode_list, normalize};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub message: String,
    pub retryable: bool,
}

impl From<&CatalogError> for LoadFailure {
    fn from(err: &CatalogError) -> Self {
        Self {
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum FetchState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(LoadFailure),
}

// written out so there is no `T: Default` bound; `DetailModel` has no default
impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> FetchState<T> {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn failure(&self) -> Option<&LoadFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Normalized detail together with its derived episode list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailModel {
    pub detail: AnimeDetail,
    pub episodes: Vec<Episode>,
}

impl DetailModel {
    /// Normalizes `raw` and derives episodes for the page identity.
    #[must_use]
    pub fn build(identity: &AnimeId, raw: &RawAnime) -> Self {
        let detail = normalize(raw);
        let episodes = detail
            .episodes
            .as_ref()
            .map(|source| derive_episode_list(identity, source))
            .unwrap_or_default();
        Self { detail, episodes }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Detail,
    Recommendations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub slot: Slot,
    pub generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailView {
    identity: Option<AnimeId>,
    #[serde(skip)]
    detail_generation: u64,
    #[serde(skip)]
    recommendations_generation: u64,
    detail: FetchState<DetailModel>,
    recommendations: FetchState<Vec<Recommendation>>,
}

impl DetailView {
    #[must_use]
    pub const fn identity(&self) -> Option<&AnimeId> {
        self.identity.as_ref()
    }

    #[must_use]
    pub const fn detail(&self) -> &FetchState<DetailModel> {
        &self.detail
    }

    #[must_use]
    pub const fn recommendations(&self) -> &FetchState<Vec<Recommendation>> {
        &self.recommendations
    }

    /// Switches the page to `id` and issues tickets for both slots.
    pub fn navigate(&mut self, id: AnimeId) -> (Ticket, Ticket) {
        self.identity = Some(id);
        let detail = self.begin_slot(Slot::Detail);
        let recommendations = self.begin_slot(Slot::Recommendations);
        (detail, recommendations)
    }

    /// Re-issues a single slot for the current identity.
    pub fn begin(&mut self, slot: Slot) -> Option<Ticket> {
        self.identity.as_ref()?;
        Some(self.begin_slot(slot))
    }

    fn begin_slot(&mut self, slot: Slot) -> Ticket {
        let generation = match slot {
            Slot::Detail => {
                self.detail_generation += 1;
                self.detail = FetchState::Loading;
                self.detail_generation
            }
            Slot::Recommendations => {
                self.recommendations_generation += 1;
                self.recommendations = FetchState::Loading;
                self.recommendations_generation
            }
        };
        Ticket { slot, generation }
    }

    #[must_use]
    pub const fn is_current(&self, ticket: Ticket) -> bool {
        match ticket.slot {
            Slot::Detail => ticket.generation == self.detail_generation,
            Slot::Recommendations => ticket.generation == self.recommendations_generation,
        }
    }

    /// Applies a detail result. Returns false if the ticket is stale.
    pub fn apply_detail(&mut self, ticket: Ticket, result: Result<RawAnime, CatalogError>) -> bool {
        if ticket.slot != Slot::Detail || !self.is_current(ticket) {
            return false;
        }
        let Some(identity) = self.identity.as_ref() else {
            return false;
        };

        self.detail = match result {
            Ok(raw) => FetchState::Ready(DetailModel::build(identity, &raw)),
            Err(e) => {
                warn!(anime_id = %identity, "Failed to load anime details: {e}");
                FetchState::Failed(LoadFailure::from(&e))
            }
        };
        true
    }

    /// Applies a recommendations result. Returns false if the ticket is stale.
    pub fn apply_recommendations(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Recommendation>, CatalogError>,
    ) -> bool {
        if ticket.slot != Slot::Recommendations || !self.is_current(ticket) {
            return false;
        }

        self.recommendations = match result {
            Ok(recommendations) => FetchState::Ready(recommendations),
            Err(e) => {
                warn!("Failed to load recommendations: {e}");
                FetchState::Failed(LoadFailure::from(&e))
            }
        };
        true
    }
}

/// Drives a [`DetailView`] from a [`CatalogApi`].
///
/// Cloning shares the same view, so several navigations may be in flight at
/// once; only the newest ones land.
pub struct DetailPage<C> {
    api: Arc<C>,
    view: Arc<RwLock<DetailView>>,
}

impl<C> Clone for DetailPage<C> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            view: Arc::clone(&self.view),
        }
    }
}

impl<C: CatalogApi> DetailPage<C> {
    pub fn new(api: C) -> Self {
        Self::with_shared_api(Arc::new(api))
    }

    pub fn with_shared_api(api: Arc<C>) -> Self {
        Self {
            api,
            view: Arc::new(RwLock::new(DetailView::default())),
        }
    }

    pub async fn snapshot(&self) -> DetailView {
        self.view.read().await.clone()
    }

    /// Navigates to `id` and loads both slots concurrently.
    pub async fn open(&self, id: AnimeId) {
        info!(anime_id = %id, "Opening anime details");
        let (detail, recommendations) = self.view.write().await.navigate(id.clone());

        tokio::join!(
            self.load_detail(detail, &id),
            self.load_recommendations(recommendations, &id)
        );
    }

    /// Reloads the detail slot. Returns false when no anime is open.
    pub async fn retry_detail(&self) -> bool {
        self.retry(Slot::Detail).await
    }

    /// Reloads the recommendations slot. Returns false when no anime is open.
    pub async fn retry_recommendations(&self) -> bool {
        self.retry(Slot::Recommendations).await
    }

    async fn retry(&self, slot: Slot) -> bool {
        let issued = {
            let mut view = self.view.write().await;
            let ticket = view.begin(slot);
            ticket.zip(view.identity().cloned())
        };
        let Some((ticket, id)) = issued else {
            return false;
        };

        debug!(anime_id = %id, ?slot, "Retrying");
        match slot {
            Slot::Detail => self.load_detail(ticket, &id).await,
            Slot::Recommendations => self.load_recommendations(ticket, &id).await,
        }
        true
    }

    async fn load_detail(&self, ticket: Ticket, id: &AnimeId) {
        let result = self.api.fetch_detail(id).await;
        if !self.view.write().await.apply_detail(ticket, result) {
            debug!(anime_id = %id, generation = ticket.generation, "Discarding stale detail result");
        }
    }

    async fn load_recommendations(&self, ticket: Ticket, id: &AnimeId) {
        let result = self.api.fetch_recommendations(id).await;
        if !self
            .view
            .write()
            .await
            .apply_recommendations(ticket, result)
        {
            debug!(anime_id = %id, generation = ticket.generation, "Discarding stale recommendations");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::raw::{FallbackAnime, PrimaryAnime, Title};
    use crate::models::EpisodeSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    fn primary(title: &str, episodes: u32) -> RawAnime {
        RawAnime::Primary(PrimaryAnime {
            title: Some(Title {
                user_preferred: Some(title.to_string()),
                ..Title::default()
            }),
            episodes: Some(EpisodeSource::Count(episodes)),
            ..PrimaryAnime::default()
        })
    }

    fn recommendation(title: &str) -> Recommendation {
        Recommendation {
            id: AnimeId::from(title),
            title: title.to_string(),
            cover_image: String::new(),
            average_score: None,
        }
    }

    fn timeout() -> CatalogError {
        CatalogError::Timeout {
            endpoint: "details",
        }
    }

    #[test]
    fn navigate_marks_both_slots_loading() {
        let mut view = DetailView::default();
        let (detail, recs) = view.navigate(AnimeId::Numeric(1));

        assert!(view.detail().is_loading());
        assert!(view.recommendations().is_loading());
        assert!(view.is_current(detail));
        assert!(view.is_current(recs));
        assert_eq!(view.identity(), Some(&AnimeId::Numeric(1)));
    }

    #[test]
    fn begin_requires_an_identity() {
        let mut view = DetailView::default();
        assert_eq!(view.begin(Slot::Detail), None);
        assert_eq!(view.detail(), &FetchState::Idle);
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let mut view = DetailView::default();
        let (old_detail, old_recs) = view.navigate(AnimeId::Numeric(1));
        let (new_detail, _) = view.navigate(AnimeId::Numeric(2));

        assert!(view.apply_detail(new_detail, Ok(primary("Two", 3))));
        assert!(!view.apply_detail(old_detail, Ok(primary("One", 12))));
        assert!(!view.apply_recommendations(old_recs, Ok(vec![recommendation("stale")])));

        let model = view.detail().ready().unwrap();
        assert_eq!(model.detail.display_title, "Two");
        assert_eq!(model.episodes.len(), 3);
        assert_eq!(model.episodes[0].episode_descriptor, "2-episode-1");
        assert!(view.recommendations().is_loading());
    }

    #[test]
    fn tickets_are_slot_specific() {
        let mut view = DetailView::default();
        let (detail, recs) = view.navigate(AnimeId::Numeric(1));
        assert!(!view.apply_detail(recs, Ok(primary("wrong slot", 1))));
        assert!(!view.apply_recommendations(detail, Ok(vec![])));
    }

    #[test]
    fn slots_fail_independently() {
        let mut view = DetailView::default();
        let (detail, recs) = view.navigate(AnimeId::from("x"));

        assert!(view.apply_detail(detail, Err(timeout())));
        assert!(view.apply_recommendations(recs, Ok(vec![recommendation("a")])));

        let failure = view.detail().failure().unwrap();
        assert!(failure.retryable);
        assert_eq!(view.recommendations().ready().map(Vec::len), Some(1));
    }

    #[test]
    fn retry_supersedes_an_in_flight_fetch() {
        let mut view = DetailView::default();
        let (first, _) = view.navigate(AnimeId::Numeric(5));
        let retry = view.begin(Slot::Detail).unwrap();

        assert!(!view.apply_detail(first, Ok(primary("old", 1))));
        assert!(view.apply_detail(retry, Ok(primary("new", 1))));
    }

    #[test]
    fn fresh_view_starts_idle() {
        let state: FetchState<DetailModel> = FetchState::default();
        assert_eq!(state, FetchState::Idle);

        let view = DetailView::default();
        assert_eq!(view.detail(), &FetchState::Idle);
        assert_eq!(view.recommendations(), &FetchState::Idle);
        assert!(view.identity().is_none());
    }

    #[test]
    fn episodes_use_the_page_identity() {
        let raw = RawAnime::Fallback(FallbackAnime {
            id: Some(AnimeId::from("payload-id")),
            name: Some("Foo".to_string()),
            episodes: Some(EpisodeSource::Listed(vec!["1".to_string(), "2".to_string()])),
            ..FallbackAnime::default()
        });
        let model = DetailModel::build(&AnimeId::from("page-id"), &raw);
        assert_eq!(model.episodes[1].episode_descriptor, "page-id-episode-2");
        assert_eq!(model.detail.id, AnimeId::from("payload-id"));
    }

    /// Detail for id 1 blocks until released; everything else answers at once.
    struct GatedApi {
        started: Semaphore,
        release: Semaphore,
    }

    #[async_trait::async_trait]
    impl CatalogApi for GatedApi {
        async fn fetch_detail(&self, id: &AnimeId) -> Result<RawAnime, CatalogError> {
            if *id == AnimeId::Numeric(1) {
                self.started.add_permits(1);
                let _permit = self.release.acquire().await.unwrap();
                return Ok(primary("One", 12));
            }
            Ok(primary("Two", 24))
        }

        async fn fetch_recommendations(
            &self,
            id: &AnimeId,
        ) -> Result<Vec<Recommendation>, CatalogError> {
            if *id == AnimeId::Numeric(1) {
                let _permit = self.release.acquire().await.unwrap();
                return Ok(vec![recommendation("for one")]);
            }
            Ok(vec![recommendation("for two")])
        }
    }

    #[tokio::test]
    async fn out_of_order_completion_keeps_newest_identity() {
        let page = DetailPage::new(GatedApi {
            started: Semaphore::new(0),
            release: Semaphore::new(0),
        });

        let first = tokio::spawn({
            let page = page.clone();
            async move { page.open(AnimeId::Numeric(1)).await }
        });

        page.api.started.acquire().await.unwrap().forget();
        page.open(AnimeId::Numeric(2)).await;

        page.api.release.add_permits(2);
        first.await.unwrap();

        let view = page.snapshot().await;
        assert_eq!(view.identity(), Some(&AnimeId::Numeric(2)));
        let model = view.detail().ready().unwrap();
        assert_eq!(model.detail.display_title, "Two");
        assert_eq!(model.episodes.len(), 24);
        assert_eq!(model.episodes[23].episode_descriptor, "2-episode-24");
        assert_eq!(view.recommendations().ready().unwrap()[0].title, "for two");
    }

    /// Fails detail calls until `failures` is exhausted.
    struct FlakyApi {
        failures: AtomicUsize,
        detail_calls: AtomicUsize,
        recommendation_calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CatalogApi for FlakyApi {
        async fn fetch_detail(&self, _id: &AnimeId) -> Result<RawAnime, CatalogError> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(timeout());
            }
            Ok(primary("Recovered", 2))
        }

        async fn fetch_recommendations(
            &self,
            _id: &AnimeId,
        ) -> Result<Vec<Recommendation>, CatalogError> {
            self.recommendation_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![recommendation("r")])
        }
    }

    #[tokio::test]
    async fn retry_reloads_only_the_failed_slot() {
        let page = DetailPage::new(FlakyApi {
            failures: AtomicUsize::new(1),
            detail_calls: AtomicUsize::new(0),
            recommendation_calls: AtomicUsize::new(0),
        });

        page.open(AnimeId::Numeric(7)).await;
        let view = page.snapshot().await;
        assert!(view.detail().failure().is_some());
        assert!(view.recommendations().ready().is_some());

        assert!(page.retry_detail().await);
        let view = page.snapshot().await;
        let model = view.detail().ready().unwrap();
        assert_eq!(model.detail.display_title, "Recovered");
        assert_eq!(model.episodes[1].episode_descriptor, "7-episode-2");

        assert_eq!(page.api.detail_calls.load(Ordering::SeqCst), 2);
        assert_eq!(page.api.recommendation_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_without_identity_does_nothing() {
        let page = DetailPage::new(FlakyApi {
            failures: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
            recommendation_calls: AtomicUsize::new(0),
        });
        assert!(!page.retry_recommendations().await);
        assert_eq!(page.api.recommendation_calls.load(Ordering::SeqCst), 0);
    }
}
