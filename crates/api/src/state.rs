use std::sync::Arc;

use voyage_site_core::dates::TravelDateStore;
use voyage_site_core::search::SearchDataServerLoader;
use voyage_site_core::session::SessionRegistry;
use voyage_site_query::ContentQueryService;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    travel_dates: Arc<dyn TravelDateStore>,
    content: ContentQueryService,
    sessions: SessionRegistry,
}

impl AppState {
    pub fn new(travel_dates: Arc<dyn TravelDateStore>, content: ContentQueryService) -> Self {
        let sessions = SessionRegistry::new(content.clone());
        Self::with_sessions(travel_dates, content, sessions)
    }

    pub fn with_sessions(
        travel_dates: Arc<dyn TravelDateStore>,
        content: ContentQueryService,
        sessions: SessionRegistry,
    ) -> Self {
        Self {
            inner: Arc::new(InnerState {
                travel_dates,
                content,
                sessions,
            }),
        }
    }

    pub fn travel_dates(&self) -> &dyn TravelDateStore {
        self.inner.travel_dates.as_ref()
    }

    pub fn content(&self) -> &ContentQueryService {
        &self.inner.content
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.inner.sessions
    }

    /// A loader for one server render.
    pub fn search_loader(&self) -> SearchDataServerLoader {
        SearchDataServerLoader::new(self.inner.content.clone())
    }
}
