use serde::{Serialize, Serializer};
use serde_json::Value;
use voyage_site_query::{ContentQueryService, QueryError};

use super::queries;

pub const DESTINATIONS_KEY: &str = "destinations-in-search";
pub const REGIONS_KEY: &str = "regions";
pub const SEARCH_FIELD_CONTENT_KEY: &str = "search-field-content";
pub const CONTENT_TEXT_KEY: &str = "page-search-search-hero";

/// One keyed async result, as handed to the render pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct AsyncData<T> {
    pub key: &'static str,
    pub data: Option<T>,
    pub pending: bool,
    #[serde(serialize_with = "error_message")]
    pub error: Option<QueryError>,
}

impl<T> AsyncData<T> {
    fn settle(key: &'static str, result: Result<T, QueryError>) -> Self {
        match result {
            Ok(data) => Self {
                key,
                data: Some(data),
                pending: false,
                error: None,
            },
            Err(err) => {
                tracing::warn!(key, error = %err, "server search data query failed");
                Self {
                    key,
                    data: None,
                    pending: false,
                    error: Some(err),
                }
            }
        }
    }
}

fn error_message<S: Serializer>(error: &Option<QueryError>, s: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => s.serialize_some(&e.to_string()),
        None => s.serialize_none(),
    }
}

/// The four search-data results of one render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSearchData {
    pub destinations: AsyncData<Vec<Value>>,
    pub regions: AsyncData<Vec<Value>>,
    pub search_field_content: AsyncData<Option<Value>>,
    pub content_text: AsyncData<Option<Value>>,
}

impl ServerSearchData {
    pub fn is_loading(&self) -> bool {
        self.destinations.pending
            || self.regions.pending
            || self.search_field_content.pending
            || self.content_text.pending
    }

    pub fn has_error(&self) -> bool {
        self.destinations.error.is_some()
            || self.regions.error.is_some()
            || self.search_field_content.error.is_some()
            || self.content_text.error.is_some()
    }
}

/// Runs the search-data queries fresh for every render. Nothing is cached.
#[derive(Debug, Clone)]
pub struct SearchDataServerLoader {
    content: ContentQueryService,
}

impl SearchDataServerLoader {
    pub fn new(content: ContentQueryService) -> Self {
        Self { content }
    }

    /// Issue all four queries concurrently; one failing does not affect the others.
    pub async fn load(&self) -> ServerSearchData {
        let (destinations, regions, search_field_content, content_text) = tokio::join!(
            queries::destinations(&self.content),
            queries::regions(&self.content),
            queries::search_field_content(&self.content),
            queries::content_text(&self.content),
        );

        ServerSearchData {
            destinations: AsyncData::settle(DESTINATIONS_KEY, destinations),
            regions: AsyncData::settle(REGIONS_KEY, regions),
            search_field_content: AsyncData::settle(SEARCH_FIELD_CONTENT_KEY, search_field_content),
            content_text: AsyncData::settle(CONTENT_TEXT_KEY, content_text),
        }
    }
}
