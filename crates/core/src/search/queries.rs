//! The four content queries behind the search screens, shared by the
//! session cache and the per-request server loader.

use serde_json::Value;
use voyage_site_query::{ContentQueryService, QueryError};

pub const DESTINATION_FIELDS: [&str; 8] = [
    "titre",
    "slug",
    "metaDescription",
    "published",
    "regions",
    "image",
    "stem",
    "isTopDestination",
];

pub const REGION_FIELDS: [&str; 3] = ["nom", "slug", "meta_description"];

pub const SEARCH_FIELD_COLLECTION: &str = "search_field";
pub const PAGE_SEARCH_COLLECTION: &str = "page_search";

/// Published destinations, as projected. Documents are passed through
/// without further validation; fields a document lacks are left out.
pub async fn destinations(content: &ContentQueryService) -> Result<Vec<Value>, QueryError> {
    content
        .query_collection("destinations")
        .select(DESTINATION_FIELDS)
        .where_eq("published", true)
        .all()
        .await
}

pub async fn regions(content: &ContentQueryService) -> Result<Vec<Value>, QueryError> {
    content
        .query_collection("regions")
        .select(REGION_FIELDS)
        .all()
        .await
}

/// Copy for the search field widget.
pub async fn search_field_content(
    content: &ContentQueryService,
) -> Result<Option<Value>, QueryError> {
    content.query_collection(SEARCH_FIELD_COLLECTION).first().await
}

/// Hero copy for the search page.
pub async fn content_text(content: &ContentQueryService) -> Result<Option<Value>, QueryError> {
    content.query_collection(PAGE_SEARCH_COLLECTION).first().await
}
