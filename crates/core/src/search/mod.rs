//! Search-support content: destinations, regions, and page copy shown by the
//! search screens.

pub mod cache;
pub mod entry;
pub mod queries;
pub mod server;

pub use cache::{SearchDataCache, SearchDataSnapshot};
pub use entry::{EntrySnapshot, EntryState, FetchStatus, SearchEntry};
pub use server::{AsyncData, SearchDataServerLoader, ServerSearchData};
