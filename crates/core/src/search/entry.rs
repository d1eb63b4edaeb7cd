use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use voyage_site_query::QueryError;

/// Externally visible status of a cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// Lifecycle of one cached entry. The value only exists once fetched.
#[derive(Debug, Clone)]
pub enum EntryState<T> {
    Idle,
    Pending,
    Success(Arc<T>),
    Error(QueryError),
}

impl<T> EntryState<T> {
    pub fn status(&self) -> FetchStatus {
        match self {
            EntryState::Idle => FetchStatus::Idle,
            EntryState::Pending => FetchStatus::Pending,
            EntryState::Success(_) => FetchStatus::Success,
            EntryState::Error(_) => FetchStatus::Error,
        }
    }

    pub fn value(&self) -> Option<Arc<T>> {
        match self {
            EntryState::Success(v) => Some(Arc::clone(v)),
            _ => None,
        }
    }
}

/// Point-in-time view of an entry, for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySnapshot<T> {
    pub status: FetchStatus,
    pub value: Option<Arc<T>>,
}

/// A fetch-once slot.
///
/// The first successful fetch is kept for the lifetime of the entry (or until
/// [`reset`](Self::reset)). Failures are logged and leave the entry in
/// `Error`; the next fetch tries again.
///
/// Concurrent fetches on an entry that has not yet succeeded each run their
/// query; only a resolved success short-circuits.
#[derive(Debug)]
pub struct SearchEntry<T> {
    key: &'static str,
    state: RwLock<EntryState<T>>,
}

impl<T> SearchEntry<T> {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            state: RwLock::new(EntryState::Idle),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn status(&self) -> FetchStatus {
        self.state.read().status()
    }

    pub fn value(&self) -> Option<Arc<T>> {
        self.state.read().value()
    }

    /// The error from the last failed fetch, while in `Error`.
    pub fn error(&self) -> Option<QueryError> {
        match &*self.state.read() {
            EntryState::Error(e) => Some(e.clone()),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> EntrySnapshot<T> {
        let state = self.state.read();
        EntrySnapshot {
            status: state.status(),
            value: state.value(),
        }
    }

    pub fn reset(&self) {
        *self.state.write() = EntryState::Idle;
    }

    /// Return the cached value, or run `query` and cache its result.
    ///
    /// Returns `None` if the query fails.
    pub async fn fetch_with<F, Fut>(&self, query: F) -> Option<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, QueryError>>,
    {
        self.fetch_unless(query, |_| true).await
    }

    async fn fetch_unless<F, Fut>(&self, query: F, settled: impl Fn(&T) -> bool) -> Option<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, QueryError>>,
    {
        let cached = self.state.read().value();
        if let Some(value) = cached.filter(|v| settled(&**v)) {
            return Some(value);
        }

        *self.state.write() = EntryState::Pending;

        match query().await {
            Ok(value) => {
                let value = Arc::new(value);
                *self.state.write() = EntryState::Success(Arc::clone(&value));
                tracing::debug!(entry = self.key, "search data fetched");
                Some(value)
            }
            Err(err) => {
                tracing::error!(entry = self.key, error = %err, "error fetching search data");
                *self.state.write() = EntryState::Error(err);
                None
            }
        }
    }
}

impl<U> SearchEntry<Option<U>> {
    /// Like [`fetch_with`](SearchEntry::fetch_with), for a query that may
    /// resolve to nothing. An empty result is a success, but it is not
    /// kept: the next call queries again.
    pub async fn fetch_optional_with<F, Fut>(&self, query: F) -> Option<Arc<Option<U>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<U>, QueryError>>,
    {
        self.fetch_unless(query, Option::is_some).await
    }
}
