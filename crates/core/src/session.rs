use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time::Instant;
use uuid::Uuid;
use voyage_site_query::ContentQueryService;

use crate::perf::{MemoryProbe, PerformanceMonitor, ProcessMemoryProbe};
use crate::search::SearchDataCache;

/// Per-session state: the search-data cache and the performance monitor.
#[derive(Debug)]
pub struct SessionContext {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_seen: Mutex<Instant>,
    search: SearchDataCache,
    performance: PerformanceMonitor,
}

impl SessionContext {
    pub fn new(content: ContentQueryService, probe: Arc<dyn MemoryProbe>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_seen: Mutex::new(Instant::now()),
            search: SearchDataCache::new(content),
            performance: PerformanceMonitor::with_probe(probe),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time since the session was opened or last looked up.
    pub fn idle_for(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }

    fn touch(&self) {
        *self.last_seen.lock() = Instant::now();
    }

    pub fn search(&self) -> &SearchDataCache {
        &self.search
    }

    pub fn performance(&self) -> &PerformanceMonitor {
        &self.performance
    }
}

/// Open sessions, keyed by id. Sessions live until closed, or until
/// [`sweep_idle`](Self::sweep_idle) finds them unused for longer than the
/// idle timeout.
pub struct SessionRegistry {
    sessions: DashMap<Uuid, Arc<SessionContext>>,
    content: ContentQueryService,
    probe: Arc<dyn MemoryProbe>,
}

impl SessionRegistry {
    pub fn new(content: ContentQueryService) -> Self {
        Self::with_probe(content, Arc::new(ProcessMemoryProbe))
    }

    pub fn with_probe(content: ContentQueryService, probe: Arc<dyn MemoryProbe>) -> Self {
        Self {
            sessions: DashMap::new(),
            content,
            probe,
        }
    }

    pub fn open(&self) -> Arc<SessionContext> {
        let session = Arc::new(SessionContext::new(
            self.content.clone(),
            Arc::clone(&self.probe),
        ));
        self.sessions.insert(session.id(), Arc::clone(&session));
        tracing::info!(session = %session.id(), "session opened");
        session
    }

    /// Look up a session, marking it as used.
    pub fn get(&self, id: &Uuid) -> Option<Arc<SessionContext>> {
        let session = self.sessions.get(id).map(|s| Arc::clone(s.value()))?;
        session.touch();
        Some(session)
    }

    /// Tear down a session. Returns false if it was not open.
    pub fn close(&self, id: &Uuid) -> bool {
        match self.sessions.remove(id) {
            Some((_, session)) => {
                teardown(&session);
                tracing::info!(session = %id, "session closed");
                true
            }
            None => false,
        }
    }

    /// Close every session unused for longer than `idle_timeout`.
    /// Returns how many were closed.
    pub fn sweep_idle(&self, idle_timeout: Duration) -> usize {
        let mut expired = 0;
        self.sessions.retain(|id, session| {
            if session.idle_for() <= idle_timeout {
                return true;
            }
            teardown(session);
            tracing::info!(session = %id, "idle session expired");
            expired += 1;
            false
        });
        expired
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn teardown(session: &SessionContext) {
    session.search().clear_search_data();
    session.performance().clear_metrics();
}
