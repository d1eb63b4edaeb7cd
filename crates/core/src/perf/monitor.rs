use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::time::Instant;

use super::memory::{MemoryProbe, MemorySnapshot, ProcessMemoryProbe};

/// Everything recorded so far. Times are in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Latest load time per page.
    pub page_load_times: BTreeMap<String, f64>,
    pub component_render_times: BTreeMap<String, Vec<f64>>,
    pub api_call_times: BTreeMap<String, Vec<f64>>,
    pub memory_usage: BTreeMap<String, MemorySnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub average_page_load_time: f64,
    pub average_component_render_time: f64,
    pub average_api_call_time: f64,
    pub total_api_calls: usize,
    pub total_components: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsExport {
    pub summary: PerformanceSummary,
    pub details: Metrics,
}

/// Timing accumulator for one session.
pub struct PerformanceMonitor {
    metrics: RwLock<Metrics>,
    probe: Arc<dyn MemoryProbe>,
}

impl fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("metrics", &*self.metrics.read())
            .finish_non_exhaustive()
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

enum TimerKind {
    PageLoad,
    ComponentRender,
    /// Render time plus a memory sample, both under the component's name.
    Component,
}

/// Started by a `track_*` call; records elapsed time once the host reports
/// the page or component as mounted. Dropping it records nothing.
#[must_use = "call `mounted()` to record the measurement"]
pub struct MountTimer<'a> {
    monitor: &'a PerformanceMonitor,
    kind: TimerKind,
    name: String,
    started: Instant,
}

impl MountTimer<'_> {
    /// Record the elapsed time and return it in milliseconds.
    pub fn mounted(self) -> f64 {
        let elapsed = elapsed_ms(self.started);
        match self.kind {
            TimerKind::PageLoad => {
                self.monitor.record_page_load(&self.name, elapsed);
                tracing::info!(page = %self.name, elapsed_ms = elapsed, "page load time");
            }
            TimerKind::ComponentRender => {
                self.monitor.record_component_render(&self.name, elapsed);
                tracing::info!(component = %self.name, elapsed_ms = elapsed, "component render time");
            }
            TimerKind::Component => {
                self.monitor.record_component_render(&self.name, elapsed);
                tracing::info!(component = %self.name, elapsed_ms = elapsed, "component render time");
                self.monitor.track_memory_usage(&self.name);
            }
        }
        elapsed
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_nanos() as f64 / 1_000_000.0
}

fn mean<'a>(samples: impl Iterator<Item = &'a f64>) -> (f64, usize) {
    let (sum, count) = samples.fold((0.0, 0usize), |(sum, n), s| (sum + s, n + 1));
    if count == 0 {
        (0.0, 0)
    } else {
        (sum / count as f64, count)
    }
}

impl PerformanceMonitor {
    /// Monitor sampling memory from the current process.
    pub fn new() -> Self {
        Self::with_probe(Arc::new(ProcessMemoryProbe))
    }

    pub fn with_probe(probe: Arc<dyn MemoryProbe>) -> Self {
        Self {
            metrics: RwLock::new(Metrics::default()),
            probe,
        }
    }

    pub fn track_page_load(&self, page: impl Into<String>) -> MountTimer<'_> {
        self.timer(TimerKind::PageLoad, page.into())
    }

    pub fn track_component_render(&self, component: impl Into<String>) -> MountTimer<'_> {
        self.timer(TimerKind::ComponentRender, component.into())
    }

    /// Like [`track_component_render`](Self::track_component_render), but
    /// also takes a memory sample for the component when mounted.
    pub fn track_component(&self, component: impl Into<String>) -> MountTimer<'_> {
        self.timer(TimerKind::Component, component.into())
    }

    fn timer(&self, kind: TimerKind, name: String) -> MountTimer<'_> {
        MountTimer {
            monitor: self,
            kind,
            name,
            started: Instant::now(),
        }
    }

    fn record_page_load(&self, page: &str, elapsed: f64) {
        self.metrics
            .write()
            .page_load_times
            .insert(page.to_string(), elapsed);
    }

    fn record_component_render(&self, component: &str, elapsed: f64) {
        self.metrics
            .write()
            .component_render_times
            .entry(component.to_string())
            .or_default()
            .push(elapsed);
    }

    /// Await `operation`, recording its duration under `api` if it succeeds.
    ///
    /// Failures are logged with their duration and returned unchanged.
    pub async fn track_api_call<T, E, Fut>(&self, api: &str, operation: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let started = Instant::now();
        match operation.await {
            Ok(value) => {
                let elapsed = elapsed_ms(started);
                self.metrics
                    .write()
                    .api_call_times
                    .entry(api.to_string())
                    .or_default()
                    .push(elapsed);
                tracing::info!(api, elapsed_ms = elapsed, "api call time");
                Ok(value)
            }
            Err(err) => {
                let elapsed = elapsed_ms(started);
                tracing::error!(api, elapsed_ms = elapsed, error = %err, "api call failed");
                Err(err)
            }
        }
    }

    /// Record a memory sample under `context`, if the host exposes counters.
    pub fn track_memory_usage(&self, context: &str) -> Option<MemorySnapshot> {
        let counters = self.probe.sample()?;
        let snapshot = MemorySnapshot::from_counters(counters, Utc::now());
        tracing::info!(
            context,
            used_mb = counters.used as f64 / 1024.0 / 1024.0,
            total_mb = counters.total as f64 / 1024.0 / 1024.0,
            limit_mb = ?counters.limit.map(|l| l as f64 / 1024.0 / 1024.0),
            "memory usage"
        );
        self.metrics
            .write()
            .memory_usage
            .insert(context.to_string(), snapshot.clone());
        Some(snapshot)
    }

    pub fn get_performance_summary(&self) -> PerformanceSummary {
        let metrics = self.metrics.read();
        let (average_page_load_time, _) = mean(metrics.page_load_times.values());
        let (average_component_render_time, total_components) =
            mean(metrics.component_render_times.values().flatten());
        let (average_api_call_time, total_api_calls) =
            mean(metrics.api_call_times.values().flatten());

        PerformanceSummary {
            average_page_load_time,
            average_component_render_time,
            average_api_call_time,
            total_api_calls,
            total_components,
        }
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.read().clone()
    }

    pub fn clear_metrics(&self) {
        *self.metrics.write() = Metrics::default();
    }

    /// Summary plus full details, also written to the log.
    pub fn export_metrics(&self) -> MetricsExport {
        let export = MetricsExport {
            summary: self.get_performance_summary(),
            details: self.metrics(),
        };
        tracing::info!(summary = ?export.summary, "performance summary");
        tracing::debug!(details = ?export.details, "detailed metrics");
        export
    }
}
