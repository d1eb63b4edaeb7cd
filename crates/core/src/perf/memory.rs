use chrono::{DateTime, Utc};
use serde::Serialize;

/// Raw heap counters, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapCounters {
    pub used: u64,
    pub total: u64,
    pub limit: Option<u64>,
}

/// A recorded memory sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySnapshot {
    pub used_heap_size: u64,
    pub total_heap_size: u64,
    pub heap_size_limit: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

impl MemorySnapshot {
    pub fn from_counters(counters: HeapCounters, timestamp: DateTime<Utc>) -> Self {
        Self {
            used_heap_size: counters.used,
            total_heap_size: counters.total,
            heap_size_limit: counters.limit,
            timestamp,
        }
    }
}

/// Source of heap counters. Returns `None` where the host exposes none.
pub trait MemoryProbe: Send + Sync {
    fn sample(&self) -> Option<HeapCounters>;
}

/// Probe for hosts without memory counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProbe;

impl MemoryProbe for NoopProbe {
    fn sample(&self) -> Option<HeapCounters> {
        None
    }
}

/// Reads resident and virtual size of the current process from
/// `/proc/self/status`. Yields nothing on other platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessMemoryProbe;

impl MemoryProbe for ProcessMemoryProbe {
    fn sample(&self) -> Option<HeapCounters> {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        parse_proc_status(&status)
    }
}

fn parse_proc_status(status: &str) -> Option<HeapCounters> {
    let field = |name: &str| -> Option<u64> {
        let line = status.lines().find(|l| l.starts_with(name))?;
        let kib: u64 = line[name.len()..].split_whitespace().next()?.parse().ok()?;
        Some(kib * 1024)
    };
    Some(HeapCounters {
        used: field("VmRSS:")?,
        total: field("VmSize:")?,
        limit: None,
    })
}
