pub mod memory;
pub mod monitor;

pub use memory::{HeapCounters, MemoryProbe, MemorySnapshot, NoopProbe, ProcessMemoryProbe};
pub use monitor::{
    Metrics, MetricsExport, MountTimer, PerformanceMonitor, PerformanceSummary,
};
