//! Domain layer for the voyage site: travel-date availability, search-support
//! content, and per-session performance instrumentation.

pub mod dates;
pub mod perf;
pub mod search;
pub mod session;
