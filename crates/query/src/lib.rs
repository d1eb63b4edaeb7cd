//! Content query layer: a small expression language evaluated in memory over
//! JSON documents, plus the sources those documents are loaded from.

pub mod ast;
pub mod collection;
pub mod error;
pub mod eval;
pub mod source;

pub use collection::{CollectionQuery, ContentQueryService, Op};
pub use error::QueryError;
pub use source::{ContentSource, FsContentSource, MemoryContentSource};
