//! Document Store Module
//! Mission: Generic keyed persistence with partial updates, pagination, aggregation

pub mod document;
pub mod patch;

pub use document::{Cursor, DocumentStore, IndexKind, IndexSpec, Page, MAX_PAGE_SIZE};
pub use patch::Patch;
