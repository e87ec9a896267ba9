//! ThreadStore - per-thread conversation checkpoint store
//!
//! Stores one JSON snapshot per thread, keyed by an opaque thread id.
//! Callers serialize whatever state they want to resume; the store never
//! interprets the snapshot beyond JSON validity.
//!
//! Two implementations of the [`Checkpointer`] trait are provided:
//!
//! - [`MemorySaver`] - process-local, gone on exit
//! - [`FileSaver`] - one JSON document per thread under a root directory

mod store;

pub use store::{Checkpointer, FileSaver, MemorySaver, ThreadId};
