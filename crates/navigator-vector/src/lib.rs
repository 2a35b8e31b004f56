//! Exact nearest-neighbour store for course chunks.
//!
//! Scores are squared L2 distances: lower is closer, `0.0` is identical.

#![deny(unused_imports)]

pub mod error;
pub mod index;
pub mod persist;
pub mod store;

pub use error::{Result, StoreError};
pub use index::{squared_l2, FlatL2Index};
pub use persist::{index_path, texts_path};
pub use store::VectorStore;

pub use navigator_core::types::SearchHit;
