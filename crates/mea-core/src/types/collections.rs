//! Collection aliases used across the pipeline.
//!
//! FxHash is a fast non-cryptographic hash; lookup keys here are short
//! strings (well IDs, metric names) where it clearly wins over SipHash.

pub use rustc_hash::{FxHashMap, FxHashSet};
