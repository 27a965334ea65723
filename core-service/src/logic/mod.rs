//! Logic Module - Scoring Engine
//!
//! - `features/` - Session → vector extraction, layout, standardization
//! - `model/` - Isolation forest, z-score fallback, scorer lifecycle
//! - `storage/` - Model bundle persistence

pub mod config;
pub mod features;
pub mod model;
pub mod storage;
