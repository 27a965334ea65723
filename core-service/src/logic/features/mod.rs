//! Features Module - Feature Normalizer
//!
//! Session → fixed-order vector, and the standardization transform fit on a
//! pool of vectors.

pub mod layout;
pub mod scaler;
pub mod session;
pub mod vector;

#[cfg(test)]
mod tests;

pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use scaler::{FeatureError, StandardScaler};
pub use session::Session;
pub use vector::{extract_features, to_matrix, FeatureVector};
