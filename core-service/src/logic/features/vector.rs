//! Feature Vector - ordered numeric view of a Session
//!
//! The vector carries the layout version and hash it was built under, so a
//! vector (or a model fit on vectors) from another layout is detectable.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::layout::{layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
use super::session::Session;

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub version: u8,
    pub layout_hash: u32,
    /// Values in FEATURE_LAYOUT order
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Wrap values already in layout order, stamped with the current layout
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Map a session to its vector. Total: absent or non-numeric keys become 0.
pub fn extract_features(session: &Session) -> FeatureVector {
    let mut values = [0.0; FEATURE_COUNT];
    for (slot, name) in values.iter_mut().zip(FEATURE_LAYOUT) {
        *slot = session.get_f64(name);
    }
    FeatureVector::from_values(values)
}

/// Stack sessions into an `n × FEATURE_COUNT` matrix
pub fn to_matrix(sessions: &[Session]) -> Array2<f64> {
    let mut matrix = Array2::zeros((sessions.len(), FEATURE_COUNT));
    for (mut row, session) in matrix.rows_mut().into_iter().zip(sessions) {
        let vector = extract_features(session);
        for (cell, value) in row.iter_mut().zip(vector.values) {
            *cell = value;
        }
    }
    matrix
}
