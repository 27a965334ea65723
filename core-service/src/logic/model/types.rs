//! Prediction result types shared by both scoring paths

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStatus {
    Normal,
    Anomaly,
}

impl DetectionStatus {
    pub fn from_flag(is_anomaly: bool) -> Self {
        if is_anomaly {
            Self::Anomaly
        } else {
            Self::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Anomaly => "anomaly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    IsolationForest,
    Zscore,
    /// Not enough reference data to judge
    None,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IsolationForest => "isolation_forest",
            Self::Zscore => "zscore",
            Self::None => "none",
        }
    }
}

/// What `predict` returns to the request layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub status: DetectionStatus,
    /// 0.0 = normal, 1.0 = very anomalous
    pub score: f64,
    pub message: String,
    pub method: DetectionMethod,

    /// Forest `score_samples` value (trained path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_score: Option<f64>,

    /// Largest per-dimension z-score (fallback path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_z: Option<f64>,
}

impl Prediction {
    pub fn insufficient_data() -> Self {
        Self {
            status: DetectionStatus::Normal,
            score: 0.0,
            message: "Insufficient data.".to_string(),
            method: DetectionMethod::None,
            raw_score: None,
            max_z: None,
        }
    }
}
