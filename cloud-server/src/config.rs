//! Configuration module

use std::env;
use std::path::PathBuf;

use behavioral_dna_core::constants::get_default_model_path;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Enrolled profiles (JSON: username → sessions)
    pub profiles_file: PathBuf,

    /// Login attempts (CSV)
    pub login_log_file: PathBuf,

    /// Persisted model bundle
    pub model_path: PathBuf,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            profiles_file: env::var("PROFILES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("enrolled_profiles.json")),

            login_log_file: env::var("LOGIN_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("login_log.csv")),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| get_default_model_path()),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
