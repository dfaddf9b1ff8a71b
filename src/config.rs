// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::models::MeetingPlatform;
use std::env;

/// Base URL of the self-hosted meeting rooms.
pub const DEFAULT_CUSTOM_MEETING_BASE_URL: &str = "https://meet.subjectsupport.com";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string
    pub database_url: String,
    /// Frontend URL (CORS origin, cookie security)
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Base URL for `custom` meeting rooms
    pub custom_meeting_base_url: String,
    /// Platform used when a confirmation does not pick one
    pub default_meeting_platform: MeetingPlatform,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let default_meeting_platform = match env::var("DEFAULT_MEETING_PLATFORM") {
            Ok(raw) => MeetingPlatform::parse(&raw)
                .ok_or(ConfigError::Invalid("DEFAULT_MEETING_PLATFORM", raw))?,
            Err(_) => MeetingPlatform::default(),
        };

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 8080,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://tutorhub.db?mode=rwc".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            custom_meeting_base_url: env::var("CUSTOM_MEETING_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_CUSTOM_MEETING_BASE_URL.to_string()),
            default_meeting_platform,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            custom_meeting_base_url: DEFAULT_CUSTOM_MEETING_BASE_URL.to_string(),
            default_meeting_platform: MeetingPlatform::GoogleMeet,
        }
    }

    /// Cookies get the `Secure` attribute when the frontend is served over HTTPS.
    pub fn secure_cookies(&self) -> bool {
        self.frontend_url.starts_with("https://")
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("CUSTOM_MEETING_BASE_URL", "https://rooms.example.org/");
        env::set_var("DEFAULT_MEETING_PLATFORM", "zoom");
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.custom_meeting_base_url, "https://rooms.example.org");
        assert_eq!(config.default_meeting_platform, MeetingPlatform::Zoom);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_secure_cookies_follow_frontend_scheme() {
        let mut config = Config::test_default();
        assert!(!config.secure_cookies());

        config.frontend_url = "https://tutorhub.example.org".to_string();
        assert!(config.secure_cookies());
    }
}
