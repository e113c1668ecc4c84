//! Runtime settings for the mock backend.

use serde::Deserialize;
use std::env;
use tracing::warn;

use crate::backend::{Latency, MAX_SCALE};
use crate::models::seed::DEMO_EMAIL;

/// Set to `off`, `0` or `false` to skip every simulated delay.
pub const LATENCY_ENV: &str = "KROMA_LATENCY";
/// Multiplier for simulated delays, e.g. `0.1`.
pub const LATENCY_SCALE_ENV: &str = "KROMA_LATENCY_SCALE";
pub const STORAGE_URL_ENV: &str = "KROMA_STORAGE_URL";
pub const AUTO_LOGIN_ENV: &str = "KROMA_AUTO_LOGIN";
pub const SEED_ENV: &str = "KROMA_SEED";

pub const DEFAULT_STORAGE_URL: &str = "https://mock-storage.com";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    pub latency_enabled: bool,
    pub latency_scale: f64,
    pub storage_base_url: String,
    /// Sign the demo account in when auth initializes without a session.
    pub auto_login_demo: bool,
    pub demo_email: String,
    pub seed_demo_data: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            latency_enabled: true,
            latency_scale: 1.0,
            storage_base_url: DEFAULT_STORAGE_URL.to_string(),
            auto_login_demo: true,
            demo_email: DEMO_EMAIL.to_string(),
            seed_demo_data: true,
        }
    }
}

impl MockConfig {
    /// Defaults overridden by `KROMA_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Seeded data, no delays.
    pub fn for_tests() -> Self {
        Self {
            latency_enabled: false,
            ..Self::default()
        }
    }

    pub fn latency(&self) -> Latency {
        Latency::new(self.latency_enabled, self.latency_scale)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(LATENCY_ENV) {
            self.latency_enabled = parse_flag(LATENCY_ENV, &value).unwrap_or(self.latency_enabled);
        }
        if let Some(value) = lookup(LATENCY_SCALE_ENV) {
            match value.trim().parse::<f64>() {
                Ok(scale) if scale.is_finite() && (0.0..=MAX_SCALE).contains(&scale) => {
                    self.latency_scale = scale
                }
                _ => warn!(
                    "Ignoring {}={:?}: expected a number between 0 and {}",
                    LATENCY_SCALE_ENV, value, MAX_SCALE
                ),
            }
        }
        if let Some(value) = lookup(STORAGE_URL_ENV) {
            let trimmed = value.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                self.storage_base_url = trimmed.to_string();
            }
        }
        if let Some(value) = lookup(AUTO_LOGIN_ENV) {
            self.auto_login_demo =
                parse_flag(AUTO_LOGIN_ENV, &value).unwrap_or(self.auto_login_demo);
        }
        if let Some(value) = lookup(SEED_ENV) {
            self.seed_demo_data = parse_flag(SEED_ENV, &value).unwrap_or(self.seed_demo_data);
        }
        self
    }
}

fn parse_flag(key: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => {
            warn!("Ignoring {}={:?}: expected on/off", key, value);
            None
        }
    }
}
