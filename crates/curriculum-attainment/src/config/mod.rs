use crate::workflows::attainment::matcher::{MatchOptions, DEFAULT_FUZZY_CUTOFF, DEFAULT_PAD_WIDTH};
use crate::workflows::attainment::threshold::{BATCH_THRESHOLD, INTERACTIVE_THRESHOLD};
use crate::workflows::attainment::{Strength, StrengthWeights};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Named weight/threshold combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPreset {
    /// Statistical summary: H=0.7, M=0.25, L=0.05, threshold 0.80.
    Batch,
    /// Interactive computation: H=1.0, M=0.8, L=0.6, threshold 0.70.
    Interactive,
}

/// Everything a reconciliation pass needs besides its two input tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub weights: StrengthWeights,
    pub threshold: f64,
    pub fuzzy_cutoff: f64,
    pub pad_width: usize,
}

impl AnalysisConfig {
    pub fn batch() -> Self {
        Self {
            weights: StrengthWeights::statistical(),
            threshold: BATCH_THRESHOLD,
            fuzzy_cutoff: DEFAULT_FUZZY_CUTOFF,
            pad_width: DEFAULT_PAD_WIDTH,
        }
    }

    pub fn interactive() -> Self {
        Self {
            weights: StrengthWeights::interactive(),
            threshold: INTERACTIVE_THRESHOLD,
            ..Self::batch()
        }
    }

    pub fn from_preset(preset: AnalysisPreset) -> Self {
        match preset {
            AnalysisPreset::Batch => Self::batch(),
            AnalysisPreset::Interactive => Self::interactive(),
        }
    }

    /// Applies `ATTAINMENT_WEIGHT_{H,M,L}` and `ATTAINMENT_THRESHOLD` on top of `base`.
    pub fn from_env(base: Self) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = base;
        if let Some(value) = env_f64("ATTAINMENT_WEIGHT_H")? {
            config.weights.high = value;
        }
        if let Some(value) = env_f64("ATTAINMENT_WEIGHT_M")? {
            config.weights.medium = value;
        }
        if let Some(value) = env_f64("ATTAINMENT_WEIGHT_L")? {
            config.weights.low = value;
        }
        if let Some(value) = env_f64("ATTAINMENT_THRESHOLD")? {
            config.threshold = value;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_weights(mut self, weights: StrengthWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((strength, value)) = self.weights.invalid_strength() {
            return Err(ConfigError::InvalidWeight { strength, value });
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if !(0.0..=1.0).contains(&self.fuzzy_cutoff) {
            return Err(ConfigError::InvalidFuzzyCutoff(self.fuzzy_cutoff));
        }
        Ok(())
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            fuzzy_cutoff: self.fuzzy_cutoff,
            pad_width: self.pad_width,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::batch()
    }
}

fn env_f64(key: &'static str) -> Result<Option<f64>, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(None),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidWeight { strength: Strength, value: f64 },
    InvalidThreshold(f64),
    InvalidFuzzyCutoff(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a number, got '{value}'")
            }
            ConfigError::InvalidWeight { strength, value } => {
                write!(f, "weight for {strength} must be positive, got {value}")
            }
            ConfigError::InvalidThreshold(value) => {
                write!(f, "threshold must be within [0, 1], got {value}")
            }
            ConfigError::InvalidFuzzyCutoff(value) => {
                write!(f, "fuzzy cutoff must be within [0, 1], got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
