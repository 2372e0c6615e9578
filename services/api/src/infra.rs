use clap::ValueEnum;
use curriculum_attainment::config::{AnalysisConfig, AnalysisPreset, AppConfig, ConfigError};
use curriculum_attainment::error::AppError;
use curriculum_attainment::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum PresetArg {
    /// Statistical summary weights (H=0.7, M=0.25, L=0.05), threshold 0.80
    #[default]
    Batch,
    /// Interactive weights (H=1.0, M=0.8, L=0.6), threshold 0.70
    Interactive,
}

impl From<PresetArg> for AnalysisPreset {
    fn from(value: PresetArg) -> Self {
        match value {
            PresetArg::Batch => AnalysisPreset::Batch,
            PresetArg::Interactive => AnalysisPreset::Interactive,
        }
    }
}

/// Per-strength weight overrides; unset strengths keep the preset weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub(crate) struct WeightOverrides {
    #[serde(default, rename = "H")]
    pub(crate) high: Option<f64>,
    #[serde(default, rename = "M")]
    pub(crate) medium: Option<f64>,
    #[serde(default, rename = "L")]
    pub(crate) low: Option<f64>,
}

pub(crate) fn resolve_analysis_config(
    base: AnalysisConfig,
    overrides: WeightOverrides,
    threshold: Option<f64>,
) -> Result<AnalysisConfig, ConfigError> {
    let mut config = base;
    if let Some(high) = overrides.high {
        config.weights.high = high;
    }
    if let Some(medium) = overrides.medium {
        config.weights.medium = medium;
    }
    if let Some(low) = overrides.low {
        config.weights.low = low;
    }
    if let Some(threshold) = threshold {
        config = config.with_threshold(threshold);
    }
    config.validate()?;
    Ok(config)
}

/// Installs tracing for one-shot CLI commands using the same environment
/// settings as the server.
pub(crate) fn init_cli_telemetry() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use curriculum_attainment::workflows::attainment::StrengthWeights;

    #[test]
    fn overrides_replace_only_the_given_weights() {
        let config = resolve_analysis_config(
            AnalysisConfig::interactive(),
            WeightOverrides {
                high: Some(0.9),
                ..WeightOverrides::default()
            },
            Some(0.75),
        )
        .expect("valid overrides");

        assert_eq!(config.weights, StrengthWeights::new(0.9, 0.8, 0.6));
        assert_eq!(config.threshold, 0.75);
    }

    #[test]
    fn rejects_non_positive_weights() {
        let result = resolve_analysis_config(
            AnalysisConfig::batch(),
            WeightOverrides {
                low: Some(0.0),
                ..WeightOverrides::default()
            },
            None,
        );
        assert!(matches!(result, Err(ConfigError::InvalidWeight { .. })));
    }

    #[test]
    fn preset_argument_maps_to_analysis_preset() {
        assert_eq!(
            AnalysisConfig::from_preset(PresetArg::Interactive.into()),
            AnalysisConfig::interactive()
        );
        assert_eq!(
            AnalysisConfig::from_preset(PresetArg::default().into()),
            AnalysisConfig::batch()
        );
    }
}
