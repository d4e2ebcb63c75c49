use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::compare::CompareConfig;
use crate::dsp::pitch::PitchConfig;

/// Application configuration, optionally loaded from a TOML file.
///
/// Every struct carries `#[serde(default)]`, so a config file only needs the
/// fields the user wants to change; everything else falls back to the
/// Default implementations below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub comparison: ComparisonConfig,
}

/// Pitch extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub pitch_floor_hz: f32,
    pub pitch_ceiling_hz: f32,
    pub frame_size_ms: f32,
    pub hop_size_ms: f32,
}

/// Alignment settings. The accuracy buckets and verdict cut points are
/// deliberately NOT here; they are fixed output-format constants, and a
/// report produced with custom buckets would not be comparable to any other.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// DTW local cost for frame pairs with an unvoiced side, in cents.
    pub unvoiced_penalty_cents: f32,
    /// Ceiling on DTW matrix cells before a comparison is rejected.
    pub max_dtw_cells: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            comparison: ComparisonConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let dsp = PitchConfig::default();
        Self {
            pitch_floor_hz: dsp.pitch_floor_hz,
            pitch_ceiling_hz: dsp.pitch_ceiling_hz,
            frame_size_ms: dsp.frame_size_ms,
            hop_size_ms: dsp.hop_size_ms,
        }
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        let core = CompareConfig::default();
        Self {
            unvoiced_penalty_cents: core.unvoiced_penalty_cents,
            max_dtw_cells: core.max_dtw_cells,
        }
    }
}

/// Bridge from the user-facing config to the DSP parameters.
impl From<&AnalysisConfig> for PitchConfig {
    fn from(cfg: &AnalysisConfig) -> Self {
        PitchConfig {
            pitch_floor_hz: cfg.pitch_floor_hz,
            pitch_ceiling_hz: cfg.pitch_ceiling_hz,
            frame_size_ms: cfg.frame_size_ms,
            hop_size_ms: cfg.hop_size_ms,
            ..PitchConfig::default()
        }
    }
}

/// Bridge from the user-facing config to the comparison core's config.
impl From<&ComparisonConfig> for CompareConfig {
    fn from(cfg: &ComparisonConfig) -> Self {
        CompareConfig {
            unvoiced_penalty_cents: cfg.unvoiced_penalty_cents,
            max_dtw_cells: cfg.max_dtw_cells,
            ..CompareConfig::default()
        }
    }
}

/// Load configuration from an explicit path, or defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.analysis.pitch_floor_hz, 65.0);
        assert_eq!(cfg.comparison.unvoiced_penalty_cents, 100.0);
    }

    #[test]
    fn parse_partial_toml() {
        // Unspecified fields fall back to defaults.
        let toml_str = r#"
[comparison]
unvoiced_penalty_cents = 150.0
"#;
        let cfg: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.comparison.unvoiced_penalty_cents, 150.0);
        assert_eq!(cfg.comparison.max_dtw_cells, 100_000_000);
        assert_eq!(cfg.analysis.hop_size_ms, 25.0);
    }

    #[test]
    fn compare_config_bridge_keeps_domain_constants() {
        let section = ComparisonConfig {
            unvoiced_penalty_cents: 80.0,
            max_dtw_cells: 1000,
        };
        let core: CompareConfig = (&section).into();
        assert_eq!(core.unvoiced_penalty_cents, 80.0);
        assert_eq!(core.max_dtw_cells, 1000);
        // Buckets stay at the fixed contract values.
        assert_eq!(core.accurate_below_cents, 25.0);
        assert_eq!(core.severe_from_cents, 50.0);
    }

    #[test]
    fn pitch_config_bridge() {
        let cfg = AnalysisConfig {
            pitch_floor_hz: 80.0,
            ..AnalysisConfig::default()
        };
        let pitch: PitchConfig = (&cfg).into();
        assert_eq!(pitch.pitch_floor_hz, 80.0);
        assert_eq!(pitch.hop_size_ms, 25.0);
    }

    #[test]
    fn roundtrip_toml() {
        let cfg = AppConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let loaded: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(loaded.analysis.pitch_floor_hz, cfg.analysis.pitch_floor_hz);
        assert_eq!(loaded.comparison.max_dtw_cells, cfg.comparison.max_dtw_cells);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(load_config(Some(Path::new("/tmp/nope-pitchgrade.toml"))).is_err());
    }

    #[test]
    fn no_config_path_gives_defaults() {
        let cfg = load_config(None).unwrap();
        assert_eq!(cfg.analysis.pitch_ceiling_hz, 2100.0);
    }
}
