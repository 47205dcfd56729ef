//! Service configuration.
//!
//! Loaded from a TOML file (default `./hotspots.toml`). Every section and
//! every key is optional; missing values fall back to the defaults in
//! `layers`, which reproduce the standard warnings pass. The file path
//! itself can come from `--config` or the `HOTSPOT_CONFIG` environment
//! variable, which may be set in `.env`.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::analysis::dbscan::{ClusterParams, DistanceMetric};
use crate::layers::{self, DROUGHT_LAYER, DROUGHT_URL, NWS_WARNINGS_URL};
use crate::logging::LogLevel;
use crate::model::{ClusterError, DEFAULT_CATEGORY_FIELD, LayerId};

pub const DEFAULT_CONFIG_PATH: &str = "./hotspots.toml";
pub const CONFIG_PATH_ENV: &str = "HOTSPOT_CONFIG";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io(String, std::io::Error),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "cannot read config {}: {}", path, e),
            ConfigError::Parse(msg) => write!(f, "invalid config syntax: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ClusterError> for ConfigError {
    fn from(e: ClusterError) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub warnings: WarningsConfig,
    pub clustering: ClusteringConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    pub drought: DroughtConfig,
}

/// Which layers to query and which categories to keep.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WarningsConfig {
    pub base_url: String,
    pub layers: Vec<LayerId>,
    pub events: Vec<String>,
    pub category_field: String,
}

impl Default for WarningsConfig {
    fn default() -> Self {
        WarningsConfig {
            base_url: NWS_WARNINGS_URL.to_string(),
            layers: layers::DEFAULT_LAYER_IDS.to_vec(),
            events: layers::default_events(),
            category_field: DEFAULT_CATEGORY_FIELD.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub eps: f64,
    pub min_samples: usize,
    pub metric: DistanceMetric,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        ClusteringConfig {
            eps: 0.1,
            min_samples: 3,
            metric: DistanceMetric::Euclidean,
        }
    }
}

impl ClusteringConfig {
    pub fn params(&self) -> Result<ClusterParams, ClusterError> {
        Ok(ClusterParams::new(self.eps, self.min_samples)?.with_metric(self.metric))
    }

    /// Copy of this section with command-line overrides applied.
    pub fn with_overrides(&self, eps: Option<f64>, min_samples: Option<usize>) -> ClusteringConfig {
        ClusteringConfig {
            eps: eps.unwrap_or(self.eps),
            min_samples: min_samples.unwrap_or(self.min_samples),
            metric: self.metric,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Upper bound on each layer query.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig { timeout_secs: 30 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            file: None,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DroughtConfig {
    pub base_url: String,
    pub layer: LayerId,
    pub max_records: u32,
    pub out_sr: u32,
}

impl Default for DroughtConfig {
    fn default() -> Self {
        DroughtConfig {
            base_url: DROUGHT_URL.to_string(),
            layer: DROUGHT_LAYER,
            max_records: 1000,
            out_sr: 4326,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

impl ServiceConfig {
    /// Checks every section; the pipeline assumes a validated config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.warnings;
        if w.layers.is_empty() {
            return Err(ConfigError::Invalid("warnings.layers must not be empty".into()));
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = w.layers.iter().find(|id| !seen.insert(**id)) {
            return Err(ConfigError::Invalid(format!("warnings.layers lists layer {} twice", dup)));
        }
        if w.events.is_empty() {
            return Err(ConfigError::Invalid("warnings.events must not be empty".into()));
        }
        if w.events.iter().any(|e| e.trim().is_empty()) {
            return Err(ConfigError::Invalid("warnings.events contains a blank name".into()));
        }
        if w.category_field.trim().is_empty() {
            return Err(ConfigError::Invalid("warnings.category_field must not be blank".into()));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid("http.timeout_secs must be positive".into()));
        }
        if self.drought.max_records == 0 {
            return Err(ConfigError::Invalid("drought.max_records must be positive".into()));
        }
        self.clustering.params()?;
        Ok(())
    }
}

/// Parses and validates configuration text.
pub fn parse_config(text: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Loads and validates a configuration file.
pub fn load_config(path: &str) -> Result<ServiceConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_string(), e))?;
    parse_config(&text)
}

/// Like `load_config`, but a missing file means "use the defaults".
pub fn load_config_or_default(path: &str) -> Result<ServiceConfig, ConfigError> {
    if Path::new(path).exists() {
        load_config(path)
    } else {
        let config = ServiceConfig::default();
        config.validate()?;
        Ok(config)
    }
}

/// Picks the config path: explicit argument, then `HOTSPOT_CONFIG`, then
/// `DEFAULT_CONFIG_PATH`.
pub fn resolve_config_path(explicit: Option<&str>) -> String {
    explicit
        .map(String::from)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_builtin_defaults() {
        let config = parse_config("").expect("empty config should be valid");
        assert_eq!(config.warnings.layers, vec![1, 2, 3, 4, 5, 6, 8, 9, 10, 11, 12]);
        assert_eq!(config.warnings.events.len(), 11);
        assert_eq!(config.warnings.category_field, "Event");
        assert_eq!(config.clustering.eps, 0.1);
        assert_eq!(config.clustering.min_samples, 3);
        assert_eq!(config.clustering.metric, DistanceMetric::Euclidean);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.drought.layer, 3);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"
            [warnings]
            layers = [1, 2]

            [clustering]
            eps = 25.0
            metric = "haversine"

            [logging]
            level = "debug"
            file = "hotspots.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.warnings.layers, vec![1, 2]);
        assert_eq!(config.warnings.events.len(), 11);
        assert_eq!(config.clustering.eps, 25.0);
        assert_eq!(config.clustering.min_samples, 3);
        assert_eq!(config.clustering.metric, DistanceMetric::Haversine);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.file.as_deref(), Some("hotspots.log"));
    }

    #[test]
    fn test_non_positive_eps_is_rejected() {
        let err = parse_config("[clustering]\neps = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {:?}", err);
        assert!(parse_config("[clustering]\neps = -1.0").is_err());
    }

    #[test]
    fn test_zero_min_samples_is_rejected() {
        assert!(matches!(
            parse_config("[clustering]\nmin_samples = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_empty_or_duplicate_layers_rejected() {
        assert!(parse_config("[warnings]\nlayers = []").is_err());
        assert!(parse_config("[warnings]\nlayers = [1, 2, 1]").is_err());
    }

    #[test]
    fn test_empty_event_list_rejected() {
        assert!(parse_config("[warnings]\nevents = []").is_err());
        assert!(parse_config("[warnings]\nevents = [\"  \"]").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(parse_config("[http]\ntimeout_secs = 0").is_err());
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        assert!(matches!(parse_config("[warnings"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config_or_default("./does-not-exist/hotspots.toml").unwrap();
        assert_eq!(config.warnings.layers.len(), 11);
        assert!(matches!(
            load_config("./does-not-exist/hotspots.toml"),
            Err(ConfigError::Io(_, _))
        ));
    }

    #[test]
    fn test_load_config_reads_file() {
        let path = std::env::temp_dir().join(format!("hotspots-config-test-{}.toml", std::process::id()));
        std::fs::write(&path, "[clustering]\nmin_samples = 5\n").unwrap();
        let config = load_config(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.clustering.min_samples, 5);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = parse_config(include_str!("../hotspots.toml")).expect("shipped config should be valid");
        let defaults = ServiceConfig::default();
        assert_eq!(config.warnings, defaults.warnings);
        assert_eq!(config.clustering, defaults.clustering);
        assert_eq!(config.http, defaults.http);
        assert_eq!(config.logging, defaults.logging);
        assert_eq!(config.drought, defaults.drought);
    }

    #[test]
    fn test_cluster_overrides_are_validated() {
        let clustering = ClusteringConfig {
            metric: DistanceMetric::Haversine,
            ..ClusteringConfig::default()
        };

        let kept = clustering.with_overrides(None, Some(5));
        assert_eq!(kept.eps, 0.1);
        assert_eq!(kept.min_samples, 5);
        assert_eq!(kept.metric, DistanceMetric::Haversine);
        assert!(kept.params().is_ok());

        let bad = clustering.with_overrides(Some(-1.0), None);
        assert!(matches!(bad.params(), Err(ClusterError::InvalidEps(_))));
        assert!(matches!(
            clustering.with_overrides(None, Some(0)).params(),
            Err(ClusterError::InvalidMinSamples(0))
        ));
    }

    #[test]
    fn test_explicit_config_path_wins() {
        assert_eq!(resolve_config_path(Some("custom.toml")), "custom.toml");
    }
}
