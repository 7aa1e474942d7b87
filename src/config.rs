//! Planner configuration file support.
//!
//! Every value has a default, so an empty TOML document yields the stock
//! planner: 1200 kg per tour, depot 33181 and the tuning constants the sweep
//! planner has always used.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::models::{Degrees, Depot, Kilograms};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub planner: PlannerSettings,
    #[serde(default)]
    pub depot: DepotSettings,
    #[serde(default)]
    pub geo: GeoSettings,
}

/// Capacity and naming settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerSettings {
    #[serde(default = "default_capacity_kg")]
    pub capacity_kg: Kilograms,
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_line_prefix")]
    pub line_prefix: String,
    #[serde(default)]
    pub balance: BalanceSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
}

/// Thresholds of the balancing pass between adjacent tours
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceSettings {
    /// A following tour lighter than this share of capacity may be absorbed
    #[serde(default = "default_absorb_ratio")]
    pub absorb_ratio: f64,
    /// Largest mean-bearing difference for which two tours may merge
    #[serde(default = "default_merge_angle_deg")]
    pub merge_angle_deg: Degrees,
}

/// Weights and normalizers of the tour score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_load_weight")]
    pub load_weight: f64,
    #[serde(default = "default_stop_weight")]
    pub stop_weight: f64,
    #[serde(default = "default_compactness_weight")]
    pub compactness_weight: f64,
    /// Stop count at which the stop component saturates
    #[serde(default = "default_stop_norm")]
    pub stop_norm: u32,
    /// Angular spread at which the compactness component reaches zero
    #[serde(default = "default_span_norm_deg")]
    pub span_norm_deg: Degrees,
}

/// Default depot and the coordinate used when its postal code cannot be resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepotSettings {
    #[serde(default = "default_depot_name")]
    pub name: String,
    #[serde(default = "default_depot_street")]
    pub street: String,
    #[serde(default = "default_depot_zip")]
    pub zip: String,
    #[serde(default = "default_depot_city")]
    pub city: String,
    #[serde(default = "default_fallback_lat")]
    pub fallback_lat: f64,
    #[serde(default = "default_fallback_lon")]
    pub fallback_lon: f64,
}

/// Reference dataset location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoSettings {
    #[serde(default = "default_dataset")]
    pub dataset: PathBuf,
}

fn default_capacity_kg() -> Kilograms {
    1200.0
}

fn default_strategy() -> String {
    "navio_ai_geo_sweep".to_string()
}

fn default_line_prefix() -> String {
    "Navio Linie".to_string()
}

fn default_absorb_ratio() -> f64 {
    0.4
}

fn default_merge_angle_deg() -> Degrees {
    70.0
}

fn default_load_weight() -> f64 {
    0.55
}

fn default_stop_weight() -> f64 {
    0.15
}

fn default_compactness_weight() -> f64 {
    0.30
}

fn default_stop_norm() -> u32 {
    8
}

fn default_span_norm_deg() -> Degrees {
    140.0
}

fn default_depot_name() -> String {
    "Depot Bad Wünnenberg".to_string()
}

fn default_depot_street() -> String {
    "Ostring 3".to_string()
}

fn default_depot_zip() -> String {
    "33181".to_string()
}

fn default_depot_city() -> String {
    "Bad Wünnenberg".to_string()
}

fn default_fallback_lat() -> f64 {
    51.512
}

fn default_fallback_lon() -> f64 {
    8.707
}

fn default_dataset() -> PathBuf {
    PathBuf::from("data/DE/zipcodes.de.json")
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            capacity_kg: default_capacity_kg(),
            strategy: default_strategy(),
            line_prefix: default_line_prefix(),
            balance: BalanceSettings::default(),
            scoring: ScoringSettings::default(),
        }
    }
}

impl Default for BalanceSettings {
    fn default() -> Self {
        Self {
            absorb_ratio: default_absorb_ratio(),
            merge_angle_deg: default_merge_angle_deg(),
        }
    }
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            load_weight: default_load_weight(),
            stop_weight: default_stop_weight(),
            compactness_weight: default_compactness_weight(),
            stop_norm: default_stop_norm(),
            span_norm_deg: default_span_norm_deg(),
        }
    }
}

impl Default for DepotSettings {
    fn default() -> Self {
        Self {
            name: default_depot_name(),
            street: default_depot_street(),
            zip: default_depot_zip(),
            city: default_depot_city(),
            fallback_lat: default_fallback_lat(),
            fallback_lon: default_fallback_lon(),
        }
    }
}

impl Default for GeoSettings {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
        }
    }
}

impl DepotSettings {
    /// The configured depot as it is echoed in responses
    pub fn to_depot(&self) -> Depot {
        Depot {
            name: self.name.clone(),
            street: self.street.clone(),
            zip: self.zip.clone(),
            city: self.city.clone(),
        }
    }
}

impl PlannerConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PlannerConfig = toml::from_str(content)?;
        config.validate()?;

        Ok(config)
    }

    /// Rejects values the planner cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let planner = &self.planner;
        if !(planner.capacity_kg.is_finite() && planner.capacity_kg > 0.0) {
            return Err(invalid("planner.capacity_kg", "must be positive", planner.capacity_kg));
        }

        let balance = &planner.balance;
        if !(balance.absorb_ratio > 0.0 && balance.absorb_ratio <= 1.0) {
            return Err(invalid("planner.balance.absorb_ratio", "must be in (0, 1]", balance.absorb_ratio));
        }
        if !(balance.merge_angle_deg >= 0.0 && balance.merge_angle_deg <= 180.0) {
            return Err(invalid(
                "planner.balance.merge_angle_deg",
                "must be in [0, 180]",
                balance.merge_angle_deg,
            ));
        }

        let scoring = &planner.scoring;
        if scoring.stop_norm == 0 {
            return Err(invalid("planner.scoring.stop_norm", "must be at least 1", 0.0));
        }
        if !(scoring.span_norm_deg > 0.0) {
            return Err(invalid("planner.scoring.span_norm_deg", "must be positive", scoring.span_norm_deg));
        }
        let weights = [scoring.load_weight, scoring.stop_weight, scoring.compactness_weight];
        if weights.iter().any(|weight| !(*weight >= 0.0)) {
            return Err(ConfigError::Invalid {
                field: "planner.scoring",
                reason: "score weights must not be negative".to_string(),
            });
        }
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Invalid {
                field: "planner.scoring",
                reason: format!("score weights must sum to 1, got {}", total),
            });
        }

        Ok(())
    }
}

fn invalid(field: &'static str, rule: &str, value: f64) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: format!("{}, got {}", rule, value),
    }
}
