use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProjectorResult;
use crate::types::FunnelRates;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `ROAS_PROJECTOR__`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub benchmarks: Benchmarks,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Every read-only table the engine consults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Benchmarks {
    #[serde(default)]
    pub market: MarketBenchmark,
    /// Rates the solver starts from when a field is left empty.
    #[serde(default = "default_baseline")]
    pub baseline: FunnelRates,
    #[serde(default)]
    pub ceilings: LeverCeilings,
    #[serde(default)]
    pub field_averages: FieldAverages,
}

/// Market averages the insight rules compare a projection against.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MarketBenchmark {
    #[serde(default = "default_market_cpc")]
    pub cpc: f64,
    #[serde(default = "default_market_ctr")]
    pub ctr: f64,
    #[serde(default = "default_market_connect_rate")]
    pub connect_rate: f64,
    #[serde(default = "default_market_conv_lp")]
    pub conv_lp: f64,
    #[serde(default = "default_market_conv_checkout")]
    pub conv_checkout: f64,
    #[serde(default = "default_cpa_to_target_ratio")]
    pub cpa_to_target_ratio: f64,
}

/// Upper bounds (percent) the solver may push each lever to.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LeverCeilings {
    #[serde(default = "default_ctr_ceiling")]
    pub ctr_pct: f64,
    #[serde(default = "default_conv_lp_ceiling")]
    pub conv_lp_pct: f64,
    #[serde(default = "default_conv_checkout_ceiling")]
    pub conv_checkout_pct: f64,
}

/// Averages behind the inline per-field advisories.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct FieldAverages {
    #[serde(default = "default_field_ctr")]
    pub ctr: f64,
    #[serde(default = "default_field_connect_rate")]
    pub connect_rate: f64,
    #[serde(default = "default_field_conv_lp")]
    pub conv_lp: f64,
    #[serde(default = "default_field_conv_checkout")]
    pub conv_checkout: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub product_name: String,
    #[serde(default = "default_assistant")]
    pub default_assistant: String,
}

// Default functions
fn default_baseline() -> FunnelRates {
    FunnelRates::BENCHMARK
}
fn default_market_cpc() -> f64 {
    2.0
}
fn default_market_ctr() -> f64 {
    2.0
}
fn default_market_connect_rate() -> f64 {
    85.0
}
fn default_market_conv_lp() -> f64 {
    2.0
}
fn default_market_conv_checkout() -> f64 {
    80.0
}
fn default_cpa_to_target_ratio() -> f64 {
    0.5
}
fn default_ctr_ceiling() -> f64 {
    15.0
}
fn default_conv_lp_ceiling() -> f64 {
    50.0
}
fn default_conv_checkout_ceiling() -> f64 {
    98.0
}
fn default_field_ctr() -> f64 {
    2.5
}
fn default_field_connect_rate() -> f64 {
    85.0
}
fn default_field_conv_lp() -> f64 {
    2.0
}
fn default_field_conv_checkout() -> f64 {
    85.0
}
fn default_assistant() -> String {
    "gemini".to_string()
}

impl Default for Benchmarks {
    fn default() -> Self {
        Self {
            market: MarketBenchmark::default(),
            baseline: default_baseline(),
            ceilings: LeverCeilings::default(),
            field_averages: FieldAverages::default(),
        }
    }
}

impl Default for MarketBenchmark {
    fn default() -> Self {
        Self {
            cpc: default_market_cpc(),
            ctr: default_market_ctr(),
            connect_rate: default_market_connect_rate(),
            conv_lp: default_market_conv_lp(),
            conv_checkout: default_market_conv_checkout(),
            cpa_to_target_ratio: default_cpa_to_target_ratio(),
        }
    }
}

impl Default for LeverCeilings {
    fn default() -> Self {
        Self {
            ctr_pct: default_ctr_ceiling(),
            conv_lp_pct: default_conv_lp_ceiling(),
            conv_checkout_pct: default_conv_checkout_ceiling(),
        }
    }
}

impl Default for FieldAverages {
    fn default() -> Self {
        Self {
            ctr: default_field_ctr(),
            connect_rate: default_field_connect_rate(),
            conv_lp: default_field_conv_lp(),
            conv_checkout: default_field_conv_checkout(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            default_assistant: default_assistant(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then environment
    /// variables (which win).
    pub fn load(path: Option<&Path>) -> ProjectorResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("ROAS_PROJECTOR")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_market_tables() {
        let config = AppConfig::default();
        assert_eq!(config.benchmarks.market.cpc, 2.0);
        assert_eq!(config.benchmarks.market.connect_rate, 85.0);
        assert_eq!(config.benchmarks.market.cpa_to_target_ratio, 0.5);
        assert_eq!(config.benchmarks.baseline, FunnelRates::BENCHMARK);
        assert_eq!(config.benchmarks.ceilings.ctr_pct, 15.0);
        assert_eq!(config.benchmarks.ceilings.conv_lp_pct, 50.0);
        assert_eq!(config.benchmarks.ceilings.conv_checkout_pct, 98.0);
        assert_eq!(config.benchmarks.field_averages.ctr, 2.5);
        assert_eq!(config.report.default_assistant, "gemini");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let json = r#"{ "benchmarks": { "market": { "cpc": 3.5 } } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.benchmarks.market.cpc, 3.5);
        assert_eq!(config.benchmarks.market.ctr, 2.0);
        assert_eq!(config.benchmarks.baseline.cpm, 15.0);
        assert_eq!(config.benchmarks.ceilings.ctr_pct, 15.0);
    }

    #[test]
    fn test_missing_benchmarks_section_keeps_baseline() {
        let config: AppConfig = serde_json::from_str(r#"{ "report": {} }"#).unwrap();
        assert_eq!(config.benchmarks.baseline, FunnelRates::BENCHMARK);
        assert_eq!(Benchmarks::default().baseline, FunnelRates::BENCHMARK);

        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.benchmarks.baseline.cpm, 15.0);
        assert_eq!(config.benchmarks.baseline.conv_checkout_pct, 85.0);
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "roas-projector-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[benchmarks.ceilings]\nctr_pct = 12.0\n\n[report]\nproduct_name = \"Course\"\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.benchmarks.ceilings.ctr_pct, 12.0);
        assert_eq!(config.benchmarks.ceilings.conv_lp_pct, 50.0);
        assert_eq!(config.benchmarks.baseline, FunnelRates::BENCHMARK);
        assert_eq!(config.report.product_name, "Course");
    }
}
