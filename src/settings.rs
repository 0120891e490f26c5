use crate::fetcher::FetchSettings;
use anyhow::{Context, Result};
use cost_model::{ModelConfig, ModelOverrides, ModelPreset};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of the optional TOML settings file. Every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fetch: FetchSettings,
    /// Values layered over the chosen preset.
    pub model: ModelOverrides,
    pub price_history: Option<PathBuf>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading settings file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing settings file {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// The model for this run: `preset` (from the command line) or the
    /// file's `[model] preset`, with the rest of `[model]` applied on top.
    pub fn model_config(&self, preset: Option<ModelPreset>) -> ModelConfig {
        self.model.resolve(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cost_model::{HashrateUnit, MidCostMode, Schedule};
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.fetch.timespan, "2years");
        assert_eq!(settings.model, ModelOverrides::default());
        assert_eq!(settings.model_config(None), ModelConfig::full());
        assert!(!settings.fetch.sampled);
    }

    #[test]
    fn test_full_settings_deserialization() {
        let toml_str = r#"
            price_history = "history/btc.csv"

            [fetch]
            timespan = "365days"
            timeout_secs = 10

            [model]
            overhead_factor = 1.05
            mid_cost = "mean_of_bounds"
            hashrate_unit = "giga_hash"
            smoothing_window = 7

            [model.electricity]
            low = 0.04
            mid = 0.06
            high = 0.08

            [model.efficiency]
            shape = "table"
            breakpoints = [
                { date = "2022-01-01", value = 38.0 },
                { date = "2024-06-01", value = 25.0 },
            ]
        "#;
        let settings = Settings::parse(toml_str).unwrap();
        assert_eq!(settings.price_history, Some(PathBuf::from("history/btc.csv")));
        assert_eq!(settings.fetch.timespan, "365days");
        assert_eq!(settings.fetch.timeout_secs, 10);
        assert!(!settings.fetch.sampled);

        let model = settings.model_config(None);
        assert_eq!(model.overhead_factor, 1.05);
        assert_eq!(model.mid_cost, MidCostMode::MeanOfBounds);
        assert_eq!(model.hashrate_unit, HashrateUnit::GigaHash);
        assert_eq!(model.smoothing_window, Some(7));
        assert_eq!(model.electricity.low, 0.04);
        assert!(matches!(model.efficiency, Schedule::Table { ref breakpoints } if breakpoints.len() == 2));
        assert!(model.validate().is_ok());
        assert_eq!(model.hardware, ModelConfig::full().hardware);
    }

    #[test]
    fn test_model_section_builds_electrical_variant() {
        let toml_str = r#"
            [model]
            overhead_factor = 1.05
            hardware = false
        "#;
        let model = Settings::parse(toml_str).unwrap().model_config(None);
        assert!(model.hardware.is_none());
        assert_eq!(model.fee_ratio, ModelConfig::electrical().fee_ratio);
        assert_eq!(
            model,
            ModelConfig {
                overhead_factor: 1.05,
                ..ModelConfig::electrical()
            }
        );
    }

    #[test]
    fn test_model_section_names_its_preset() {
        let toml_str = r#"
            [model]
            preset = "cash_cost"
            smoothing_window = 7
        "#;
        let settings = Settings::parse(toml_str).unwrap();
        let model = settings.model_config(None);
        assert!(model.hardware.is_none());
        assert!(model.fee_ratio.is_none());
        assert_eq!(model.efficiency, Schedule::Constant { value: 25.0 });
        assert_eq!(model.smoothing_window, Some(7));

        // --preset on the command line still applies under a [model] section
        let model = settings.model_config(Some(ModelPreset::Full));
        assert_eq!(model.hardware, ModelConfig::full().hardware);
        assert_eq!(model.smoothing_window, Some(7));
    }

    #[test]
    fn test_model_section_switches_fees_off_and_sets_hardware() {
        let toml_str = r#"
            [model]
            preset = "electrical"
            fee_ratio = false

            [model.hardware]
            depreciation_months = 36

            [model.hardware.cost_per_th]
            shape = "constant"
            value = 20.0
        "#;
        let model = Settings::parse(toml_str).unwrap().model_config(None);
        assert!(model.fee_ratio.is_none());
        let hardware = model.hardware.unwrap();
        assert_eq!(hardware.depreciation_months, 36);
        assert_eq!(hardware.cost_per_th, Schedule::Constant { value: 20.0 });
    }

    #[test]
    fn test_model_section_rejects_unknown_keys() {
        assert!(Settings::parse("[model]
overhead = 1.2
").is_err());
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("reading settings file"));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetch]\nsampled = true").unwrap();
        file.flush().unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert!(settings.fetch.sampled);
        assert_eq!(settings.fetch.timeout_secs, 30);
    }
}
