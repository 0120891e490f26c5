use crate::error::{ModelError, Result};
use crate::models::{ElectricityBands, HashrateUnit, MidCostMode};
use crate::schedule::{ymd, Breakpoint, FeeRamp, HalvingSchedule, Schedule};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Straight-line depreciation of the network's hardware fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareDepreciation {
    /// Purchase price per TH/s of capacity, in $/TH.
    pub cost_per_th: Schedule,
    pub depreciation_months: u32,
}

/// Every input of the cost model that is not network data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub electricity: ElectricityBands,
    pub mid_cost: MidCostMode,
    /// Markup over pure electrical cost for cooling, infrastructure and pool
    /// fees. 1.0 means no markup.
    pub overhead_factor: f64,
    /// Fleet efficiency in J/TH.
    pub efficiency: Schedule,
    pub hardware: Option<HardwareDepreciation>,
    pub fee_ratio: Option<FeeRamp>,
    pub halving: HalvingSchedule,
    /// Trailing window counted in samples, which is days only when the
    /// hashrate series has one point per day. `None` or anything below 2
    /// leaves the series raw.
    pub smoothing_window: Option<usize>,
    pub hashrate_unit: HashrateUnit,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::full()
    }
}

impl ModelConfig {
    /// Electricity, hardware depreciation, fee ramp and 14-day smoothing.
    pub fn full() -> Self {
        Self {
            electricity: ElectricityBands {
                low: 0.05,
                mid: 0.06,
                high: 0.07,
            },
            mid_cost: MidCostMode::Direct,
            overhead_factor: 1.1,
            efficiency: Schedule::Table {
                breakpoints: fleet_efficiency_eras(),
            },
            hardware: Some(HardwareDepreciation {
                cost_per_th: Schedule::Table {
                    breakpoints: vec![
                        Breakpoint::new(ymd(2020, 1, 1), 25.0),
                        Breakpoint::new(ymd(2021, 11, 1), 95.0),
                        Breakpoint::new(ymd(2023, 1, 1), 15.0),
                        Breakpoint::new(ymd(2024, 6, 1), 18.0),
                        Breakpoint::new(ymd(2025, 6, 1), 14.0),
                    ],
                },
                depreciation_months: 24,
            }),
            fee_ratio: Some(FeeRamp {
                transition: ymd(2024, 4, 20),
                past: 0.03,
                now: 0.05,
                ramp_days: 180,
            }),
            halving: HalvingSchedule::bitcoin(),
            smoothing_window: Some(14),
            hashrate_unit: HashrateUnit::TeraHash,
        }
    }

    /// Operating cost only: the full model without hardware depreciation.
    pub fn electrical() -> Self {
        Self {
            hardware: None,
            ..Self::full()
        }
    }

    /// Pure electrical cash cost at a flat 25 J/TH, no fees, no smoothing.
    pub fn cash_cost() -> Self {
        Self {
            overhead_factor: 1.0,
            efficiency: Schedule::Constant { value: 25.0 },
            hardware: None,
            fee_ratio: None,
            smoothing_window: None,
            ..Self::full()
        }
    }

    /// Check every parameter once so the formula never sees bad input.
    pub fn validate(&self) -> Result<()> {
        let bands = self.electricity;
        for (name, value) in [
            ("electricity.low", bands.low),
            ("electricity.mid", bands.mid),
            ("electricity.high", bands.high),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ModelError::parameter(name, format!("{} must be a positive $/kWh price", value)));
            }
        }
        if !(bands.low <= bands.mid && bands.mid <= bands.high) {
            return Err(ModelError::parameter(
                "electricity",
                format!("bands must satisfy low <= mid <= high, got {}/{}/{}", bands.low, bands.mid, bands.high),
            ));
        }
        if !self.overhead_factor.is_finite() || self.overhead_factor < 1.0 {
            return Err(ModelError::parameter(
                "overhead_factor",
                format!("{} must be at least 1.0", self.overhead_factor),
            ));
        }

        // Lookback schedules are anchored later; any date checks the shape.
        let any_date = NaiveDate::default();
        self.efficiency.resolve("efficiency", any_date)?;
        if let Some(hardware) = &self.hardware {
            hardware.cost_per_th.resolve("hardware.cost_per_th", any_date)?;
            if hardware.depreciation_months == 0 {
                return Err(ModelError::parameter("hardware.depreciation_months", "must be at least one month"));
            }
        }
        if let Some(fees) = &self.fee_ratio {
            fees.validate()?;
        }
        self.halving.validate()
    }
}

/// Named starting points for a [`ModelConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelPreset {
    #[default]
    Full,
    Electrical,
    CashCost,
}

impl ModelPreset {
    pub fn config(&self) -> ModelConfig {
        match self {
            ModelPreset::Full => ModelConfig::full(),
            ModelPreset::Electrical => ModelConfig::electrical(),
            ModelPreset::CashCost => ModelConfig::cash_cost(),
        }
    }
}

/// An optional component that a settings file can either switch on or off
/// (`hardware = false`) or replace outright (`[model.hardware]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Switch<T> {
    Enabled(bool),
    Set(T),
}

impl<T: Clone> Switch<T> {
    /// `true` keeps `current`, falling back to `fallback` when the preset has
    /// the component switched off.
    fn apply(self, current: Option<T>, fallback: Option<T>) -> Option<T> {
        match self {
            Switch::Enabled(false) => None,
            Switch::Enabled(true) => current.or(fallback),
            Switch::Set(value) => Some(value),
        }
    }
}

/// Partial model settings layered over a preset. Every field left out keeps
/// the preset's value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelOverrides {
    pub preset: Option<ModelPreset>,
    pub electricity: Option<ElectricityBands>,
    pub mid_cost: Option<MidCostMode>,
    pub overhead_factor: Option<f64>,
    pub efficiency: Option<Schedule>,
    pub hardware: Option<Switch<HardwareDepreciation>>,
    pub fee_ratio: Option<Switch<FeeRamp>>,
    pub halving: Option<HalvingSchedule>,
    /// 0 or 1 turns smoothing off.
    pub smoothing_window: Option<usize>,
    pub hashrate_unit: Option<HashrateUnit>,
}

impl ModelOverrides {
    /// Builds the run's configuration. An explicit `preset` argument wins
    /// over the `preset` key; without either the full model is the base.
    pub fn resolve(&self, preset: Option<ModelPreset>) -> ModelConfig {
        let base = preset.or(self.preset).unwrap_or_default().config();
        let full = ModelConfig::full();
        let overrides = self.clone();

        ModelConfig {
            electricity: overrides.electricity.unwrap_or(base.electricity),
            mid_cost: overrides.mid_cost.unwrap_or(base.mid_cost),
            overhead_factor: overrides.overhead_factor.unwrap_or(base.overhead_factor),
            efficiency: overrides.efficiency.unwrap_or(base.efficiency),
            hardware: match overrides.hardware {
                Some(switch) => switch.apply(base.hardware, full.hardware),
                None => base.hardware,
            },
            fee_ratio: match overrides.fee_ratio {
                Some(switch) => switch.apply(base.fee_ratio, full.fee_ratio),
                None => base.fee_ratio,
            },
            halving: overrides.halving.unwrap_or(base.halving),
            smoothing_window: match overrides.smoothing_window {
                Some(window) if window < 2 => None,
                Some(window) => Some(window),
                None => base.smoothing_window,
            },
            hashrate_unit: overrides.hashrate_unit.unwrap_or(base.hashrate_unit),
        }
    }
}

/// Approximate network-average efficiency by hardware generation, in J/TH.
fn fleet_efficiency_eras() -> Vec<Breakpoint> {
    vec![
        Breakpoint::new(ymd(2016, 1, 1), 250.0),
        Breakpoint::new(ymd(2017, 6, 1), 110.0),
        Breakpoint::new(ymd(2019, 1, 1), 75.0),
        Breakpoint::new(ymd(2020, 6, 1), 50.0),
        Breakpoint::new(ymd(2022, 1, 1), 38.0),
        Breakpoint::new(ymd(2023, 6, 1), 30.0),
        Breakpoint::new(ymd(2024, 6, 1), 25.0),
        Breakpoint::new(ymd(2025, 6, 1), 21.0),
    ]
}
