use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One value per UTC calendar day, iterated in date order.
pub type DailySeries = BTreeMap<NaiveDate, f64>;

/// A single sample as served by the charts API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Unix timestamp in seconds.
    pub x: i64,
    pub y: f64,
}

/// A day for which both hashrate and price are known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedDay {
    pub date: NaiveDate,
    /// Network hashrate in the source's unit (see [`HashrateUnit`]).
    pub hashrate: f64,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostScenario {
    Low,
    Mid,
    High,
}

impl CostScenario {
    pub const ALL: [CostScenario; 3] = [CostScenario::Low, CostScenario::Mid, CostScenario::High];

    pub fn label(&self) -> &'static str {
        match self {
            CostScenario::Low => "low",
            CostScenario::Mid => "mid",
            CostScenario::High => "high",
        }
    }
}

/// Electricity prices in $/kWh bounding the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElectricityBands {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl ElectricityBands {
    pub fn price(&self, scenario: CostScenario) -> f64 {
        match scenario {
            CostScenario::Low => self.low,
            CostScenario::Mid => self.mid,
            CostScenario::High => self.high,
        }
    }
}

/// How the mid scenario is derived. Fixed for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidCostMode {
    /// Evaluate the formula at the mid electricity price.
    Direct,
    /// Arithmetic mean of the low and high results.
    MeanOfBounds,
}

/// Unit the raw hashrate series is expressed in. The model works in TH/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashrateUnit {
    HashPerSecond,
    KiloHash,
    MegaHash,
    GigaHash,
    TeraHash,
    PetaHash,
    ExaHash,
}

impl HashrateUnit {
    pub fn to_terahash(&self, value: f64) -> f64 {
        match self {
            HashrateUnit::HashPerSecond => value / 1e12,
            HashrateUnit::KiloHash => value / 1e9,
            HashrateUnit::MegaHash => value / 1e6,
            HashrateUnit::GigaHash => value / 1e3,
            HashrateUnit::TeraHash => value,
            HashrateUnit::PetaHash => value * 1e3,
            HashrateUnit::ExaHash => value * 1e6,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            HashrateUnit::HashPerSecond => "H/s",
            HashrateUnit::KiloHash => "KH/s",
            HashrateUnit::MegaHash => "MH/s",
            HashrateUnit::GigaHash => "GH/s",
            HashrateUnit::TeraHash => "TH/s",
            HashrateUnit::PetaHash => "PH/s",
            HashrateUnit::ExaHash => "EH/s",
        }
    }

    /// Reads the unit out of a free-form label such as `"Hash Rate TH/s"`.
    /// Returns `None` when the label names no rate unit.
    pub fn from_label(label: &str) -> Option<HashrateUnit> {
        let label = label.to_ascii_uppercase();
        let prefixed = [
            ('E', HashrateUnit::ExaHash),
            ('P', HashrateUnit::PetaHash),
            ('T', HashrateUnit::TeraHash),
            ('G', HashrateUnit::GigaHash),
            ('M', HashrateUnit::MegaHash),
            ('K', HashrateUnit::KiloHash),
        ];
        let at = label.find("H/S")?;
        match label[..at].chars().next_back() {
            Some(prefix) => match prefixed.iter().find(|(p, _)| *p == prefix) {
                Some((_, unit)) => Some(*unit),
                None if prefix.is_ascii_alphabetic() => None,
                None => Some(HashrateUnit::HashPerSecond),
            },
            None => Some(HashrateUnit::HashPerSecond),
        }
    }
}

/// Costs per coin for the three electricity scenarios on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioCosts {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl ScenarioCosts {
    pub fn get(&self, scenario: CostScenario) -> f64 {
        match scenario {
            CostScenario::Low => self.low,
            CostScenario::Mid => self.mid,
            CostScenario::High => self.high,
        }
    }
}

/// Intermediate quantities of the cost formula for one day and one price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyBreakdown {
    pub date: NaiveDate,
    pub hashrate_th: f64,
    pub efficiency_j_per_th: f64,
    pub energy_kwh: f64,
    pub electricity_price: f64,
    pub electricity_cost: f64,
    pub hardware_cost: f64,
    pub block_reward: f64,
    pub fee_ratio: f64,
    pub coins_per_day: f64,
    pub cost_per_coin: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    pub date: NaiveDate,
    pub price: f64,
    pub hashrate_th: f64,
    pub cost_low: f64,
    pub cost_mid: f64,
    pub cost_high: f64,
}

impl CostRow {
    /// Price over mid cost, in percent.
    pub fn margin_pct(&self) -> Option<f64> {
        if self.cost_mid > 0.0 {
            Some((self.price - self.cost_mid) / self.cost_mid * 100.0)
        } else {
            None
        }
    }
}
