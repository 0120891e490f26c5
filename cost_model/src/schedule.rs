//! Date-driven parameter schedules.
//!
//! Every parameter of the cost model that drifts over time is described by one
//! of the types here. All lookups are total: dates before or after the known
//! range clamp to the boundary value.

use crate::error::{ModelError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Reward paid by the first block era, in BTC.
pub const BITCOIN_GENESIS_REWARD: f64 = 50.0;

/// Builds a date from literal calendar components.
pub(crate) fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("literal calendar date")
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl Breakpoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// How a parameter moves through time. Resolved into an [`Interpolator`]
/// before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Schedule {
    /// Flat value for every date.
    Constant { value: f64 },
    /// Two anchors on fixed calendar dates.
    Linear { past: Breakpoint, now: Breakpoint },
    /// Two anchors `days` apart, the later one sitting on the as-of date of
    /// the data set being evaluated.
    Lookback { days: u32, past: f64, now: f64 },
    /// One breakpoint per hardware era.
    Table { breakpoints: Vec<Breakpoint> },
}

impl Schedule {
    /// Turn the schedule into a breakpoint table. `as_of` only matters for
    /// [`Schedule::Lookback`].
    pub fn resolve(&self, name: &str, as_of: NaiveDate) -> Result<Interpolator> {
        let points = match self {
            Schedule::Constant { value } => vec![Breakpoint::new(as_of, *value)],
            Schedule::Linear { past, now } => vec![*past, *now],
            Schedule::Lookback { days, past, now } => {
                if *days == 0 {
                    return Err(ModelError::schedule(name, "lookback window must be at least one day"));
                }
                let start = as_of
                    .checked_sub_signed(Duration::days(i64::from(*days)))
                    .ok_or_else(|| ModelError::schedule(name, "lookback window starts before the calendar range"))?;
                vec![Breakpoint::new(start, *past), Breakpoint::new(as_of, *now)]
            }
            Schedule::Table { breakpoints } => breakpoints.clone(),
        };
        Interpolator::new(name, points)
    }
}

/// Piecewise-linear lookup over a sorted, non-empty breakpoint table.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolator {
    points: Vec<Breakpoint>,
}

impl Interpolator {
    pub fn new(name: &str, points: Vec<Breakpoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ModelError::schedule(name, "at least one breakpoint is required"));
        }
        if let Some(bad) = points.iter().find(|p| !p.value.is_finite() || p.value < 0.0) {
            return Err(ModelError::schedule(
                name,
                format!("value {} at {} must be finite and non-negative", bad.value, bad.date),
            ));
        }
        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(ModelError::schedule(
                name,
                format!("breakpoint {} is not after {}", pair[1].date, pair[0].date),
            ));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Breakpoint] {
        &self.points
    }

    pub fn value_at(&self, date: NaiveDate) -> f64 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if date <= first.date {
            return first.value;
        }
        if date >= last.date {
            return last.value;
        }

        // first.date < date < last.date, so 1 <= upper < len
        let upper = self.points.partition_point(|p| p.date <= date);
        let a = self.points[upper - 1];
        let b = self.points[upper];
        let span = (b.date - a.date).num_days() as f64;
        let elapsed = (date - a.date).num_days() as f64;
        a.value + (b.value - a.value) * (elapsed / span)
    }
}

/// Share of miner revenue that comes from transaction fees, expressed as a
/// fraction of the block subsidy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeRamp {
    pub transition: NaiveDate,
    pub past: f64,
    pub now: f64,
    pub ramp_days: u32,
}

impl FeeRamp {
    pub fn ratio_at(&self, date: NaiveDate) -> f64 {
        if date < self.transition {
            return self.past;
        }
        let elapsed = (date - self.transition).num_days() as f64;
        let fraction = if self.ramp_days == 0 {
            1.0
        } else {
            (elapsed / f64::from(self.ramp_days)).min(1.0)
        };
        if fraction >= 1.0 {
            return self.now;
        }
        self.past + (self.now - self.past) * fraction
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("fee_ratio.past", self.past), ("fee_ratio.now", self.now)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::parameter(field, format!("{} must be a finite fraction >= 0", value)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalvingSchedule {
    pub genesis_reward: f64,
    pub dates: Vec<NaiveDate>,
}

impl HalvingSchedule {
    /// Mainnet halvings at blocks 210k, 420k, 630k and 840k.
    pub fn bitcoin() -> Self {
        Self {
            genesis_reward: BITCOIN_GENESIS_REWARD,
            dates: vec![
                ymd(2012, 11, 28),
                ymd(2016, 7, 9),
                ymd(2020, 5, 11),
                ymd(2024, 4, 20),
            ],
        }
    }

    /// Halvings take effect on their own date.
    pub fn reward_at(&self, date: NaiveDate) -> f64 {
        let halvings = self.dates.partition_point(|d| *d <= date);
        self.genesis_reward / 2f64.powi(halvings as i32)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.genesis_reward.is_finite() || self.genesis_reward <= 0.0 {
            return Err(ModelError::InvalidHalvingSchedule(format!(
                "genesis reward {} must be positive",
                self.genesis_reward
            )));
        }
        if let Some(pair) = self.dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ModelError::InvalidHalvingSchedule(format!(
                "halving {} is not after {}",
                pair[1], pair[0]
            )));
        }
        Ok(())
    }
}
