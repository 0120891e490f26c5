use crate::config::ModelConfig;
use crate::error::Result;
use crate::models::{AlignedDay, CostRow, CostScenario, DailyBreakdown, MidCostMode, ScenarioCosts};
use crate::schedule::Interpolator;
use crate::smoothing::trailing_mean;
use chrono::NaiveDate;
use log::debug;
use rayon::prelude::*;

pub const BLOCKS_PER_DAY: f64 = 144.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const JOULES_PER_KWH: f64 = 3_600_000.0;
const DAYS_PER_MONTH: f64 = 30.0;

pub struct CostCalculator {
    config: ModelConfig,
    efficiency: Interpolator,
    hardware_cost: Option<Interpolator>,
}

impl CostCalculator {
    /// Validate `config` and resolve its schedules. `as_of` is the latest day
    /// of the data being evaluated and anchors lookback schedules.
    pub fn new(config: ModelConfig, as_of: NaiveDate) -> Result<Self> {
        config.validate()?;
        let efficiency = config.efficiency.resolve("efficiency", as_of)?;
        let hardware_cost = config
            .hardware
            .as_ref()
            .map(|h| h.cost_per_th.resolve("hardware.cost_per_th", as_of))
            .transpose()?;

        Ok(Self {
            config,
            efficiency,
            hardware_cost,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// J/TH
    pub fn efficiency_at(&self, date: NaiveDate) -> f64 {
        self.efficiency.value_at(date)
    }

    /// $/TH, when hardware depreciation is modelled.
    pub fn hardware_cost_at(&self, date: NaiveDate) -> Option<f64> {
        self.hardware_cost.as_ref().map(|h| h.value_at(date))
    }

    pub fn fee_ratio_at(&self, date: NaiveDate) -> f64 {
        self.config
            .fee_ratio
            .as_ref()
            .map(|ramp| ramp.ratio_at(date))
            .unwrap_or(0.0)
    }

    pub fn block_reward_at(&self, date: NaiveDate) -> f64 {
        self.config.halving.reward_at(date)
    }

    /// Every intermediate of the formula for one day. `hashrate_th` must
    /// already be in TH/s.
    pub fn daily_breakdown(&self, date: NaiveDate, hashrate_th: f64, electricity_price: f64) -> DailyBreakdown {
        let efficiency = self.efficiency_at(date);
        let energy_kwh = hashrate_th * efficiency * SECONDS_PER_DAY / JOULES_PER_KWH;
        let electricity_cost = energy_kwh * electricity_price * self.config.overhead_factor;

        let hardware_cost = match (&self.config.hardware, self.hardware_cost_at(date)) {
            (Some(hardware), Some(cost_per_th)) => {
                hashrate_th * cost_per_th / (f64::from(hardware.depreciation_months) * DAYS_PER_MONTH)
            }
            _ => 0.0,
        };

        let block_reward = self.block_reward_at(date);
        let fee_ratio = self.fee_ratio_at(date);
        let coins_per_day = BLOCKS_PER_DAY * block_reward * (1.0 + fee_ratio);

        DailyBreakdown {
            date,
            hashrate_th,
            efficiency_j_per_th: efficiency,
            energy_kwh,
            electricity_price,
            electricity_cost,
            hardware_cost,
            block_reward,
            fee_ratio,
            coins_per_day,
            cost_per_coin: (electricity_cost + hardware_cost) / coins_per_day,
        }
    }

    /// Cost in $ to mine one coin on `date` at `electricity_price` $/kWh.
    pub fn cost_per_coin(&self, date: NaiveDate, hashrate_th: f64, electricity_price: f64) -> f64 {
        self.daily_breakdown(date, hashrate_th, electricity_price).cost_per_coin
    }

    pub fn scenario_cost(&self, date: NaiveDate, hashrate_th: f64, scenario: CostScenario) -> f64 {
        self.scenario_costs(date, hashrate_th).get(scenario)
    }

    pub fn scenario_costs(&self, date: NaiveDate, hashrate_th: f64) -> ScenarioCosts {
        let bands = self.config.electricity;
        let low = self.cost_per_coin(date, hashrate_th, bands.low);
        let high = self.cost_per_coin(date, hashrate_th, bands.high);
        let mid = match self.config.mid_cost {
            MidCostMode::Direct => self.cost_per_coin(date, hashrate_th, bands.mid),
            MidCostMode::MeanOfBounds => (low + high) / 2.0,
        };
        ScenarioCosts { low, mid, high }
    }

    /// Cost rows for every aligned day, in input order. Raw costs are computed
    /// in parallel; smoothing runs afterwards over the finished series.
    pub fn calculate_series(&self, days: &[AlignedDay]) -> Vec<CostRow> {
        let unit = self.config.hashrate_unit;
        let raw: Vec<(f64, ScenarioCosts)> = days
            .par_iter()
            .map(|day| {
                let hashrate_th = unit.to_terahash(day.hashrate);
                (hashrate_th, self.scenario_costs(day.date, hashrate_th))
            })
            .collect();

        let window = self.config.smoothing_window.unwrap_or(1);
        let low = trailing_mean(&raw.iter().map(|(_, c)| c.low).collect::<Vec<_>>(), window);
        let mid = trailing_mean(&raw.iter().map(|(_, c)| c.mid).collect::<Vec<_>>(), window);
        let high = trailing_mean(&raw.iter().map(|(_, c)| c.high).collect::<Vec<_>>(), window);
        debug!("Computed {} daily costs (smoothing window {})", raw.len(), window);

        days.iter()
            .zip(raw.iter())
            .enumerate()
            .map(|(i, (day, (hashrate_th, _)))| CostRow {
                date: day.date,
                price: day.price,
                hashrate_th: *hashrate_th,
                cost_low: low[i],
                cost_mid: mid[i],
                cost_high: high[i],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HardwareDepreciation;
    use crate::models::{ElectricityBands, HashrateUnit};
    use crate::schedule::{Breakpoint, FeeRamp, Schedule};
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn flat_config() -> ModelConfig {
        ModelConfig {
            efficiency: Schedule::Constant { value: 38.0 },
            overhead_factor: 1.0,
            hardware: None,
            fee_ratio: None,
            smoothing_window: None,
            hashrate_unit: HashrateUnit::GigaHash,
            ..ModelConfig::full()
        }
    }

    fn calculator(config: ModelConfig) -> CostCalculator {
        CostCalculator::new(config, date(2024, 1, 1)).unwrap()
    }

    #[test]
    fn test_closed_form_cost_before_halving() {
        let calc = calculator(flat_config());
        let day = date(2024, 1, 15);
        let hashrate_th = HashrateUnit::GigaHash.to_terahash(500_000_000.0);

        // 500,000 TH/s * 38 J/TH * 86,400 s = 1.6416e12 J = 456,000 kWh
        // 456,000 kWh * $0.05 = $22,800 over 144 * 6.25 = 900 BTC
        let low = calc.cost_per_coin(day, hashrate_th, 0.05);
        assert!((low - 22_800.0 / 900.0).abs() < 0.005);

        let higher = calc.cost_per_coin(day, hashrate_th, 0.07);
        assert!(higher > low);
        assert!((higher - 31_920.0 / 900.0).abs() < 0.005);
    }

    #[test]
    fn test_breakdown_components() {
        let calc = calculator(flat_config());
        let breakdown = calc.daily_breakdown(date(2024, 1, 15), 500_000.0, 0.05);

        assert!((breakdown.energy_kwh - 456_000.0).abs() < 1e-6);
        assert!((breakdown.electricity_cost - 22_800.0).abs() < 1e-6);
        assert_eq!(breakdown.hardware_cost, 0.0);
        assert_eq!(breakdown.block_reward, 6.25);
        assert_eq!(breakdown.fee_ratio, 0.0);
        assert_eq!(breakdown.coins_per_day, 900.0);
    }

    #[test]
    fn test_halving_doubles_cost() {
        let calc = calculator(flat_config());
        let before = calc.cost_per_coin(date(2024, 4, 19), 500_000.0, 0.05);
        let after = calc.cost_per_coin(date(2024, 4, 20), 500_000.0, 0.05);
        assert!((after / before - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_cost_scales_linearly_with_hashrate() {
        let calc = calculator(flat_config());
        let day = date(2023, 3, 1);
        let base = calc.cost_per_coin(day, 300_000.0, 0.06);
        let doubled = calc.cost_per_coin(day, 600_000.0, 0.06);
        assert!((doubled / base - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_cost_increases_with_overhead_and_hardware() {
        let day = date(2024, 1, 15);
        let base = calculator(flat_config()).cost_per_coin(day, 500_000.0, 0.05);

        let with_overhead = calculator(ModelConfig {
            overhead_factor: 1.2,
            ..flat_config()
        })
        .cost_per_coin(day, 500_000.0, 0.05);
        assert!((with_overhead / base - 1.2).abs() < 1e-12);

        let hardware = |cost: f64| {
            calculator(ModelConfig {
                hardware: Some(HardwareDepreciation {
                    cost_per_th: Schedule::Constant { value: cost },
                    depreciation_months: 24,
                }),
                ..flat_config()
            })
            .cost_per_coin(day, 500_000.0, 0.05)
        };
        let cheap = hardware(10.0);
        let dear = hardware(20.0);
        assert!(cheap > base);
        assert!(dear > cheap);
        // 500,000 TH * $10/TH over 720 days, spread over 900 BTC
        assert!((cheap - base - 500_000.0 * 10.0 / 720.0 / 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_fees_reduce_cost() {
        let day = date(2025, 1, 1);
        let without = calculator(flat_config()).cost_per_coin(day, 500_000.0, 0.05);
        let with = calculator(ModelConfig {
            fee_ratio: Some(FeeRamp {
                transition: date(2024, 4, 20),
                past: 0.02,
                now: 0.05,
                ramp_days: 180,
            }),
            ..flat_config()
        })
        .cost_per_coin(day, 500_000.0, 0.05);
        assert!((without / with - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_cost_decreases_with_block_reward() {
        let calc = calculator(flat_config());
        let mut previous = 0.0;
        for day in [date(2012, 1, 1), date(2014, 1, 1), date(2018, 1, 1), date(2022, 1, 1), date(2025, 1, 1)] {
            let cost = calc.cost_per_coin(day, 500_000.0, 0.05);
            assert!(cost > previous);
            previous = cost;
        }
    }

    #[test]
    fn test_mid_modes() {
        let day = date(2024, 1, 15);
        let direct = calculator(ModelConfig {
            electricity: ElectricityBands {
                low: 0.04,
                mid: 0.05,
                high: 0.08,
            },
            ..flat_config()
        });
        let costs = direct.scenario_costs(day, 500_000.0);
        assert!(costs.low < costs.mid && costs.mid < costs.high);
        assert!((costs.mid - direct.cost_per_coin(day, 500_000.0, 0.05)).abs() < 1e-12);

        let mean = calculator(ModelConfig {
            mid_cost: MidCostMode::MeanOfBounds,
            ..direct.config().clone()
        });
        let costs = mean.scenario_costs(day, 500_000.0);
        assert!((costs.mid - (costs.low + costs.high) / 2.0).abs() < 1e-12);
        assert_eq!(mean.scenario_cost(day, 500_000.0, CostScenario::Mid), costs.mid);
    }

    #[test]
    fn test_electricity_scenario_only_changes_costs() {
        let days: Vec<AlignedDay> = (0..5)
            .map(|i| AlignedDay {
                date: date(2024, 1, 1) + Duration::days(i),
                hashrate: 500_000_000.0 + i as f64 * 1_000_000.0,
                price: 60_000.0,
            })
            .collect();

        let cheap = calculator(flat_config()).calculate_series(&days);
        let dear = calculator(ModelConfig {
            electricity: ElectricityBands {
                low: 0.07,
                mid: 0.08,
                high: 0.09,
            },
            ..flat_config()
        })
        .calculate_series(&days);

        for (a, b) in cheap.iter().zip(dear.iter()) {
            assert_eq!(a.date, b.date);
            assert_eq!(a.price, b.price);
            assert_eq!(a.hashrate_th, b.hashrate_th);
            assert!(b.cost_low > a.cost_low);
        }
    }

    #[test]
    fn test_series_smoothing_keeps_order_and_length() {
        let days: Vec<AlignedDay> = (0..30)
            .map(|i| AlignedDay {
                date: date(2023, 6, 1) + Duration::days(i),
                hashrate: 400_000_000.0 + (i % 3) as f64 * 50_000_000.0,
                price: 30_000.0,
            })
            .collect();

        let raw = calculator(flat_config()).calculate_series(&days);
        let smoothed = calculator(ModelConfig {
            smoothing_window: Some(14),
            ..flat_config()
        })
        .calculate_series(&days);

        assert_eq!(smoothed.len(), days.len());
        assert_eq!(smoothed[0].cost_mid, raw[0].cost_mid);
        assert!(smoothed.windows(2).all(|w| w[0].date < w[1].date));

        let expected: f64 = raw[..3].iter().map(|r| r.cost_high).sum::<f64>() / 3.0;
        assert!((smoothed[2].cost_high - expected).abs() < 1e-9);
        let expected: f64 = raw[16..30].iter().map(|r| r.cost_low).sum::<f64>() / 14.0;
        assert!((smoothed[29].cost_low - expected).abs() < 1e-9);
    }

    #[test]
    fn test_efficiency_table_drives_cost() {
        let calc = calculator(ModelConfig {
            efficiency: Schedule::Table {
                breakpoints: vec![
                    Breakpoint::new(date(2022, 1, 1), 40.0),
                    Breakpoint::new(date(2024, 1, 1), 20.0),
                ],
            },
            ..flat_config()
        });
        assert_eq!(calc.efficiency_at(date(2021, 1, 1)), 40.0);
        assert_eq!(calc.efficiency_at(date(2026, 1, 1)), 20.0);

        let early = calc.cost_per_coin(date(2022, 1, 1), 500_000.0, 0.05);
        let late = calc.cost_per_coin(date(2024, 1, 1), 500_000.0, 0.05);
        assert!((early / late - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ModelConfig {
            overhead_factor: 0.5,
            ..flat_config()
        };
        assert!(CostCalculator::new(config, date(2024, 1, 1)).is_err());
    }
}
