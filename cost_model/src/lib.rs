pub mod alignment;
pub mod calculator;
pub mod config;
pub mod data_loader;
pub mod error;
pub mod models;
pub mod report;
pub mod schedule;
pub mod smoothing;

pub use calculator::CostCalculator;
pub use config::{HardwareDepreciation, ModelConfig, ModelOverrides, ModelPreset, Switch};
pub use data_loader::{PriceHistory, PriceHistoryLoader};
pub use error::{ModelError, Result};
pub use models::{AlignedDay, ChartPoint, CostRow, CostScenario, DailySeries, HashrateUnit, MidCostMode};
pub use report::CostReport;
pub use schedule::{Breakpoint, FeeRamp, HalvingSchedule, Schedule};
