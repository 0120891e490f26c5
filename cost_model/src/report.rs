use crate::config::ModelConfig;
use crate::error::{ModelError, Result};
use crate::models::CostRow;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The persisted result of one run. Arrays are index-aligned with `dates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub dates: Vec<String>,
    pub btc_prices: Vec<f64>,
    pub mining_cost_low: Vec<f64>,
    pub mining_cost_mid: Vec<f64>,
    pub mining_cost_high: Vec<f64>,
    /// TH/s
    pub hashrates: Vec<f64>,

    pub current_price: f64,
    pub current_cost_low: f64,
    pub current_cost_mid: f64,
    pub current_cost_high: f64,
    pub current_hashrate_eh: f64,
    pub last_updated: String,
    pub parameters: ModelConfig,
}

#[derive(Debug, Serialize)]
struct CsvRow {
    date: NaiveDate,
    btc_price: f64,
    hashrate_th: f64,
    mining_cost_low: f64,
    mining_cost_mid: f64,
    mining_cost_high: f64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl CostReport {
    pub fn build(rows: &[CostRow], parameters: &ModelConfig, generated_at: DateTime<Utc>) -> Result<Self> {
        let latest = rows.last().ok_or(ModelError::EmptyAlignment)?;

        Ok(Self {
            dates: rows.iter().map(|r| r.date.format("%Y-%m-%d").to_string()).collect(),
            btc_prices: rows.iter().map(|r| round2(r.price)).collect(),
            mining_cost_low: rows.iter().map(|r| round2(r.cost_low)).collect(),
            mining_cost_mid: rows.iter().map(|r| round2(r.cost_mid)).collect(),
            mining_cost_high: rows.iter().map(|r| round2(r.cost_high)).collect(),
            hashrates: rows.iter().map(|r| round2(r.hashrate_th)).collect(),
            current_price: round2(latest.price),
            current_cost_low: round2(latest.cost_low),
            current_cost_mid: round2(latest.cost_mid),
            current_cost_high: round2(latest.cost_high),
            current_hashrate_eh: round2(latest.hashrate_th / 1e6),
            last_updated: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            parameters: parameters.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

/// One line per day, monetary values rounded to cents.
pub fn write_csv(rows: &[CostRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(CsvRow {
            date: row.date,
            btc_price: round2(row.price),
            hashrate_th: round2(row.hashrate_th),
            mining_cost_low: round2(row.cost_low),
            mining_cost_mid: round2(row.cost_mid),
            mining_cost_high: round2(row.cost_high),
        })?;
    }
    writer.flush()?;
    Ok(())
}
