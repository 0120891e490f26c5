use crate::error::{ModelError, Result};
use crate::models::DailySeries;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const DATE_COLUMNS: &[&str] = &["date", "timestamp", "time", "day"];
const PRICE_COLUMNS: &[&str] = &["close", "closing_price", "closing price", "price", "adj close", "adj_close"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%b %d, %Y", "%d-%m-%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Daily closing prices read from a local CSV file.
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    pub prices: DailySeries,
    pub rows_read: usize,
    pub rows_skipped: usize,
}

pub struct PriceHistoryLoader {
    path: PathBuf,
}

impl PriceHistoryLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file does not exist.
    pub fn load(&self) -> Result<Option<PriceHistory>> {
        if !self.path.exists() {
            info!("No price history at {}, using live prices only", self.path.display());
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let history = Self::read(file)?;
        info!(
            "Loaded {} daily prices from {} ({} rows skipped)",
            history.prices.len(),
            self.path.display(),
            history.rows_skipped
        );
        Ok(Some(history))
    }

    /// Parse CSV with a header row. Rows whose date or price cannot be parsed
    /// are skipped and counted.
    pub fn read<R: Read>(reader: R) -> Result<PriceHistory> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let date_idx = find_column(&headers, DATE_COLUMNS).ok_or_else(|| ModelError::MissingColumn("date".to_string()))?;
        let price_idx =
            find_column(&headers, PRICE_COLUMNS).ok_or_else(|| ModelError::MissingColumn("close".to_string()))?;

        let mut history = PriceHistory::default();
        for (line, record) in csv_reader.records().enumerate() {
            history.rows_read += 1;
            let parsed = record.ok().and_then(|record| {
                let date = record.get(date_idx).and_then(parse_date)?;
                let price = record.get(price_idx).and_then(parse_price)?;
                Some((date, price))
            });

            match parsed {
                Some((date, price)) => {
                    history.prices.insert(date, price);
                }
                None => {
                    debug!("Skipping unparsable price history row {}", line + 2);
                    history.rows_skipped += 1;
                }
            }
        }

        Ok(history)
    }
}

fn find_column(headers: &StringRecord, candidates: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| h.trim().trim_end_matches('*').to_ascii_lowercase())
        .collect();
    candidates
        .iter()
        .find_map(|candidate| normalized.iter().position(|h| h == candidate))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim().trim_matches('"');
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    {
        return Some(date);
    }
    if let Some(datetime) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(datetime.date());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_utc().date())
}

fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' ' | '"'))
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price > 0.0)
}
