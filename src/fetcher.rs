use cost_model::{ChartPoint, HashrateUnit};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request for {chart} failed: {source}")]
    Http {
        chart: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed {chart} response: {reason}")]
    Malformed { chart: &'static str, reason: String },

    #[error("hashrate chart is in {declared} but hashrate_unit is set to {configured}")]
    UnitMismatch { declared: &'static str, configured: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub base_url: String,
    /// Charts API timespan, e.g. `2years` or `365days`.
    pub timespan: String,
    /// Let the API thin the series. Off keeps one point per day, so the
    /// smoothing window stays a window of days.
    pub sampled: bool,
    pub timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.blockchain.info".to_string(),
            timespan: "2years".to_string(),
            sampled: false,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chart {
    /// Network hashrate, served in TH/s.
    HashRate,
    /// USD market price.
    MarketPrice,
}

impl Chart {
    pub fn path(&self) -> &'static str {
        match self {
            Chart::HashRate => "hash-rate",
            Chart::MarketPrice => "market-price",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Chart::HashRate => "hashrate",
            Chart::MarketPrice => "BTC price",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    values: Vec<ChartPoint>,
}

/// One parsed chart: its samples plus the unit label the body declared.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub points: Vec<ChartPoint>,
    pub unit: Option<String>,
}

impl ChartData {
    /// The hashrate unit named by the body's `unit` label, if it names one.
    pub fn hashrate_unit(&self) -> Option<HashrateUnit> {
        let label = self.unit.as_deref()?;
        let unit = HashrateUnit::from_label(label);
        if unit.is_none() {
            warn!("Unrecognized chart unit '{}'", label);
        }
        unit
    }
}

pub struct ChartFetcher {
    client: Client,
    settings: FetchSettings,
}

impl ChartFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("btc_mining_cost/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, settings })
    }

    pub fn url(&self, chart: Chart) -> String {
        format!("{}/charts/{}", self.settings.base_url.trim_end_matches('/'), chart.path())
    }

    /// Fetch one chart. Any transport error, non-2xx status, timeout or
    /// unexpected body is a [`FetchError`].
    pub fn fetch(&self, chart: Chart) -> Result<ChartData, FetchError> {
        let url = self.url(chart);
        debug!("GET {} (timespan {})", url, self.settings.timespan);

        let http = |source| FetchError::Http {
            chart: chart.label(),
            source,
        };
        let sampled = if self.settings.sampled { "true" } else { "false" };
        let body = self
            .client
            .get(&url)
            .query(&[
                ("timespan", self.settings.timespan.as_str()),
                ("format", "json"),
                ("sampled", sampled),
            ])
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(http)?;

        let data = parse_chart(chart, &body)?;
        info!("Fetched {} {} points", data.points.len(), chart.label());
        Ok(data)
    }
}

pub fn parse_chart(chart: Chart, body: &str) -> Result<ChartData, FetchError> {
    let malformed = |reason: String| FetchError::Malformed {
        chart: chart.label(),
        reason,
    };

    let response: ChartResponse = serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;
    if let Some(status) = response.status.as_deref() {
        if status != "ok" {
            return Err(malformed(format!("status '{}'", status)));
        }
    }
    if response.values.is_empty() {
        return Err(malformed("no data points".to_string()));
    }
    if let Some(unit) = response.unit.as_deref() {
        debug!("{} chart unit: {}", chart.label(), unit);
    }
    Ok(ChartData {
        points: response.values,
        unit: response.unit,
    })
}

/// Picks the unit the hashrate series is read in. A unit set in the settings
/// file must agree with the one the chart declares; otherwise the declared
/// unit replaces the preset's.
pub fn reconcile_hashrate_unit(
    configured: Option<HashrateUnit>,
    declared: Option<HashrateUnit>,
    preset: HashrateUnit,
) -> Result<HashrateUnit, FetchError> {
    match (configured, declared) {
        (Some(configured), Some(declared)) if configured != declared => Err(FetchError::UnitMismatch {
            declared: declared.symbol(),
            configured: configured.symbol(),
        }),
        (Some(configured), _) => Ok(configured),
        (None, Some(declared)) => {
            if declared != preset {
                info!("Hashrate chart is in {}, converting to TH/s", declared.symbol());
            }
            Ok(declared)
        }
        (None, None) => Ok(preset),
    }
}
