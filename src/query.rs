//! Parameter types for the five data routes.
//!
//! Each type knows its path below the API base, how to validate itself and
//! how it maps onto query-string pairs. Optional fields given as empty
//! strings are treated as absent and never reach the wire.

use reqwest::Url;

use crate::error::MonsoonError;
use crate::util::urljoin;
use crate::validate::{ValidationError, validate_date_range, validate_year_range};

/// A read-only query against one of the data routes.
pub trait Query {
    /// Path appended to the API base (empty for the root route).
    const PATH: &'static str;

    fn validate(&self) -> Result<(), ValidationError>;

    /// Query-string pairs in wire order. Absent optional fields are omitted.
    fn params(&self) -> Vec<(&'static str, String)>;
}

/// Builds the full request URL for `query` below `base`.
///
/// Does not validate the query; see [`Query::validate`].
pub fn request_url<Q: Query>(base: &str, query: &Q) -> Result<Url, MonsoonError> {
    let endpoint = urljoin(base, Q::PATH);
    Url::parse_with_params(&endpoint, query.params()).map_err(|e| MonsoonError::InvalidUrl {
        url: endpoint,
        reason: e.to_string(),
    })
}

fn optional(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.is_empty() { None } else { Some(value) }
}

fn push_opt(params: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<String>) {
    if let Some(v) = value {
        params.push((key, v.clone()));
    }
}

/// Summed rainfall per sensor across one or more networks for a date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecipTotals {
    start_date: String,
    end_date: String,
    networks: String,
}

impl PrecipTotals {
    /// `networks` may join several networks with `-`, e.g. `"pima_fcd-rainlog"`.
    /// It is sent verbatim.
    pub fn new(
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        networks: impl Into<String>,
    ) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            networks: networks.into(),
        }
    }
}

impl Query for PrecipTotals {
    const PATH: &'static str = "";

    fn validate(&self) -> Result<(), ValidationError> {
        validate_date_range(&self.start_date, Some(self.end_date.as_str()))
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("startDate", self.start_date.clone()),
            ("endDate", self.end_date.clone()),
            ("network", self.networks.clone()),
        ]
    }
}

/// Unprocessed readings for a network, or one of its sensors, on a date or date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorReadings {
    network: String,
    start_date: String,
    end_date: Option<String>,
    sensor: Option<String>,
}

impl SensorReadings {
    pub fn new(network: impl Into<String>, start_date: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            start_date: start_date.into(),
            end_date: None,
            sensor: None,
        }
    }

    pub fn with_end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = optional(end_date);
        self
    }

    pub fn with_sensor(mut self, sensor: impl Into<String>) -> Self {
        self.sensor = optional(sensor);
        self
    }
}

impl Query for SensorReadings {
    const PATH: &'static str = "/readings";

    fn validate(&self) -> Result<(), ValidationError> {
        validate_date_range(&self.start_date, self.end_date.as_deref())
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("network", self.network.clone()),
            ("startDate", self.start_date.clone()),
        ];
        push_opt(&mut params, "endDate", &self.end_date);
        push_opt(&mut params, "sensor", &self.sensor);
        params
    }
}

/// Flood gauge data for a network between two dates, optionally for one sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloodData {
    network: String,
    start_date: String,
    end_date: Option<String>,
    sensor: Option<String>,
}

impl FloodData {
    pub fn new(network: impl Into<String>, start_date: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            start_date: start_date.into(),
            end_date: None,
            sensor: None,
        }
    }

    pub fn with_end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = optional(end_date);
        self
    }

    pub fn with_sensor(mut self, sensor: impl Into<String>) -> Self {
        self.sensor = optional(sensor);
        self
    }
}

impl Query for FloodData {
    const PATH: &'static str = "/flood";

    fn validate(&self) -> Result<(), ValidationError> {
        validate_date_range(&self.start_date, self.end_date.as_deref())
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("network", self.network.clone()),
            ("startDate", self.start_date.clone()),
        ];
        push_opt(&mut params, "endDate", &self.end_date);
        push_opt(&mut params, "sensor", &self.sensor);
        params
    }
}

/// Rainfall over the monsoon season (June 15 to September 30) for an
/// inclusive range of years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonsoonData {
    network: String,
    start_year: String,
    end_year: String,
    sensor: Option<String>,
    raw: Option<bool>,
}

impl MonsoonData {
    pub fn new(
        network: impl Into<String>,
        start_year: impl Into<String>,
        end_year: impl Into<String>,
    ) -> Self {
        Self {
            network: network.into(),
            start_year: start_year.into(),
            end_year: end_year.into(),
            sensor: None,
            raw: None,
        }
    }

    pub fn with_sensor(mut self, sensor: impl Into<String>) -> Self {
        self.sensor = optional(sensor);
        self
    }

    /// When set, the service runs its delta calculation per reading and
    /// includes timestamps instead of returning season totals.
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.raw = Some(raw);
        self
    }
}

impl Query for MonsoonData {
    const PATH: &'static str = "/monsoon";

    fn validate(&self) -> Result<(), ValidationError> {
        validate_year_range(&self.start_year, Some(self.end_year.as_str()))
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("network", self.network.clone()),
            ("startYear", self.start_year.clone()),
            ("endYear", self.end_year.clone()),
        ];
        push_opt(&mut params, "sensor", &self.sensor);
        if let Some(raw) = self.raw {
            params.push(("raw", if raw { "True" } else { "False" }.to_string()));
        }
        params
    }
}

/// Name, location and type of one sensor, or of every sensor in a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorMetadata {
    network: String,
    sensor: Option<String>,
}

impl SensorMetadata {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            sensor: None,
        }
    }

    pub fn with_sensor(mut self, sensor: impl Into<String>) -> Self {
        self.sensor = optional(sensor);
        self
    }
}

impl Query for SensorMetadata {
    const PATH: &'static str = "/sensors";

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("network", self.network.clone())];
        push_opt(&mut params, "sensor", &self.sensor);
        params
    }
}
