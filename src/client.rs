use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::time::Duration;

use crate::config::load_config;
use crate::error::{MonsoonError, format_api_message};
use crate::query::{
    FloodData, MonsoonData, PrecipTotals, Query, SensorMetadata, SensorReadings, request_url,
};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base API URL, typically `https://api.air.arizona.edu`.
    pub url: String,
    pub username: String,
    /// API key exchanged for a bearer token at login.
    pub key: String,
    /// Whether to verify TLS certificates.
    pub verify: bool,
    /// Per-request timeout, login included.
    pub timeout: Duration,
}

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// An authenticated client for the monsoon API.
///
/// Construction logs in once; every query reuses the resulting token. An
/// expired token is not refreshed.
#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    session: Session,

    timeout: Duration,
    progress: bool,

    http: HttpClient,
}

impl Client {
    /// Creates a client using environment variables and/or `.monsoonrc`.
    ///
    /// This is equivalent to `Client::new(None, None, None, None)`.
    pub fn from_env() -> Result<Self, MonsoonError> {
        Self::new(None, None, None, None)
    }

    /// Creates a client using (in order of precedence):
    /// - explicit arguments
    /// - environment variables `MONSOON_URL` / `MONSOON_USERNAME` / `MONSOON_KEY`
    /// - config file from `MONSOON_RC` or `.monsoonrc`
    pub fn new(
        url: Option<String>,
        username: Option<String>,
        key: Option<String>,
        verify: Option<bool>,
    ) -> Result<Self, MonsoonError> {
        let cfg = load_config(url, username, key, verify)?;
        Self::from_config(cfg)
    }

    /// Builds the HTTP client and logs in.
    pub fn from_config(cfg: ClientConfig) -> Result<Self, MonsoonError> {
        Url::parse(&cfg.url).map_err(|e| MonsoonError::InvalidUrl {
            url: cfg.url.clone(),
            reason: e.to_string(),
        })?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("monsoon-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("monsoon-rs")),
        );

        let mut builder = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(cfg.timeout);

        if !cfg.verify {
            tracing::warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().map_err(MonsoonError::HttpClient)?;
        let session = Session::authenticate(&http, &cfg.url, &cfg.username, &cfg.key)?;

        Ok(Self {
            url: cfg.url,
            session,
            timeout: cfg.timeout,
            progress: true,
            http,
        })
    }

    /// Overrides the timeout for queries made after login. To bound the login
    /// request as well, set [`ClientConfig::timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shows a spinner on stderr while a query is in flight (terminals only).
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Rainfall totals per sensor in `networks` between two dates.
    ///
    /// `networks` may join several networks with `-` (`"pima_fcd-rainlog"`).
    pub fn precip_totals(
        &self,
        start_date: &str,
        end_date: &str,
        networks: &str,
    ) -> Result<Value, MonsoonError> {
        self.query(&PrecipTotals::new(start_date, end_date, networks))
    }

    /// Unprocessed readings. Empty `end_date`/`sensor` mean "not supplied".
    pub fn sensor_readings(
        &self,
        network: &str,
        start_date: &str,
        end_date: &str,
        sensor: &str,
    ) -> Result<Value, MonsoonError> {
        self.query(
            &SensorReadings::new(network, start_date)
                .with_end_date(end_date)
                .with_sensor(sensor),
        )
    }

    pub fn flood_data(
        &self,
        network: &str,
        start_date: &str,
        end_date: &str,
        sensor: &str,
    ) -> Result<Value, MonsoonError> {
        self.query(
            &FloodData::new(network, start_date)
                .with_end_date(end_date)
                .with_sensor(sensor),
        )
    }

    /// Monsoon-season data for `start_year..=end_year`.
    pub fn monsoon_data(
        &self,
        network: &str,
        start_year: &str,
        end_year: &str,
        sensor: &str,
        raw: Option<bool>,
    ) -> Result<Value, MonsoonError> {
        let mut query = MonsoonData::new(network, start_year, end_year).with_sensor(sensor);
        if let Some(raw) = raw {
            query = query.with_raw(raw);
        }
        self.query(&query)
    }

    pub fn sensor_metadata(&self, network: &str, sensor: &str) -> Result<Value, MonsoonError> {
        self.query(&SensorMetadata::new(network).with_sensor(sensor))
    }

    /// Validates `query`, sends it and returns the decoded body unchanged.
    ///
    /// Nothing is sent when validation fails.
    pub fn query<Q: Query>(&self, query: &Q) -> Result<Value, MonsoonError> {
        query.validate()?;
        let url = request_url(&self.url, query)?;
        self.api_json(url)
    }

    fn api_json(&self, url: Url) -> Result<Value, MonsoonError> {
        let url_text = url.to_string();
        tracing::debug!(url = %url_text, "GET");

        let spinner = self.spinner(url.path());
        let result = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.session.authorization().clone())
            .timeout(self.timeout)
            .send();
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let resp = result.map_err(|source| MonsoonError::Transport {
            url: url_text.clone(),
            source,
        })?;

        let status = resp.status();
        let text = resp.text().map_err(|source| MonsoonError::Transport {
            url: url_text.clone(),
            source,
        })?;

        if !status.is_success() {
            tracing::warn!(%status, url = %url_text, "data request failed");
            return Err(MonsoonError::Api {
                status,
                url: url_text,
                message: format_api_message(&text),
            });
        }

        serde_json::from_str(&text).map_err(|source| MonsoonError::Decode {
            url: url_text,
            status,
            source,
        })
    }

    fn spinner(&self, path: &str) -> Option<ProgressBar> {
        if !self.progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg} {elapsed}") {
            pb.set_style(style);
        }
        pb.set_message(format!("querying {}", path));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}
