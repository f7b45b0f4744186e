//! A small Rust client for the monsoon rainfall and flood sensor API.
//!
//! The flow is: log in once to obtain a bearer token, then issue read-only
//! queries (precipitation totals, sensor readings, flood data, monsoon-season
//! data, sensor metadata). Dates and years are validated before anything is
//! sent, and responses come back as untyped JSON.
//!
//! ## Quick start
//! - Configure credentials via environment variables (`MONSOON_USERNAME`,
//!   `MONSOON_KEY`, optionally `MONSOON_URL`) or a `.monsoonrc` file (current
//!   directory or home directory).
//! - Call one of the query methods on [`Client`].
//!
//! ```no_run
//! use monsoon::{Client, MonsoonError};
//!
//! fn main() -> Result<(), MonsoonError> {
//!     let client = Client::from_env()?;
//!     let totals = client.precip_totals("2021-06-15", "2021-09-30", "pima_fcd-rainlog")?;
//!     println!("{}", totals);
//!
//!     let sensors = client.sensor_metadata("pima", "")?;
//!     println!("{}", sensors);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

mod client;
mod config;
mod error;
pub mod output;
mod query;
mod session;
mod util;
mod validate;

pub use client::{Client, ClientConfig, DEFAULT_TIMEOUT};
pub use config::{PartialConfig, load_config, resolve_config};
pub use error::MonsoonError;
pub use query::{
    FloodData, MonsoonData, PrecipTotals, Query, SensorMetadata, SensorReadings, request_url,
};
pub use session::Session;
pub use validate::{ValidationError, Violation, validate_date_range, validate_year_range};
