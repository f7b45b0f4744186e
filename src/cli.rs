use clap::{Parser, Subcommand};

/// Command-line client for the monsoon rainfall and flood sensor API.
#[derive(Debug, Parser)]
#[command(
    name = "monsoon",
    version,
    about = "Query rainfall, flood and sensor data from the monsoon API"
)]
pub struct Cli {
    /// Account name; prompted for when not set here, in MONSOON_USERNAME or in .monsoonrc.
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// API key; prompted for when not set here, in MONSOON_KEY or in .monsoonrc.
    #[arg(long, global = true)]
    pub apikey: Option<String>,

    /// Override the API base URL.
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Skip TLS certificate verification.
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rainfall totals per sensor across one or more networks.
    PrecipTotals(PrecipTotalsArgs),
    /// Unprocessed sensor readings for a date or date range.
    SensorReadings(DateRangeArgs),
    /// Flood gauge data for a date or date range.
    FloodData(DateRangeArgs),
    /// Monsoon-season (June 15 to September 30) data for a range of years.
    MonsoonData(MonsoonDataArgs),
    /// Name, location and type of sensors in a network.
    SensorMetadata(SensorMetadataArgs),
}

impl Command {
    pub fn output(&self) -> &OutputArgs {
        match self {
            Command::PrecipTotals(a) => &a.output,
            Command::SensorReadings(a) | Command::FloodData(a) => &a.output,
            Command::MonsoonData(a) => &a.output,
            Command::SensorMetadata(a) => &a.output,
        }
    }

    /// File stem used when `--csvfile` is given without a path.
    pub fn csv_stem(&self) -> &'static str {
        match self {
            Command::PrecipTotals(_) => "precip_totals",
            Command::SensorReadings(_) => "sensor_readings",
            Command::FloodData(_) => "flood_data",
            Command::MonsoonData(_) => "monsoon_data",
            Command::SensorMetadata(_) => "sensor_metadata",
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct OutputArgs {
    /// Write CSV to PATH instead of printing JSON (defaults to <command>.csv).
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
    pub csvfile: Option<String>,
}

impl OutputArgs {
    /// Resolved CSV path, if CSV output was requested.
    pub fn csv_path(&self, stem: &str) -> Option<String> {
        self.csvfile.as_ref().map(|p| {
            if p.is_empty() {
                format!("{stem}.csv")
            } else {
                p.clone()
            }
        })
    }
}

#[derive(Debug, clap::Args)]
pub struct PrecipTotalsArgs {
    /// Range start date (YYYY-MM-DD).
    #[arg(long = "startdate")]
    pub start_date: String,

    /// Range end date (YYYY-MM-DD).
    #[arg(long = "enddate")]
    pub end_date: String,

    /// Network(s) to query; join several with '-', e.g. pima_fcd-rainlog.
    #[arg(long)]
    pub networks: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, clap::Args)]
pub struct DateRangeArgs {
    #[arg(long)]
    pub network: String,

    /// Date, or start of the range (YYYY-MM-DD).
    #[arg(long = "startdate")]
    pub start_date: String,

    /// End of the range (YYYY-MM-DD).
    #[arg(long = "enddate", default_value = "")]
    pub end_date: String,

    /// Restrict to one sensor id.
    #[arg(long, default_value = "")]
    pub sensor: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, clap::Args)]
pub struct MonsoonDataArgs {
    #[arg(long)]
    pub network: String,

    /// First monsoon year (YYYY).
    #[arg(long = "startyear")]
    pub start_year: String,

    /// Last monsoon year, inclusive (YYYY).
    #[arg(long = "endyear")]
    pub end_year: String,

    #[arg(long, default_value = "")]
    pub sensor: String,

    /// Per-reading delta values with timestamps instead of season totals.
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, clap::Args)]
pub struct SensorMetadataArgs {
    #[arg(long)]
    pub network: String,

    /// Single sensor id; all sensors in the network when omitted.
    #[arg(long, default_value = "")]
    pub sensor: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn precip_totals_parses_with_globals() {
        let cli = Cli::try_parse_from([
            "monsoon",
            "--username",
            "alice",
            "precip-totals",
            "--startdate",
            "2021-06-15",
            "--enddate",
            "2021-09-30",
            "--networks",
            "pima_fcd-rainlog",
            "-vv",
        ])
        .expect("precip-totals should parse");

        assert_eq!(cli.username.as_deref(), Some("alice"));
        assert_eq!(cli.verbose, 2);
        match &cli.command {
            Command::PrecipTotals(args) => {
                assert_eq!(args.networks, "pima_fcd-rainlog");
                assert_eq!(args.output.csv_path("precip_totals"), None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let cli = Cli::try_parse_from([
            "monsoon",
            "sensor-readings",
            "--network",
            "pima",
            "--startdate",
            "2021-07-01",
        ])
        .expect("sensor-readings should parse");

        match &cli.command {
            Command::SensorReadings(args) => {
                assert_eq!(args.end_date, "");
                assert_eq!(args.sensor, "");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn csvfile_without_path_uses_command_name() {
        let cli = Cli::try_parse_from([
            "monsoon",
            "sensor-metadata",
            "--network",
            "pima",
            "--csvfile",
        ])
        .expect("sensor-metadata should parse");

        let stem = cli.command.csv_stem();
        assert_eq!(
            cli.command.output().csv_path(stem).as_deref(),
            Some("sensor_metadata.csv")
        );
    }

    #[test]
    fn csvfile_with_path_is_kept() {
        let cli = Cli::try_parse_from([
            "monsoon",
            "monsoon-data",
            "--network",
            "pima",
            "--startyear",
            "2019",
            "--endyear",
            "2021",
            "--raw",
            "--csvfile",
            "out/seasons.csv",
        ])
        .expect("monsoon-data should parse");

        match &cli.command {
            Command::MonsoonData(args) => {
                assert!(args.raw);
                assert_eq!(
                    args.output.csv_path("monsoon_data").as_deref(),
                    Some("out/seasons.csv")
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let err = Cli::try_parse_from(["monsoon", "flood-data", "--network", "pima"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
