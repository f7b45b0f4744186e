use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, bail};
use clap::Parser;
use monsoon::{Client, output, resolve_config};
use serde_json::Value;

mod cli;
mod logging;

use cli::{Cli, Command};

fn main() {
    if let Err(error) = run() {
        eprintln!("monsoon error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let client = connect(&cli)?;

    let data = match &cli.command {
        Command::PrecipTotals(a) => client.precip_totals(&a.start_date, &a.end_date, &a.networks)?,
        Command::SensorReadings(a) => {
            client.sensor_readings(&a.network, &a.start_date, &a.end_date, &a.sensor)?
        }
        Command::FloodData(a) => {
            client.flood_data(&a.network, &a.start_date, &a.end_date, &a.sensor)?
        }
        Command::MonsoonData(a) => client.monsoon_data(
            &a.network,
            &a.start_year,
            &a.end_year,
            &a.sensor,
            Some(a.raw),
        )?,
        Command::SensorMetadata(a) => client.sensor_metadata(&a.network, &a.sensor)?,
    };

    emit(&data, &cli.command)
}

fn connect(cli: &Cli) -> anyhow::Result<Client> {
    let mut partial = resolve_config(
        cli.url.clone(),
        cli.username.clone(),
        cli.apikey.clone(),
        cli.insecure.then_some(false),
    )?;

    if partial.username.is_none() {
        partial.username = Some(prompt("Username")?);
    }
    if partial.key.is_none() {
        partial.key = Some(read_confirmed_key(|label: &str| rpassword::prompt_password(label))?);
    }

    let client = Client::from_config(partial.complete()?)?.with_progress(true);
    Ok(client)
}

fn prompt(label: &str) -> anyhow::Result<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{label}: ")?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .with_context(|| format!("failed to read {label}"))?;

    let value = line.trim_end_matches(['\r', '\n']).to_string();
    if value.is_empty() {
        bail!("{label} is required");
    }
    Ok(value)
}

/// Reads the API key twice without echo and insists both entries agree.
fn read_confirmed_key<F>(mut read: F) -> anyhow::Result<String>
where
    F: FnMut(&str) -> std::io::Result<String>,
{
    let key = read("Apikey: ").context("failed to read Apikey")?;
    if key.is_empty() {
        bail!("Apikey is required");
    }
    let again = read("Repeat for confirmation: ").context("failed to read Apikey")?;
    if again != key {
        bail!("Apikey entries do not match");
    }
    Ok(key)
}

fn emit(data: &Value, command: &Command) -> anyhow::Result<()> {
    match command.output().csv_path(command.csv_stem()) {
        Some(path) => {
            output::export_csv(data, Path::new(&path))
                .with_context(|| format!("failed to write {path}"))?;
            eprintln!("Wrote {path}");
        }
        None => println!("{}", output::render_json(data)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn scripted(answers: &[&str]) -> impl FnMut(&str) -> std::io::Result<String> {
        let mut answers: VecDeque<String> = answers.iter().map(|a| a.to_string()).collect();
        move |_prompt: &str| {
            answers
                .pop_front()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::UnexpectedEof))
        }
    }

    #[test]
    fn matching_key_entries_are_accepted() {
        let key = read_confirmed_key(scripted(&["s3cret", "s3cret"])).unwrap();
        assert_eq!(key, "s3cret");
    }

    #[test]
    fn mismatched_key_entries_are_rejected() {
        let err = read_confirmed_key(scripted(&["s3cret", "s3cert"])).unwrap_err();
        assert!(err.to_string().contains("do not match"));
    }

    #[test]
    fn empty_key_is_rejected_before_confirmation() {
        let mut prompts = Vec::new();
        let err = read_confirmed_key(|prompt: &str| {
            prompts.push(prompt.to_string());
            Ok(String::new())
        })
        .unwrap_err();
        assert!(err.to_string().contains("required"));
        assert_eq!(prompts, ["Apikey: "]);
    }

    #[test]
    fn closed_input_is_an_error() {
        assert!(read_confirmed_key(scripted(&[])).is_err());
    }
}
