//! Command line front end of the tour planner.
//!
//! ```bash
//! # plan a request file, response JSON on stdout
//! navio-planner plan --request orders.json --pretty
//!
//! # read the request from stdin and override the payload limit
//! cat orders.json | navio-planner plan --request - --capacity 900
//!
//! # check how postal codes resolve
//! navio-planner resolve 33181 33100 99999
//! ```
//!
//! Logs go to stderr; `RUST_LOG` controls the level (default: info).

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use navio_planner::{GeoIndex, PlanRequest, Planner, PlannerConfig};

const DEFAULT_CONFIG_FILE: &str = "planner.toml";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    let matches = cli().get_matches();

    // global arguments are visible in the subcommand matches
    match matches.subcommand() {
        Some(("plan", plan_matches)) => run_plan(plan_matches, load_config(plan_matches)?),
        Some(("resolve", resolve_matches)) => {
            run_resolve(resolve_matches, load_config(resolve_matches)?)
        }
        _ => unreachable!("a subcommand is required"),
    }
}

fn cli() -> Command {
    Command::new("navio-planner")
        .about("Plans capacity-bounded delivery tours from postal-code orders")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Planner configuration (TOML); planner.toml is used when present"),
        )
        .arg(
            Arg::new("dataset")
                .long("dataset")
                .short('d')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Postal-code reference dataset (JSON), overrides the configured path"),
        )
        .subcommand(
            Command::new("plan")
                .about("Plans tours for a request")
                .arg(
                    Arg::new("request")
                        .long("request")
                        .short('r')
                        .required(true)
                        .help("Request JSON file, or '-' for stdin"),
                )
                .arg(
                    Arg::new("capacity")
                        .long("capacity")
                        .value_parser(value_parser!(f64))
                        .help("Maximum payload per tour in kg, overrides request and config"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the response here instead of stdout"),
                )
                .arg(
                    Arg::new("pretty")
                        .long("pretty")
                        .action(ArgAction::SetTrue)
                        .help("Pretty-print the response"),
                ),
        )
        .subcommand(
            Command::new("resolve")
                .about("Prints the coordinate and resolution tier of postal codes")
                .arg(Arg::new("zip").required(true).num_args(1..)),
        )
}

fn load_config(matches: &ArgMatches) -> Result<PlannerConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => PlannerConfig::from_file(path)
            .with_context(|| format!("loading config '{}'", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            PlannerConfig::from_file(DEFAULT_CONFIG_FILE)
                .with_context(|| format!("loading config '{}'", DEFAULT_CONFIG_FILE))?
        }
        None => PlannerConfig::default(),
    };

    if let Some(dataset) = matches.get_one::<PathBuf>("dataset") {
        config.geo.dataset = dataset.clone();
    }

    Ok(config)
}

fn read_request(source: &str) -> Result<PlanRequest> {
    let json = if source == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("reading request from stdin")?;
        buffer
    } else {
        fs::read_to_string(source).with_context(|| format!("reading request file '{}'", source))?
    };

    serde_json::from_str(&json).context("parsing request JSON")
}

fn run_plan(matches: &ArgMatches, config: PlannerConfig) -> Result<()> {
    let source = matches
        .get_one::<String>("request")
        .context("missing --request")?;
    let mut request = read_request(source)?;
    if let Some(capacity) = matches.get_one::<f64>("capacity") {
        request.max_weight_kg = Some(*capacity);
    }

    let index = GeoIndex::load(&config.geo.dataset);
    let response = Planner::new(&index, &config).plan(&request)?;

    let writer: Box<dyn Write> = match matches.get_one::<PathBuf>("output") {
        Some(path) => Box::new(
            fs::File::create(path)
                .with_context(|| format!("creating output file '{}'", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };
    let mut writer = BufWriter::new(writer);
    if matches.get_flag("pretty") {
        serde_json::to_writer_pretty(&mut writer, &response)?;
    } else {
        serde_json::to_writer(&mut writer, &response)?;
    }
    writeln!(writer)?;
    writer.flush()?;

    info!(tours = response.tours.len(), "response written");
    Ok(())
}

fn run_resolve(matches: &ArgMatches, config: PlannerConfig) -> Result<()> {
    let index = GeoIndex::load(&config.geo.dataset);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for zip in matches.get_many::<String>("zip").into_iter().flatten() {
        match index.resolve(zip) {
            Some(coordinate) => writeln!(
                out,
                "{}\t{:.5}\t{:.5}\t{}",
                zip, coordinate.lat, coordinate.lon, coordinate.source
            )?,
            None => writeln!(out, "{}\tunresolved", zip)?,
        }
    }

    Ok(())
}
