// HamAward command-line front end
// parse / check / lookup / awards over an ADIF log

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;

use hamaward_lib::adif::{detect_variant, parse_adif};
use hamaward_lib::awards::AwardChecker;
use hamaward_lib::config::Settings;
use hamaward_lib::reference::{self, region_name};
use hamaward_lib::Result;

/// Evaluate DXCC, WAPC and WACZ award progress from an ADIF log
#[derive(Debug, Parser)]
#[command(name = "hamaward", version, about)]
struct Args {
    /// JSON settings file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Prefix table (CTY.DAT layout); defaults to ./cty.dat
    #[arg(long, global = true, value_name = "PATH")]
    cty: Option<PathBuf>,

    /// JSON award catalog replacing the built-in awards
    #[arg(long, global = true, value_name = "PATH")]
    awards: Option<PathBuf>,

    /// Disable the condensed-line fallback during callsign lookup
    #[arg(long, global = true)]
    no_condensed_fallback: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a log and print exporter, header and records as JSON
    Parse {
        file: PathBuf,
        /// Write JSON here instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Evaluate awards against a log
    Check {
        file: PathBuf,
        /// Only this award code
        #[arg(long, value_name = "CODE")]
        award: Option<String>,
    },
    /// Resolve a callsign to country, continent, entity and region
    Lookup { callsign: String },
    /// List the available awards
    Awards,
}

#[derive(Serialize)]
struct ParseOutput<'a> {
    variant: &'static str,
    header: &'a hamaward_lib::AdifHeader,
    records: &'a [hamaward_lib::AdifRecord],
}

#[derive(Serialize)]
struct LookupOutput {
    callsign: String,
    #[serde(flatten)]
    lookup: hamaward_lib::CallsignLookup,
    region: Option<&'static str>,
    region_name: Option<&'static str>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("hamaward=info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn settings_for(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    }
    .apply_env();

    if let Some(cty) = &args.cty {
        settings.cty_path = Some(cty.clone());
    }
    if let Some(awards) = &args.awards {
        settings.awards_path = Some(awards.clone());
    }
    if args.no_condensed_fallback {
        settings.condensed_fallback = false;
    }
    Ok(settings)
}

/// Read a log as text, replacing invalid UTF-8
fn read_log(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let settings = settings_for(&args)?;

    match args.command {
        Command::Parse { file, output } => {
            let text = read_log(&file)?;
            let parsed = parse_adif(&text);
            let out = ParseOutput {
                variant: detect_variant(&text, &parsed.header),
                header: &parsed.header,
                records: &parsed.records,
            };
            let json = serde_json::to_string_pretty(&out)?;
            match output {
                Some(path) => {
                    fs::write(&path, json)?;
                    log::info!("Wrote {} records to {:?}", parsed.records.len(), path);
                }
                None => println!("{}", json),
            }
        }
        Command::Check { file, award } => {
            let resolver = reference::install(settings.build_resolver())?;
            let catalog = settings.load_catalog()?;
            let checker = AwardChecker::new(&catalog, resolver);
            let text = read_log(&file)?;
            match award {
                Some(code) => {
                    let records = parse_adif(&text).records;
                    print_json(&checker.check_single_award(&code, &records)?)?;
                }
                None => print_json(&hamaward_lib::analyze_log(&text, &checker).results)?,
            }
        }
        Command::Lookup { callsign } => {
            let resolver = reference::install(settings.build_resolver())?;
            let region = resolver.resolve_china_region(&callsign);
            print_json(&LookupOutput {
                callsign: callsign.trim().to_uppercase(),
                lookup: resolver.resolve(&callsign),
                region,
                region_name: region.and_then(region_name),
            })?;
        }
        Command::Awards => {
            print_json(&settings.load_catalog()?.available_awards())?;
        }
    }
    Ok(())
}
