//! Entry point for the **screenorder** command.
//!
//! ```text
//! screenorder [--dry-run] [--force-panning] [--config <path>]
//! screenorder --debug-parse <xrandr-verbose-dump>
//! ```
//!
//! Exits with status 1 when no layout can be applied (no configured
//! monitor connected, order collision) or when a command fails.

use log::{error, info};
use screenorder::arranger::{Arranger, Options};
use screenorder::config::MonitorConfig;
use screenorder::report::parse_report;
use screenorder::system::runner::SystemRunner;
use std::path::{Path, PathBuf};

const USAGE: &str = "\
usage: screenorder [--dry-run] [--force-panning] [--config <path>]
       screenorder --debug-parse <file>

  --dry-run          print the generated commands without running them
  --force-panning    add a --panning clause for every output
  --config <path>    monitor configuration (default:
                     $XDG_CONFIG_HOME/screenorder/screenorder_config.json)
  --debug-parse <f>  parse a saved `xrandr --verbose` dump and print the result";

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    options: Options,
    config: Option<PathBuf>,
    debug_parse: Option<PathBuf>,
    help: bool,
}

impl Args {
    /// Parse flags (without the program name).  The underscore spellings
    /// of older releases are still accepted.
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dry-run" | "--dry_run" => parsed.options.dry_run = true,
                "--force-panning" | "--force_panning" => parsed.options.force_panning = true,
                "--config" => {
                    let path = args.next().ok_or("--config needs a path")?;
                    parsed.config = Some(path.into());
                }
                "--debug-parse" | "--debug_parse_xrandr_output_file" => {
                    let path = args.next().ok_or_else(|| format!("{} needs a file", arg))?;
                    parsed.debug_parse = Some(path.into());
                }
                "-h" | "--help" => parsed.help = true,
                other => return Err(format!("unknown argument: {}", other)),
            }
        }
        Ok(parsed)
    }
}

/// Default config file (`$XDG_CONFIG_HOME/screenorder/screenorder_config.json`).
fn default_config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base)
        .join("screenorder")
        .join("screenorder_config.json")
}

//  Main 

fn main() {
    env_logger::init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    if args.help {
        println!("{}", USAGE);
        return;
    }

    let result = match &args.debug_parse {
        Some(path) => debug_parse(path),
        None => run(args),
    };
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// Normal mode: query, resolve, apply.
fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = args.config.unwrap_or_else(default_config_path);
    let config = MonitorConfig::load_or_init(&config_path)?;
    info!(
        "loaded {} monitor config entries from {}",
        config.len(),
        config_path.display()
    );

    let arranger = Arranger::new(SystemRunner::new(), config, config_path, args.options);
    arranger.run(&mut std::io::stdout().lock())?;
    Ok(())
}

/// Debug mode: parse a saved report and print what was found.
fn debug_parse(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let report = parse_report(&text);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
