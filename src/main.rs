//! footprint-tool: generates KiCad footprints from JSON pad-array descriptions
//!
//! Every non-template definition of every input file becomes a
//! `.kicad_mod` file (plus a `.wrl` body model) next to the input or in the
//! directory given with `--output`.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use footprint_tool::config::{self, Config};
use footprint_tool::definitions::Library;
use footprint_tool::footprint::generate;
use footprint_tool::output;

/// Generates KiCad footprints from declarative JSON pad-array descriptions.
#[derive(Parser, Debug)]
#[command(name = "footprint-tool")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Footprint definition files (glob patterns allowed)
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Output directory (default: the directory of each input file)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Formats an error with all its sources.
fn error_chain(e: &dyn Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Expands glob patterns. A pattern without matches is kept as a literal
/// path so that reading it reports the missing file.
fn expand_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for pattern in patterns {
        match glob::glob(pattern) {
            Ok(entries) => {
                let before = paths.len();
                for entry in entries {
                    match entry {
                        Ok(path) => paths.push(path),
                        Err(e) => warn!(error = %e, "Skipping unreadable glob match"),
                    }
                }
                if paths.len() == before {
                    paths.push(PathBuf::from(pattern));
                }
            }
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Invalid glob pattern, using it as a path");
                paths.push(PathBuf::from(pattern));
            }
        }
    }
    paths
}

/// Generates all footprints of one definition file. Returns the number of
/// failures.
async fn process_file(path: &Path, output_dir: Option<&Path>, cfg: &Config) -> usize {
    let text = match output::read_definitions(path).await {
        Ok(text) => text,
        Err(e) => {
            error!(error = %error_chain(&e), "Cannot read definitions");
            return 1;
        }
    };

    let library = match Library::from_json_str(&text) {
        Ok(library) => library,
        Err(e) => {
            error!(path = %path.display(), error = %error_chain(&e), "Invalid definitions");
            return 1;
        }
    };

    let dir = output_dir.map_or_else(
        || path.parent().map(Path::to_path_buf).unwrap_or_default(),
        Path::to_path_buf,
    );

    let mut failures = 0;
    for (name, spec) in library.generated() {
        let footprint = match generate(name, spec, cfg) {
            Ok(footprint) => footprint,
            Err(e) => {
                error!(footprint = name, error = %e, "Skipping footprint");
                failures += 1;
                continue;
            }
        };

        match output::write_outputs(&dir, &footprint).await {
            Ok(files) => info!(
                footprint = name,
                path = %files.footprint.display(),
                model = files.model.is_some(),
                "Generated footprint"
            ),
            Err(e) => {
                error!(footprint = name, error = %error_chain(&e), "Cannot write footprint");
                failures += 1;
            }
        }
    }
    failures
}

/// Entry point for footprint-tool.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config_or_default(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", error_chain(&e));
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting footprint-tool");

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let inputs = expand_inputs(&args.inputs);
    let failures = runtime.block_on(async {
        let mut failures = 0;
        for path in &inputs {
            failures += process_file(path, args.output.as_deref(), &cfg).await;
        }
        failures
    });

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        error!(failures, "Some footprints could not be generated");
        ExitCode::FAILURE
    }
}
