use anyhow::{Error, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::ffi::OsString;
use std::path::PathBuf;
use zbrdf::config::Config;

#[derive(Debug, Parser)]
#[command(name = "zbrdf")]
#[command(about = "Convert zbMATH XML to RDF and answer SPARQL problems over it")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Verbose mode - sets the RUST_LOG level to info, defaults to warning level
    #[clap(long, short, action, default_value = "false", global = true)]
    verbose: bool,
    /// Debug mode - sets the RUST_LOG level to debug, defaults to warning level
    #[clap(long, action, default_value = "false", global = true)]
    debug: bool,
    /// JSON configuration file; command line flags override its values
    #[clap(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a zbMATH XML dump to N-Triples, appending to the output file
    Convert {
        /// The XML file to read records from
        input: PathBuf,
        /// The N-Triples file to append to (created if missing)
        output: PathBuf,
        /// Buffered bytes above which triples are written out
        #[clap(long)]
        flush_threshold: Option<usize>,
    },
    /// Split a large line-oriented file into <INPUT>.part1, <INPUT>.part2, ...
    Split {
        /// The file to split
        input: PathBuf,
        /// Soft ceiling for each part, in MiB
        #[clap(long)]
        max_size_mb: Option<u64>,
    },
    /// Run every problem in a problems file against a SPARQL endpoint
    Solve {
        /// The problems XML file
        problems: PathBuf,
        /// Where to write the solutions XML report
        output: PathBuf,
        /// SPARQL endpoint URL
        #[clap(long)]
        endpoint: Option<String>,
        /// Minimum delay between the start of two requests, in milliseconds
        #[clap(long)]
        interval_ms: Option<u64>,
        /// Per-request timeout, in seconds
        #[clap(long)]
        timeout_secs: Option<u64>,
    },
    /// Print the resolved configuration
    Config {
        /// Print as JSON instead of a readable listing
        #[clap(long, action, default_value = "false")]
        json: bool,
    },
    /// Prints the version of the zbrdf binary
    Version,
}

impl ToString for Commands {
    fn to_string(&self) -> String {
        match self {
            Commands::Convert { .. } => "Convert".to_string(),
            Commands::Split { .. } => "Split".to_string(),
            Commands::Solve { .. } => "Solve".to_string(),
            Commands::Config { .. } => "Config".to_string(),
            Commands::Version => "Version".to_string(),
        }
    }
}

pub fn run() -> Result<()> {
    zbrdf::init_logging();
    let cmd = Cli::parse();
    execute(cmd)
}

pub fn run_from_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    zbrdf::init_logging();
    let cmd = Cli::try_parse_from(args).map_err(Error::from)?;
    execute(cmd)
}

/// Loads the config file (or defaults) and applies the command's overrides.
fn resolve_config(path: Option<&PathBuf>, command: &Commands) -> Result<Config> {
    let base = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let mut builder = base.to_builder();
    match command {
        Commands::Convert {
            flush_threshold: Some(threshold),
            ..
        } => {
            builder.flush_threshold_bytes(*threshold);
        }
        Commands::Split {
            max_size_mb: Some(mb),
            ..
        } => {
            builder.split_max_size_mb(*mb);
        }
        Commands::Solve {
            endpoint,
            interval_ms,
            timeout_secs,
            ..
        } => {
            if let Some(endpoint) = endpoint {
                builder.endpoint(endpoint.clone());
            }
            if let Some(ms) = interval_ms {
                builder.request_interval_ms(*ms);
            }
            if let Some(secs) = timeout_secs {
                builder.request_timeout_secs(*secs);
            }
        }
        _ => {}
    }
    Ok(builder.build()?)
}

fn execute(cmd: Cli) -> Result<()> {
    // The RUST_LOG env var is set by `init_logging` if ZBRDF_LOG is present.
    // CLI flags for verbosity take precedence. If nothing is set, we default to "warn".
    if cmd.debug {
        std::env::set_var("RUST_LOG", "debug");
    } else if cmd.verbose {
        std::env::set_var("RUST_LOG", "info");
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    let _ = env_logger::try_init();

    let config = resolve_config(cmd.config.as_ref(), &cmd.command)?;
    if cmd.verbose || cmd.debug {
        config.print();
    }
    info!("Running {}", cmd.command.to_string());

    match cmd.command {
        Commands::Convert { input, output, .. } => {
            let report = zbrdf::convert_file(&input, &output, config.flush_threshold_bytes)?;
            println!("{report}");
        }
        Commands::Split { input, .. } => {
            let parts = zbrdf::split_file(&input, config.split_max_bytes())?;
            if parts.is_empty() {
                println!("{} is empty; no parts written", input.display());
            }
            for part in parts {
                println!("{}", part.display());
            }
        }
        Commands::Solve {
            problems, output, ..
        } => {
            let report = zbrdf::solve_file(&problems, &output, &config)?;
            println!("{report}");
            println!("Solutions written to {}", output.display());
        }
        Commands::Config { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                config.print();
            }
        }
        Commands::Version => {
            println!("zbrdf {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
