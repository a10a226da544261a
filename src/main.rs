//! Robotics EDA command line entry point.

use anyhow::Result;
use clap::Parser;
use robotics_eda::config::{self, Overrides, ReportConfig};
use robotics_eda::report::ReportGenerator;
use std::io;
use std::path::PathBuf;

/// Robotics adoption report - summary statistics and charts
#[derive(Parser, Debug)]
#[command(name = "robotics-eda")]
#[command(about = "Analyze robotics adoption data and render charts", long_about = None)]
#[command(version)]
struct Args {
    /// Input CSV (default: data/robotics_data.csv)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Directory the charts are written to (default: output)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Path to a JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Render charts one at a time
    #[arg(long)]
    sequential: bool,

    /// Open the output directory when the report is done
    #[arg(long)]
    open: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => ReportConfig::default(),
    }
    .apply(Overrides {
        input: args.input,
        output_dir: args.output_dir,
        sequential: args.sequential,
        open_output: args.open,
    });
    log::debug!("configuration: {:?}", config);

    let stdout = io::stdout();
    let outcome = ReportGenerator::new(config).run(&mut stdout.lock())?;
    log::debug!(
        "{} of {} rows used, {} files written",
        outcome.rows_retained,
        outcome.rows_loaded,
        outcome.files.len()
    );

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::{Builder, Env};
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    // RUST_LOG, when set, wins over the command-line level
    Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format_timestamp(None)
        .init();
}
