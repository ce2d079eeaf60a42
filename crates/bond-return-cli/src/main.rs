mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::returns::{ReturnArgs, RiskArgs};
use commands::site::RoutesArgs;
use commands::sweep::ErrorSweepArgs;

/// Exact vs approximate bond holding-period returns
#[derive(Parser)]
#[command(
    name = "bondret",
    version,
    about = "Exact vs approximate bond holding-period returns",
    long_about = "Reprices annual-coupon bullet bonds over a holding period and compares \
                  the exact return with Johansson's Method and the Basic Method \
                  duration/convexity approximations, for a single scenario or across \
                  a grid of coupons and yields."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Emit debug logs on stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Price, duration and convexity of a bullet bond
    Risk(RiskArgs),
    /// Exact holding-period return by full repricing
    ExactReturn(ReturnArgs),
    /// Johansson's Method (and Basic Method) return approximation
    ApproximateReturn(ReturnArgs),
    /// Compare exact, Johansson's Method and Basic Method returns
    Compare(ReturnArgs),
    /// Approximation error across a grid of coupons and yields
    ErrorSweep(ErrorSweepArgs),
    /// Show navigation and routing, or render a page
    Routes(RoutesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "bond_return_core=debug,bondret=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // stdout carries the results; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Risk(args) => commands::returns::run_risk(args),
        Commands::ExactReturn(args) => commands::returns::run_exact_return(args),
        Commands::ApproximateReturn(args) => commands::returns::run_approximate_return(args),
        Commands::Compare(args) => commands::returns::run_compare(args),
        Commands::ErrorSweep(args) => commands::sweep::run_error_sweep(args),
        Commands::Routes(args) => commands::site::run_routes(args),
        Commands::Version => {
            println!("bondret {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
