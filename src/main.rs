mod backend;
mod coverage;
mod geo;
mod presentation;
mod receivers;
mod session;
mod web;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::geo::{from_dms, to_dms, Hemisphere};
use crate::web::Config;

#[derive(Parser)]
#[command(name = "coverage-view")]
#[command(about = "Coverage state and link summaries for radio link planning")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the planning backend and serve the map API
    Serve {
        #[arg(long, default_value = "config.yaml")]
        config: String,
    },
    /// Convert decimal degrees to degrees, minutes and seconds
    ToDms {
        #[arg(allow_hyphen_values = true)]
        value: f64,
        /// Treat the value as a longitude (E/W) instead of a latitude
        #[arg(long)]
        longitude: bool,
    },
    /// Convert degrees, minutes and seconds to decimal degrees
    ToDecimal {
        degrees: f64,
        minutes: f64,
        seconds: f64,
        /// N, S, E or W
        hemisphere: char,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(&config),
        Commands::ToDms { value, longitude } => {
            println!("{}", to_dms(value, !longitude));
            ExitCode::SUCCESS
        }
        Commands::ToDecimal {
            degrees,
            minutes,
            seconds,
            hemisphere,
        } => match Hemisphere::from_char(hemisphere) {
            Some(hemisphere) => {
                println!("{:.6}", from_dms(degrees, minutes, seconds, hemisphere));
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("Unknown hemisphere '{}', expected N, S, E or W", hemisphere);
                ExitCode::FAILURE
            }
        },
    }
}

fn serve(path: &str) -> ExitCode {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
