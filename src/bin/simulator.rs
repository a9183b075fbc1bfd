//! Headless dungeon balance simulator.
//!
//! Usage:
//!   cargo run --bin simulator -- [OPTIONS]
//!
//! Options:
//!   --runs N          Dungeon runs to simulate (default: 1000)
//!   --seed N          RNG seed (default: random)
//!   --dungeon-size N  Floor side length (default: 5)
//!   --party-attack N  Attack of the simulated party (default: 500)
//!   --verbose         Per-run lines and debug logging

use pokeidle::simulator::{run_simulation, SimConfig};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("{flag} requires a number"))
}

fn parse_args() -> Result<SimConfig, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = SimConfig::default();
    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--runs" => {
                i += 1;
                config.num_runs = parse_number(flag, args.get(i))?;
            }
            "--seed" => {
                i += 1;
                config.seed = Some(parse_number(flag, args.get(i))?);
            }
            "--dungeon-size" => {
                i += 1;
                config.dungeon_size = parse_number(flag, args.get(i))?;
            }
            "--party-attack" => {
                i += 1;
                config.party_attack = parse_number(flag, args.get(i))?;
            }
            "--verbose" => config.verbosity = 2,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("Unknown argument: {other}")),
        }
        i += 1;
    }
    Ok(config)
}

fn print_usage() {
    eprintln!(
        "Pokeidle Dungeon Simulator\n\
         \n\
         Usage: simulator [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --runs N          Dungeon runs to simulate (default: 1000)\n\
         \x20 --seed N          RNG seed (default: random)\n\
         \x20 --dungeon-size N  Floor side length (default: 5)\n\
         \x20 --party-attack N  Attack of the simulated party (default: 500)\n\
         \x20 --verbose         Per-run lines and debug logging\n\
         \x20 --help, -h        Show this help"
    );
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let config = match parse_args() {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("{msg}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.verbosity >= 2);

    eprintln!(
        "Simulating {} run(s), floor size {}, party attack {}, seed {}",
        config.num_runs,
        config.dungeon_size,
        config.party_attack,
        config
            .seed
            .map_or_else(|| "random".to_string(), |s| s.to_string()),
    );

    match run_simulation(&config) {
        Ok(report) => {
            print!("{}", report.to_text());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("simulation failed: {e}");
            ExitCode::FAILURE
        }
    }
}
