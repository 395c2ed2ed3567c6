//! # Timeslice
//!
//! Main entry point for the round-robin simulator.

use std::env;
use std::process;
use timesliced::{parse_args, resolve_log_level, run, CliAction, LOG_LEVEL_ENV};

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("timesliced");

    let config = match parse_args(&args) {
        Ok(CliAction::Run(config)) => config,
        Ok(CliAction::Help) => {
            print_usage(program);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage(program);
            process::exit(1);
        }
    };

    let env_level = env::var(LOG_LEVEL_ENV).ok();
    let level = resolve_log_level(config.log_level, env_level.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    if let Err(e) = sim_logger::init(level) {
        eprintln!("Failed to install logger: {}", e);
    }

    match run(&config) {
        Ok(report) => println!("{}", report),
        Err(e) => {
            eprintln!("Simulation error: {}", e);
            process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [OPTIONS] <TASK>...", program);
    eprintln!();
    eprintln!("Runs 1 to 4 tasks, each read from <DIR>/<TASK>.tsk");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -d, --dir <DIR>          Directory holding the task files (default .)");
    eprintln!("  -c, --config <FILE>      JSON simulation configuration");
    eprintln!("  -f, --format <FORMAT>    Report format: text (default) or json");
    eprintln!("  -l, --log-level <LEVEL>  error, warn (default), info, debug or trace");
    eprintln!("                           (also read from {})", LOG_LEVEL_ENV);
    eprintln!("  -h, --help               Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} task1 task2", program);
    eprintln!("  {} --dir tasks --format json alpha beta gamma", program);
}
