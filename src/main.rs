use std::env;
use std::process;

use rusty_ledger::config::Config;
use rusty_ledger::{init_tracing, run_with_config, BoxError};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn run() -> Result<(), BoxError> {
    let args: Vec<String> = env::args().collect();
    let config = match args.len() {
        2 => Config::default(),
        3 => Config::load(&args[2])?,
        _ => return Err("Usage: cargo run -- commands.csv [config.json]".into()),
    };
    init_tracing(&config.log_filter);
    run_with_config(&args[1], std::io::stdout().lock(), &config)
}
