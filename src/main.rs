//! review-sentiment CLI binary.

use std::io::Write;
use std::process;

use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;

use review_sentiment::cli::args::*;
use review_sentiment::cli::commands::*;

fn main() {
    let args = SentimentArgs::parse();

    let log_level = match args.verbosity() {
        0 => LevelFilter::Error, // Quiet mode
        1 => LevelFilter::Warn,  // Default
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = execute_command(args) {
        let kind = if e.is_client_error() { "Invalid input" } else { "Error" };
        eprintln!("{kind}: {e}");
        process::exit(if e.is_client_error() { 2 } else { 1 });
    }
}
