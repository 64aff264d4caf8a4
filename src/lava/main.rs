//! # Lava CLI
//!
//! The binary is thin: the CLI lives in `cli/`, and this file only invokes
//! `cli::run()` and turns errors into an exit status.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
