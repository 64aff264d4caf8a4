//! # CLI Behavior
//!
//! One possible UI client for lava. The CLI is the only place that knows
//! about terminal I/O, exit codes and output formatting.
//!
//! ## Remembered answers
//!
//! Every value the user types while filling a job is remembered in a JSON
//! file, so the next `lava job new` asks nothing it already knows. The file
//! is, in order of preference:
//!
//! 1. `--config PATH`
//! 2. `$LAVA_CONFIG`
//! 3. `lava.json` in the user configuration directory
//!
//! `-i/--interactive` asks again for everything, offering the remembered
//! values as defaults. `lava config` shows or edits the file directly.
//!
//! ## Logging
//!
//! Diagnostics go to stderr. `LAVA_LOG` takes an `EnvFilter` directive
//! (default `warn`); `--verbose` switches to `debug`.
//!
//! ## Module Structure
//!
//! - `setup`: Argument parsing via clap
//! - `commands`: Context wiring and per-command handlers
//! - `render`: Output formatting

mod commands;
mod render;
pub mod setup;

pub use commands::run;
