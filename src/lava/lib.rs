//! # Lava Architecture
//!
//! Lava is a library for preparing and tracking LAVA test jobs that happens to
//! ship a CLI client. A job is written from a template whose blanks (device
//! type, image, test definitions) are filled in from remembered answers, or by
//! asking the user when nothing is remembered yet.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, sets up logging        │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Wires store, prompter and scheduler connection           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - new, submit, status, config, templates                   │
//! │  - Returns structured `CmdResult` values                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (parameter, resolver, job, templates)                 │
//! │  - Parameters, resolution against the store, job filling    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Storage (store/)          │  Scheduler (scheduler/)        │
//! │  - ConfigStore trait       │  - Scheduler trait             │
//! │  - FileStore, InMemory     │  - XML-RPC, InMemory           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never exits
//! the process. The one interactive seam is the [`prompt::Prompter`] trait,
//! injected by the caller: a terminal in the CLI, a script in tests.
//!
//! ## Testing Strategy
//!
//! 1. **Core and commands**: unit tests against `InMemoryStore`,
//!    `ScriptedPrompter` and `InMemoryScheduler`.
//! 2. **API**: dispatch tests with the same doubles.
//! 3. **CLI**: end-to-end tests in `tests/`, feeding answers on stdin.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Logic for each command
//! - [`parameter`]: Parameter variants, (de)serialization and prompting
//! - [`resolver`]: Cache-or-prompt resolution of parameters
//! - [`job`]: Job documents with placeholders, and their JSON output
//! - [`templates`]: Named job templates
//! - [`store`]: Configuration store abstraction and implementations
//! - [`scheduler`]: LAVA scheduler client
//! - [`prompt`]: Interactive input abstraction
//! - [`config`]: Runtime settings
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod job;
pub mod parameter;
pub mod prompt;
pub mod resolver;
pub mod scheduler;
pub mod store;
pub mod templates;
