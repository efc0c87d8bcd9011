//! # Pubs CLI Architecture
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this file
//! only invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/pubsapp/`: Repository core: stores, broker, repository, events
//! - `crates/pubs/`: This CLI tool, depends on the `pubsapp` library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/pubs/src/cli/)                           │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Config, logging, repository wiring, dispatch             │
//! │    (commands.rs)                                            │
//! │  - Terminal and JSON rendering (render.rs, styles.rs)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository (crates/pubsapp/src/repo.rs)                    │
//! │  - Uniqueness, rename orchestration, events                 │
//! │  - Returns structured errors and `PushOutcome` values       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CLI owns exactly one `Repository` per invocation and is the only place
//! that prints, reads stdin or exits. Recoverable outcomes (collisions,
//! validation failures) become messages on stderr and exit status 1; nothing
//! prompts.
//!
//! ## Logging
//!
//! `PUBS_LOG` takes a `tracing` filter (`PUBS_LOG=debug`, `PUBS_LOG=pubsapp=info`).
//! Logs go to stderr so `pubs list --json` stays parseable.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
