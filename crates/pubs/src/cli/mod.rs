//! # CLI Behavior
//!
//! This is **one possible UI client** for the repository core.
//!
//! For the overall architecture, see the crate-level documentation in [`crate`].
//!
//! ## Commands
//!
//! | command                              | repository call                    |
//! |--------------------------------------|------------------------------------|
//! | `pubs init`                          | `Repository::create`               |
//! | `pubs add <bibfile> [-k] [-d] [-t]`  | `import_raw`, then `push_doc`      |
//! | `pubs list [--json]`                 | `listing`                          |
//! | `pubs rename <old> <new> [--force]`  | `rename_paper`                     |
//! | `pubs remove <key>`                  | `remove_paper`                     |
//! | `pubs doc add <key> <file>`          | `push_doc`                         |
//! | `pubs path <key>`                    | `pull_paper` + `real_docpath`      |
//!
//! ## Document Import Mode
//!
//! `-L/--link` and `-M/--move` override the configured `import_copy` and
//! `import_move` settings for one invocation.
//!
//! ## Module Structure
//!
//! - `setup`: Argument parsing via clap
//! - `commands`: Config, logging and repository wiring plus per-command handlers
//! - `render`: Output formatting (list lines, JSON, messages)
//! - `styles`: Terminal styling

mod commands;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
