//! # Pubs Architecture
//!
//! `pubsapp` is the **repository core** of a plain-file bibliography manager. It
//! stores papers as YAML records and documents under one directory, enforces
//! citekey uniqueness, and tells plugins what changed. The `pubs` binary is one
//! client of it; nothing in here knows about terminals.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (crates/pubs)                                          │
//! │  - Parses arguments, renders results, owns exit codes       │
//! │  - Builds exactly one Repository and its observers          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository (repo.rs)                                       │
//! │  - Citekey uniqueness, unique key generation                │
//! │  - Cross-store rename, Add/Remove/Rename events             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  DataBroker (broker.rs)                                     │
//! │  - Per-citekey read/write/remove, validation of raw input   │
//! │  - No uniqueness policy, no events                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Stores (store/)                                            │
//! │  - BibStore, MetaStore, DocStore, NoteStore                 │
//! │  - YAML files in production, in-memory records for tests    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Explicit Wiring
//!
//! There is no global repository and no global event registry. The caller
//! constructs a [`repo::Repository`], hands it the observers it wants, and passes
//! it to whatever needs it.
//!
//! ## Module Overview
//!
//! - [`repo`]: The repository facade, entry point for all paper operations
//! - [`broker`]: Composition of the four stores
//! - [`store`]: Store traits and implementations
//! - [`model`]: `Paper`, `BibEntry`, `Metadata`
//! - [`citekey`]: Citekey rules and the base-27 suffix counter
//! - [`codec`]: Text decoding of bibliographic records
//! - [`events`]: Observer trait and event dispatch
//! - [`config`]: Configuration loading
//! - [`error`]: Error types

pub mod broker;
pub mod citekey;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod repo;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
