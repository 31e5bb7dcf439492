//! tasklog - Daily Task Logging Library
//!
//! This library provides the core functionality for the tasklog CLI:
//! per-user task records in a small document database, with filtering and
//! summary statistics.
//!
//! # Core Concepts
//!
//! - **Document store**: collections of JSON documents with where/orderBy
//!   queries and snapshot listeners, backed by an in-memory mock or a JSON file
//! - **Auth**: mock email/password and provider sign-in over the `users` collection
//! - **Tasks**: dated records under `data/{uid}/tasks`
//! - **Stats**: totals, completion, time spent and the daily streak
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types and result aliases
//! - `store`: Document store trait, query engine and backends
//! - `listeners`: Callback registries and subscriptions
//! - `lock`: File locking and atomic writes for the file store
//! - `auth` / `session`: Sign-in and the persisted current user
//! - `task`: Task records and CRUD
//! - `filter` / `stats`: Pure computations over loaded tasks
//! - `prefs`: Saved display preferences
//! - `output`: Human and JSON output envelopes

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod listeners;
pub mod lock;
pub mod output;
pub mod prefs;
pub mod session;
pub mod stats;
pub mod store;
pub mod task;

pub use error::{Error, Result};
