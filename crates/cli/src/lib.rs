// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! outbox - an offline-first outgoing message queue.
//!
//! This crate provides the sync manager behind the `outbox` CLI: messages are
//! queued locally, persisted, and delivered in order whenever the chat API
//! is reachable.
//!
//! # Main Components
//!
//! - [`SyncManager`] - the queue, its drain cycles and background worker
//! - [`sync::Storage`], [`sync::Reachability`], [`sync::MessageSender`] -
//!   the seams to the platform, with file, TCP probe and HTTP implementations
//! - [`Config`] - TOML configuration for the CLI
//! - [`Error`] - Error types for all operations
//!
//! # Embedding
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use outbox::sync::{FileStorage, HttpSender, HttpSenderConfig, ManualReachability, SyncConfig, SyncManager};
//!
//! let reachability = ManualReachability::new(true);
//! let manager = SyncManager::start(
//!     SyncConfig::default(),
//!     Arc::new(FileStorage::open("/var/lib/outbox")?),
//!     Arc::new(HttpSender::new(sender_config)?),
//!     &reachability,
//! )?;
//! let id = manager.enqueue("general", "hello");
//! // Platform connectivity events:
//! reachability.set_online(false);
//! ```

mod cli;
mod commands;
mod display;
mod env;
mod logging;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};
pub use sync::{SyncConfig, SyncManager};

/// Runs a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref())?;
    logging::setup_logging(cli.verbose, config.log.file.as_deref());

    match cli.command {
        Command::Send {
            chat_id,
            content,
            format,
        } => commands::send::run(&config, &chat_id, &content, format),
        Command::Status { format } => commands::status::run(&config, format),
        Command::List { failed, format } => commands::list::run(&config, failed, format),
        Command::Retry { id } => commands::retry::run(&config, &id),
        Command::Discard { id } => commands::discard::run(&config, &id),
        Command::Drain { format } => commands::drain::run(&config, format),
        Command::Watch => commands::watch::run(&config),
    }
}
