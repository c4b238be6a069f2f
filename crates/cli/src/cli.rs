// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  outbox send general \"hello\"   Queue a message and deliver it if online
  outbox status                 Show connectivity and queue counts
  outbox list --failed          Show messages that ran out of retries
  outbox retry <id>             Give a failed message another try
  outbox watch                  Keep delivering until Ctrl-C";

#[derive(Parser, Debug)]
#[command(name = "outbox", version)]
#[command(about = "Offline-first outgoing message queue")]
#[command(
    long_about = "Offline-first outgoing message queue.\n\n\
    Messages are stored locally and delivered in order once the chat API is reachable."
)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Path to the config file (default: <config dir>/outbox/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Queue a message and deliver it if the remote is reachable
    #[command(after_help = "Examples:\n  \
        outbox send general \"hello\"        Queue and try to deliver\n  \
        outbox send general \"hi\" -o json   Print the result as JSON")]
    Send {
        /// Destination chat ID
        chat_id: String,

        /// Message text
        content: String,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show connectivity and queue counts
    Status {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List queued messages
    List {
        /// Only show messages that ran out of retries
        #[arg(long)]
        failed: bool,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Reset a failed message and try to deliver it again
    #[command(arg_required_else_help = true)]
    Retry {
        /// Message ID
        id: String,
    },

    /// Remove a message from the queue without sending it
    #[command(arg_required_else_help = true)]
    Discard {
        /// Message ID
        id: String,
    },

    /// Run one delivery cycle
    Drain {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Keep delivering in the background and log state changes until Ctrl-C
    Watch,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
