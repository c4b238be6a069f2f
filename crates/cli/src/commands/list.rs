// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `outbox list`: show queued messages.

use super::{open_manager, print_json};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_message;
use crate::error::Result;

pub fn run(config: &Config, failed_only: bool, format: OutputFormat) -> Result<()> {
    let manager = open_manager(config, false)?;
    let messages = if failed_only {
        manager.failed_messages()
    } else {
        manager.messages()
    };

    match format {
        OutputFormat::Json => print_json(&messages)?,
        OutputFormat::Text if messages.is_empty() => {
            if failed_only {
                println!("No failed messages");
            } else {
                println!("Queue is empty");
            }
        }
        OutputFormat::Text => {
            for msg in &messages {
                println!("{}", format_message(msg));
            }
        }
    }
    Ok(())
}
