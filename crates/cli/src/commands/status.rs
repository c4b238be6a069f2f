// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `outbox status`: connectivity and queue counts.

use super::{open_manager, print_json, probe, runtime};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_state;
use crate::error::Result;

pub fn run(config: &Config, format: OutputFormat) -> Result<()> {
    runtime()?.block_on(async {
        let online = probe(config).await?;
        let state = open_manager(config, online)?.state();
        match format {
            OutputFormat::Text => println!("{}", format_state(&state)),
            OutputFormat::Json => print_json(&state)?,
        }
        Ok(())
    })
}
