// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `outbox drain`: one delivery cycle.

use super::{open_manager, print_json, probe, runtime};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::{format_outcome, DrainReport};
use crate::error::Result;

pub fn run(config: &Config, format: OutputFormat) -> Result<()> {
    runtime()?.block_on(async {
        let online = probe(config).await?;
        let outcome = open_manager(config, online)?.drain().await;
        match format {
            OutputFormat::Text => println!("{}", format_outcome(outcome)),
            OutputFormat::Json => print_json(&DrainReport::from(outcome))?,
        }
        Ok(())
    })
}
