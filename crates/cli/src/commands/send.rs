// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `outbox send`: queue a message and deliver it if possible.

use serde::Serialize;

use super::{open_manager, print_json, probe, runtime};
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::{format_delivery, Delivery};
use crate::error::Result;

#[derive(Serialize)]
struct SendReport<'a> {
    id: &'a str,
    chat_id: &'a str,
    delivery: Delivery,
}

pub fn run(config: &Config, chat_id: &str, content: &str, format: OutputFormat) -> Result<()> {
    runtime()?.block_on(async {
        let online = probe(config).await?;
        let manager = open_manager(config, online)?;

        let id = manager.enqueue(chat_id, content);
        if online {
            manager.drain().await;
        }
        let delivery = Delivery::of(manager.message(&id).as_ref());

        match format {
            OutputFormat::Text => println!("{}", format_delivery(&id, delivery)),
            OutputFormat::Json => print_json(&SendReport {
                id: &id,
                chat_id,
                delivery,
            })?,
        }
        Ok(())
    })
}
