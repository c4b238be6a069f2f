// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `outbox retry`: give a failed message a fresh retry budget.

use super::{open_manager, probe, runtime};
use crate::config::Config;
use crate::display::{format_delivery, Delivery};
use crate::error::Result;

pub fn run(config: &Config, id: &str) -> Result<()> {
    runtime()?.block_on(async {
        let online = probe(config).await?;
        let manager = open_manager(config, online)?;

        manager.retry_message(id)?;
        if online {
            manager.drain().await;
        }

        let delivery = Delivery::of(manager.message(id).as_ref());
        println!("{}", format_delivery(id, delivery));
        Ok(())
    })
}
