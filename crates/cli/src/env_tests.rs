// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::path::PathBuf;

#[test]
fn test_vars_constants() {
    assert_eq!(vars::OUTBOX_CONFIG, "OUTBOX_CONFIG");
    assert_eq!(vars::OUTBOX_TOKEN, "OUTBOX_TOKEN");
    assert_eq!(vars::OUTBOX_DATA_DIR, "OUTBOX_DATA_DIR");
}

#[test]
fn test_data_dir_set_and_unset() {
    std::env::set_var("OUTBOX_DATA_DIR", "/tmp/outbox-data");
    assert_eq!(data_dir(), Some(PathBuf::from("/tmp/outbox-data")));
    std::env::remove_var("OUTBOX_DATA_DIR");
    assert_eq!(data_dir(), None);
}

#[test]
fn test_empty_token_is_ignored() {
    std::env::set_var("OUTBOX_TOKEN", "");
    assert_eq!(token(), None);
    std::env::set_var("OUTBOX_TOKEN", "secret");
    assert_eq!(token().as_deref(), Some("secret"));
    std::env::remove_var("OUTBOX_TOKEN");
}
