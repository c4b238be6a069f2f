// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod common;
use common::*;

#[test]
fn send_offline_queues_message() {
    let ws = Workspace::offline();

    let report = ws.send("general", "hello");

    assert_eq!(report["delivery"], "queued");
    assert_eq!(report["chat_id"], "general");
    assert!(report["id"].as_str().unwrap().starts_with("offline_"));
    assert!(ws.data_dir().join("offline_data.json").exists());
}

#[test]
fn send_offline_text_output() {
    let ws = Workspace::offline();

    ws.cmd()
        .args(["send", "general", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Queued offline_"));
}

#[test]
fn list_shows_messages_in_order() {
    let ws = Workspace::offline();
    let first = ws.send("general", "first")["id"].as_str().unwrap().to_string();
    let second = ws.send("random", "second")["id"].as_str().unwrap().to_string();

    let listed = ws.list(false);
    let ids: Vec<&str> = listed.iter().map(|m| m["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);
    assert_eq!(listed[0]["status"], "pending");
    assert_eq!(listed[0]["retry_count"], 0);
    assert_eq!(listed[1]["content"], "second");

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(first.as_str()))
        .stdout(predicate::str::contains("pending"));
}

#[test]
fn list_empty_queue() {
    let ws = Workspace::offline();

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout("Queue is empty\n");
    ws.cmd()
        .args(["list", "--failed"])
        .assert()
        .success()
        .stdout("No failed messages\n");
}

#[test]
fn status_offline() {
    let ws = Workspace::offline();
    ws.send("general", "hello");

    ws.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: offline"))
        .stdout(predicate::str::contains("Pending: 1"))
        .stdout(predicate::str::contains("Last sync: never"));
}

#[test]
fn status_json() {
    let ws = Workspace::offline();

    let output = ws.cmd().args(["status", "-o", "json"]).output().unwrap();
    assert!(output.status.success());
    let state: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(state["status"], "offline");
    assert_eq!(state["pending_count"], 0);
    assert_eq!(state["is_syncing"], false);
}

#[test]
fn drain_offline_sends_nothing() {
    let ws = Workspace::offline();
    ws.send("general", "hello");

    ws.cmd()
        .arg("drain")
        .assert()
        .success()
        .stdout(predicate::str::contains("Remote unreachable"));
    assert_eq!(ws.list(false).len(), 1);
}

#[test]
fn discard_removes_message() {
    let ws = Workspace::offline();
    let id = ws.send("general", "hello")["id"].as_str().unwrap().to_string();

    ws.cmd()
        .args(["discard", &id])
        .assert()
        .success()
        .stdout(format!("Discarded {}\n", id));
    assert!(ws.list(false).is_empty());
}

#[test]
fn discard_unknown_id_fails() {
    let ws = Workspace::offline();

    ws.cmd()
        .args(["discard", "offline_0_0000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("message not found"));
}

#[test]
fn retry_unknown_id_fails() {
    let ws = Workspace::offline();

    ws.cmd()
        .args(["retry", "offline_0_0000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: message not found"));
}

#[test]
fn retry_pending_message_fails() {
    let ws = Workspace::offline();
    let id = ws.send("general", "hello")["id"].as_str().unwrap().to_string();

    ws.cmd()
        .args(["retry", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only failed messages can be retried"));
}

#[test]
fn corrupted_queue_file_starts_empty() {
    let ws = Workspace::offline();
    std::fs::create_dir_all(ws.data_dir()).unwrap();
    std::fs::write(ws.data_dir().join("offline_data.json"), "{broken").unwrap();

    assert!(ws.list(false).is_empty());
}
