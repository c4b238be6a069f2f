// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod common;
use common::*;

#[test]
fn send_online_delivers() {
    let server = ChatServer::start("201 Created");
    let ws = Workspace::with_remote(&server.url, 3);

    let report = ws.send("general", "hello");

    assert_eq!(report["delivery"], "delivered");
    assert!(ws.list(false).is_empty());

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("POST /api/chats/general/messages HTTP/1.1"));
    assert!(requests[0].ends_with(r#"{"content":"hello"}"#));
}

#[test]
fn token_is_sent_as_bearer() {
    let server = ChatServer::start("200 OK");
    let ws = Workspace::with_remote(&server.url, 3);

    ws.cmd()
        .env("OUTBOX_TOKEN", "s3cret")
        .args(["send", "general", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Delivered offline_"));

    let requests = server.requests();
    assert!(requests[0]
        .to_lowercase()
        .contains("authorization: bearer s3cret"));
}

#[test]
fn rejected_send_stays_queued_until_retries_run_out() {
    let server = ChatServer::start("500 Internal Server Error");
    let ws = Workspace::with_remote(&server.url, 2);

    let report = ws.send("general", "hello");
    assert_eq!(report["delivery"], "queued");
    let id = report["id"].as_str().unwrap().to_string();

    ws.cmd()
        .args(["drain", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""failed": 1"#));

    let failed = ws.list(true);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["id"], id.as_str());
    assert_eq!(failed[0]["retry_count"], 2);

    // Failed messages are not picked up by later drains.
    ws.cmd()
        .arg("drain")
        .assert()
        .success()
        .stdout(predicate::str::contains("sent 0, retrying 0, failed 0"));
    assert_eq!(server.requests().len(), 2);

    // An explicit retry gets a fresh budget and tries again.
    ws.cmd()
        .args(["retry", &id])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Queued"));
    assert_eq!(server.requests().len(), 3);
    assert_eq!(ws.list(false)[0]["retry_count"], 1);

    ws.cmd().args(["discard", &id]).assert().success();
    assert!(ws.list(false).is_empty());
}

#[test]
fn drain_delivers_backlog_in_order() {
    let offline = Workspace::offline();
    offline.send("general", "first");
    offline.send("general", "second");

    let server = ChatServer::start("200 OK");
    let config = std::fs::read_to_string(&offline.config).unwrap();
    let url_line = config.lines().find(|l| l.starts_with("url = ")).unwrap();
    let config = config.replace(url_line, &format!("url = \"{}\"", server.url));
    std::fs::write(&offline.config, config).unwrap();

    offline
        .cmd()
        .arg("drain")
        .assert()
        .success()
        .stdout("Drain complete: sent 2, retrying 0, failed 0\n");

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].ends_with(r#"{"content":"first"}"#));
    assert!(requests[1].ends_with(r#"{"content":"second"}"#));

    offline
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: online"))
        .stdout(predicate::str::contains("Last sync: never").not());
}
