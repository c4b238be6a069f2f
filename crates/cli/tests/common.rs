// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// The binary with no outbox environment leaking in from the caller.
pub fn outbox() -> Command {
    let mut cmd = cargo_bin_cmd!("outbox");
    cmd.env_remove("OUTBOX_CONFIG")
        .env_remove("OUTBOX_TOKEN")
        .env_remove("OUTBOX_DATA_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// Returns an address nothing listens on.
pub fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap().to_string();
    drop(listener);
    address
}

/// A temp directory holding a config file and the queue data.
pub struct Workspace {
    pub temp: TempDir,
    pub config: PathBuf,
}

impl Workspace {
    /// Remote is unreachable; every send stays queued.
    pub fn offline() -> Self {
        Self::with_remote(&format!("http://{}", closed_address()), 3)
    }

    pub fn with_remote(url: &str, max_retry_count: u32) -> Self {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");
        let data = temp.path().join("data");
        std::fs::write(
            &config,
            format!(
                "[remote]\nurl = \"{url}\"\ntimeout_secs = 2\n\n\
                 [sync]\nmax_retry_count = {max_retry_count}\n\n\
                 [storage]\ndir = \"{}\"\n\n\
                 [probe]\ntimeout_ms = 300\n",
                data.display()
            ),
        )
        .unwrap();
        Workspace { temp, config }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.temp.path().join("data")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = outbox();
        cmd.arg("--config").arg(&self.config);
        cmd
    }

    /// Sends a message and returns the parsed JSON report.
    pub fn send(&self, chat_id: &str, content: &str) -> serde_json::Value {
        let output = self
            .cmd()
            .args(["send", chat_id, content, "-o", "json"])
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "send failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Lists the queue as JSON.
    pub fn list(&self, failed: bool) -> Vec<serde_json::Value> {
        let mut cmd = self.cmd();
        cmd.args(["list", "-o", "json"]);
        if failed {
            cmd.arg("--failed");
        }
        let output = cmd.output().unwrap();
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

/// Minimal HTTP server answering every request with a fixed status.
pub struct ChatServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ChatServer {
    pub fn start(status_line: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                // Reachability probes connect and close without a request.
                if let Some(request) = read_request(&mut stream) {
                    seen.lock().unwrap().push(request);
                    let response = format!(
                        "HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    );
                    let _ = stream.write_all(response.as_bytes());
                }
            }
        });

        ChatServer { url, requests }
    }

    /// Raw requests received so far (head and body).
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < end + 4 + length {
                let n = stream.read(&mut chunk).ok()?;
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            return Some(String::from_utf8_lossy(&buf).into_owned());
        }
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
