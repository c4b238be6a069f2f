// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote send operation.
//!
//! Provides a trait-based send layer that enables:
//! - HTTP delivery to the chat API for production
//! - Scripted senders for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Url;
use serde::Serialize;

/// Error type for send operations.
///
/// Every variant is a failed attempt from the queue's point of view; the
/// distinction only matters for logging.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The request never got an HTTP response.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The remote answered with a non-success status.
    #[error("rejected by remote: HTTP {status}")]
    Rejected { status: u16 },

    /// The endpoint URL could not be built.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Result type for send operations.
pub type SendResult<T> = Result<T, SendError>;

/// Boxed future returned by [`MessageSender::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = SendResult<()>> + Send + 'a>>;

/// One delivery attempt of a chat message.
pub trait MessageSender: Send + Sync {
    /// Deliver `content` to the conversation `chat_id`.
    fn send<'a>(&'a self, chat_id: &'a str, content: &'a str) -> SendFuture<'a>;
}

/// Configuration for [`HttpSender`].
#[derive(Debug, Clone)]
pub struct HttpSenderConfig {
    /// Base URL of the chat API, e.g. `https://chat.example.com`.
    pub base_url: String,
    /// Bearer token, if the API requires one.
    pub token: Option<String>,
    /// Timeout for a single request.
    pub timeout: Duration,
}

#[derive(Serialize)]
struct SendBody<'a> {
    content: &'a str,
}

/// Sends messages with `POST {base}/api/chats/{chat_id}/messages`.
pub struct HttpSender {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpSender {
    pub fn new(config: HttpSenderConfig) -> SendResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SendError::InvalidEndpoint(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SendError::InvalidEndpoint(config.base_url));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SendError::ConnectionFailed(e.to_string()))?;
        Ok(HttpSender {
            client,
            base_url,
            token: config.token,
        })
    }

    /// Returns the endpoint for a conversation. The chat ID is percent-encoded
    /// as a single path segment.
    pub fn endpoint(&self, chat_id: &str) -> SendResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SendError::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "chats", chat_id, "messages"]);
        Ok(url)
    }
}

impl MessageSender for HttpSender {
    fn send<'a>(&'a self, chat_id: &'a str, content: &'a str) -> SendFuture<'a> {
        Box::pin(async move {
            let url = self.endpoint(chat_id)?;
            let mut request = self.client.post(url).json(&SendBody { content });
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| SendError::ConnectionFailed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(SendError::Rejected {
                    status: status.as_u16(),
                });
            }
            Ok(())
        })
    }
}
