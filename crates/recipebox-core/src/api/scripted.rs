//! Scripted `Transport` double for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use super::{ApiError, HttpResponse, Transport};

#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, Bytes),
    Timeout,
    NotConnected,
    Other(&'static str),
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, Reply>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, url: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .expect("replies lock")
            .insert(url.to_string(), reply);
        self
    }

    pub fn ok(self, url: &str, body: impl Into<Bytes>) -> Self {
        self.reply(url, Reply::Status(200, body.into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .expect("replies lock")
            .get(url.as_str())
            .cloned()
            .unwrap_or(Reply::Status(404, Bytes::new()));

        match reply {
            Reply::Status(status, body) => Ok(HttpResponse { status, body }),
            Reply::Timeout => Err(ApiError::Timeout),
            Reply::NotConnected => Err(ApiError::NotConnected),
            Reply::Other(msg) => Err(ApiError::Transport(msg.into())),
        }
    }
}
