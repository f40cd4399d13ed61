//! Shared fake transport for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use courier::{Client, Headers, Method, RawRequest, RawResponse, Transport};
use tokio::io::AsyncReadExt;

/// What the fake saw for one call.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method:         Method,
    pub url:            String,
    pub headers:        Headers,
    pub content_length: Option<u64>,
    pub body:           Vec<u8>,
}

/// Transport that drains the request body, records the request and answers
/// with a canned response. Body read errors are returned as-is.
#[derive(Debug)]
pub struct FakeTransport {
    calls:    AtomicUsize,
    recorded: Mutex<Vec<Recorded>>,
    status:   u16,
    headers:  Headers,
    body:     Bytes,
    refuse:   Option<String>,
}

impl FakeTransport {
    pub fn new(status: u16) -> Self {
        Self {
            calls:    AtomicUsize::new(0),
            recorded: Mutex::new(Vec::new()),
            status,
            headers:  Headers::new(),
            body:     Bytes::new(),
            refuse:   None,
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.add(key, value);
        self
    }

    /// Fail every call with a connection error.
    pub fn refusing(message: &str) -> Self {
        let mut transport = Self::ok();
        transport.refuse = Some(message.to_string());
        transport
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Recorded {
        self.recorded
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }
}

impl Transport for FakeTransport {
    type Error = courier::Error;

    async fn execute(&self, mut request: RawRequest) -> Result<RawResponse, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.refuse {
            return Err(courier::Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                message.clone(),
            )));
        }

        let mut body = Vec::new();
        if let Some(reader) = request.body.as_mut() {
            reader.read_to_end(&mut body).await?;
        }

        self.recorded.lock().unwrap().push(Recorded {
            method: request.method,
            url: request.url,
            headers: request.headers,
            content_length: request.content_length,
            body,
        });

        Ok(RawResponse::new(
            self.status,
            self.headers.clone(),
            Some(self.body.len() as u64),
            io::Cursor::new(self.body.clone()),
        ))
    }
}

pub fn client(transport: FakeTransport) -> Client<FakeTransport> {
    Client::with_transport(transport)
}
