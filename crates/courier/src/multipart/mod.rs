//! Multipart form bodies.
//!
//! A [`Multipart`] collects [`Part`]s in order and renders them through one
//! of the [`Payload`] strategies:
//!
//! - [`Allocated`]: rendered into memory on `assemble`, exact length known.
//! - [`Piped`]: rendered on a background task while the body is read,
//!   bounded memory, length unknown.
//! - [`Wiretap`]: wraps either and shows every byte read to an observer.
//!
//! # Example
//!
//! ```no_run
//! use courier::Multipart;
//! use tokio::io::AsyncReadExt;
//!
//! # async fn run() -> courier::Result<()> {
//! let mut form = Multipart::allocated()
//!     .with_boundary("testbound")?
//!     .add_field("foo", "bar");
//! form.assemble().await?;
//!
//! let mut body = String::new();
//! form.read_to_string(&mut body).await?;
//! # Ok(())
//! # }
//! ```

mod allocated;
mod part;
mod payload;
mod piped;
mod wiretap;
mod writer;

use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

pub use allocated::Allocated;
pub use part::Part;
pub use payload::{Payload, Readiness};
pub use piped::{DEFAULT_PIPE_CAPACITY, Piped};
pub use wiretap::Wiretap;

use crate::core::{content_type, random_boundary, validate_boundary};
use crate::error::{BoxError, Error, Result};

/// An ordered set of parts plus the strategy that turns them into bytes.
#[derive(Debug)]
pub struct Multipart {
    parts:    Vec<Part>,
    boundary: String,
    payload:  Payload,
}

impl Multipart {
    /// Multipart body assembled into memory.
    pub fn allocated() -> Self {
        Self::with_payload(Payload::allocated())
    }

    /// Multipart body streamed through a pipe while it is assembled.
    pub fn piped() -> Self {
        Self::with_payload(Payload::piped())
    }

    pub fn piped_with_capacity(capacity: usize) -> Self {
        Self::with_payload(Payload::piped_with_capacity(capacity))
    }

    pub fn with_payload(payload: Payload) -> Self {
        Self {
            parts: Vec::new(),
            boundary: random_boundary(),
            payload,
        }
    }

    /// Replace the generated boundary. Only valid before assembly.
    pub fn with_boundary(mut self, boundary: impl Into<String>) -> Result<Self> {
        if self.payload.readiness() != Readiness::Pending {
            return Err(Error::AlreadyAssembled);
        }
        let boundary = boundary.into();
        validate_boundary(&boundary)?;
        self.boundary = boundary;
        Ok(self)
    }

    pub fn add_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part::field(name, value));
        self
    }

    pub fn add_file(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.parts.push(Part::file(name, path));
        self
    }

    pub fn add_stream<R>(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        reader: R,
    ) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        self.parts.push(Part::stream(name, filename, reader));
        self
    }

    pub fn add_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Parts waiting to be assembled. Empty once assembly has taken them.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        content_type(&self.boundary)
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn len(&self) -> Option<u64> {
        self.payload.len()
    }

    pub fn is_ready(&self) -> bool {
        self.payload.is_ready()
    }

    /// Render the parts through the payload strategy.
    ///
    /// Errors with [`Error::AlreadyAssembled`] on any call after the first.
    /// For a piped payload this only starts the producer; rendering errors
    /// surface when the body is read.
    pub async fn assemble(&mut self) -> Result<()> {
        if self.payload.readiness() != Readiness::Pending {
            return Err(Error::AlreadyAssembled);
        }
        let parts = std::mem::take(&mut self.parts);
        self.payload.assemble(&self.boundary, parts).await
    }

    /// Put a wiretap around the current payload.
    pub fn tap<F>(&mut self, observer: F)
    where
        F: FnMut(&[u8]) -> std::result::Result<(), BoxError> + Send + 'static,
    {
        let payload = std::mem::replace(&mut self.payload, Payload::allocated());
        self.payload = payload.wiretap(observer);
    }

    /// Release the readable side; see [`Payload::close`].
    pub fn close(&mut self) {
        self.payload.close();
    }

    /// Wait for assembly to finish; see [`Payload::wait`].
    ///
    /// Read the body to the end, or [`close`](Self::close) it, before
    /// waiting on a piped form.
    pub async fn wait(&mut self) -> Result<()> {
        self.payload.wait().await
    }
}

impl AsyncRead for Multipart {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().payload).poll_read(cx, buf)
    }
}
