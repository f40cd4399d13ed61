use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Buf, Bytes};
use tokio::io::{AsyncRead, ReadBuf};
use tracing::debug;

use super::part::Part;
use super::payload::{AssemblyGuard, Readiness};
use super::writer::write_form;
use crate::error::{Error, Result};

/// Payload assembled entirely in memory before the first read.
///
/// Because assembly completes up front, the content length is exact and
/// can be declared on the request. Bounded only by available memory.
#[derive(Debug, Default)]
pub struct Allocated {
    buffer: Bytes,
    guard:  AssemblyGuard,
}

impl Allocated {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unread bytes left in the buffer; `None` until assembled.
    pub fn len(&self) -> Option<u64> {
        self.guard.is_ready().then(|| self.buffer.len() as u64)
    }

    pub fn readiness(&self) -> Readiness {
        self.guard.readiness()
    }

    pub(crate) async fn assemble(&mut self, boundary: &str, parts: Vec<Part>) -> Result<()> {
        if !self.guard.begin() {
            return Ok(());
        }

        let mut out = Vec::new();
        write_form(&mut out, boundary, parts).await?;

        debug!(len = out.len(), "assembled multipart payload in memory");
        self.buffer = Bytes::from(out);
        self.guard.mark_ready();
        Ok(())
    }

    pub(crate) fn close(&mut self) {
        self.buffer.clear();
    }
}

impl AsyncRead for Allocated {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if !this.guard.is_ready() {
            return Poll::Ready(Err(Error::NotReady { kind: "allocated" }.into_io()));
        }

        let n = buf.remaining().min(this.buffer.len());
        buf.put_slice(&this.buffer[..n]);
        this.buffer.advance(n);
        Poll::Ready(Ok(()))
    }
}
