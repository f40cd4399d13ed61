use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use tokio::io::{AsyncRead, ReadBuf};

use super::part::Part;
use super::payload::{Payload, Readiness};
use crate::effects::Tee;
use crate::error::{BoxError, Error, Result};

/// Transparent decorator around another payload.
///
/// Everything except reading passes straight through. A read goes to the
/// delegate first; if it produced bytes, the observer sees exactly those
/// bytes. An observer error becomes the read's error and those bytes are not
/// returned; the delegate has already produced them, so the stream must be
/// treated as failed.
pub struct Wiretap {
    inner: Tee<Box<Payload>>,
}

impl Wiretap {
    pub fn new<F>(delegate: Payload, mut observer: F) -> Self
    where
        F: FnMut(&[u8]) -> std::result::Result<(), BoxError> + Send + 'static,
    {
        let observer = move |chunk: &[u8]| observer(chunk).map_err(|e| Error::Tap(e).into_io());
        Self {
            inner: Tee::new(Box::new(delegate), observer),
        }
    }

    pub fn delegate(&self) -> &Payload {
        self.inner.get_ref()
    }

    pub fn len(&self) -> Option<u64> {
        self.delegate().len()
    }

    pub fn readiness(&self) -> Readiness {
        self.delegate().readiness()
    }

    pub(crate) fn assemble<'a>(
        &'a mut self,
        boundary: &'a str,
        parts: Vec<Part>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.inner.get_mut().assemble(boundary, parts))
    }

    pub(crate) fn close(&mut self) {
        self.inner.get_mut().close();
    }

    pub(crate) fn wait(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.inner.get_mut().wait())
    }
}

impl AsyncRead for Wiretap {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}
