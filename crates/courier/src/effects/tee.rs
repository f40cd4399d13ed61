use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::{AsyncRead, ReadBuf};

type Observer = Box<dyn FnMut(&[u8]) -> io::Result<()> + Send>;

/// Reader that shows every chunk it yields to an observer.
///
/// The observer runs after the inner read succeeded and only when that read
/// produced bytes. Its error is returned as the read's error and the bytes
/// of that read are withdrawn from the caller's buffer; the inner reader has
/// still consumed them, so the stream must be treated as failed.
pub struct Tee<R> {
    inner:    R,
    observer: Observer,
}

impl<R> Tee<R> {
    pub fn new<F>(inner: R, observer: F) -> Self
    where
        F: FnMut(&[u8]) -> io::Result<()> + Send + 'static,
    {
        Self {
            inner,
            observer: Box::new(observer),
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R> AsyncRead for Tee<R>
where
    R: AsyncRead + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;

        let chunk = &buf.filled()[before..];
        if !chunk.is_empty() {
            if let Err(e) = (this.observer)(chunk) {
                buf.set_filled(before);
                return Poll::Ready(Err(e));
            }
        }
        Poll::Ready(Ok(()))
    }
}
