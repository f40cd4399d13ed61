use std::fmt;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Buf, Bytes};
use tokio::io::{AsyncRead, ReadBuf};

use super::tee::Tee;
use crate::error::{BoxError, Error, Result};
use crate::multipart::Multipart;

/// Type-erased readable byte stream.
pub type BoxReader = Pin<Box<dyn AsyncRead + Send>>;

/// Request body.
///
/// Knows its length when it can: in-memory bytes always, files via their
/// metadata, allocated multipart bodies after assembly.
pub struct Body {
    kind: Kind,
}

enum Kind {
    Bytes(Bytes),
    Reader { reader: BoxReader, len: Option<u64> },
    Multipart(Multipart),
}

impl Body {
    /// Body streamed from `reader`, with an optional declared length.
    pub fn from_reader<R>(reader: R, len: Option<u64>) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            kind: Kind::Reader {
                reader: Box::pin(reader),
                len,
            },
        }
    }

    /// Body streamed from a file, its length taken from the file metadata.
    pub async fn file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let opened = async {
            let file = tokio::fs::File::open(path).await?;
            let len = file.metadata().await?.len();
            Ok::<_, io::Error>((file, len))
        };
        let (file, len) = opened
            .await
            .map_err(|e| Error::from(e).context(format!("opening request body {}", path.display())))?;
        Ok(Self::from_reader(file, Some(len)))
    }

    /// Length still to be read, `None` if unknown.
    pub fn len(&self) -> Option<u64> {
        match &self.kind {
            Kind::Bytes(bytes) => Some(bytes.len() as u64),
            Kind::Reader { len, .. } => *len,
            Kind::Multipart(multipart) => multipart.len(),
        }
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.kind, Kind::Multipart(_))
    }

    pub fn as_multipart(&self) -> Option<&Multipart> {
        match &self.kind {
            Kind::Multipart(multipart) => Some(multipart),
            _ => None,
        }
    }

    pub fn as_multipart_mut(&mut self) -> Option<&mut Multipart> {
        match &mut self.kind {
            Kind::Multipart(multipart) => Some(multipart),
            _ => None,
        }
    }

    /// Show every byte of this body to `observer` as it is read.
    ///
    /// Multipart bodies get a wiretap payload; anything else is wrapped in
    /// a [`Tee`]. The declared length is unchanged.
    pub fn tap<F>(&mut self, mut observer: F)
    where
        F: FnMut(&[u8]) -> std::result::Result<(), BoxError> + Send + 'static,
    {
        if let Kind::Multipart(multipart) = &mut self.kind {
            multipart.tap(observer);
            return;
        }

        let len = self.len();
        let inner = Body {
            kind: std::mem::replace(&mut self.kind, Kind::Bytes(Bytes::new())),
        };
        let observer = move |chunk: &[u8]| observer(chunk).map_err(|e| Error::Tap(e).into_io());
        self.kind = Kind::Reader {
            reader: Box::pin(Tee::new(inner, observer)),
            len,
        };
    }
}

impl AsyncRead for Body {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut self.get_mut().kind {
            Kind::Bytes(bytes) => {
                let n = buf.remaining().min(bytes.len());
                buf.put_slice(&bytes[..n]);
                bytes.advance(n);
                Poll::Ready(Ok(()))
            }
            Kind::Reader { reader, .. } => reader.as_mut().poll_read(cx, buf),
            Kind::Multipart(multipart) => Pin::new(multipart).poll_read(cx, buf),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self {
            kind: Kind::Bytes(bytes),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Bytes::from(text).into()
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Bytes::from_static(text.as_bytes()).into()
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Bytes::from_static(bytes).into()
    }
}

impl From<Multipart> for Body {
    fn from(multipart: Multipart) -> Self {
        Self {
            kind: Kind::Multipart(multipart),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Bytes(bytes) => f.debug_tuple("Body::Bytes").field(&bytes.len()).finish(),
            Kind::Reader { len, .. } => f.debug_struct("Body::Reader").field("len", len).finish(),
            Kind::Multipart(multipart) => f.debug_tuple("Body::Multipart").field(multipart).finish(),
        }
    }
}
