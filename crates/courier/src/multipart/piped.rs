use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::{AsyncRead, DuplexStream, ReadBuf};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::part::Part;
use super::payload::{AssemblyGuard, Readiness};
use super::writer::write_form;
use crate::error::{Error, Result};

/// Default size of the in-memory pipe between producer and reader.
pub const DEFAULT_PIPE_CAPACITY: usize = 8 * 1024;

/// Payload assembled concurrently while it is being read.
///
/// Assembly spawns one producer task that renders the parts into the write
/// half of a bounded pipe; reads drain the other half. The producer waits
/// whenever the pipe is full, so memory use is bounded by the pipe capacity
/// regardless of part sizes. The content length is never known.
///
/// The producer reports its outcome through a single-slot channel before it
/// releases the write half. Every read checks that slot first, and again at
/// end of stream, so a failed assembly is never mistaken for a clean EOF.
///
/// Assembly must happen inside a tokio runtime.
#[derive(Debug)]
pub struct Piped {
    reader:   Option<DuplexStream>,
    writer:   Option<DuplexStream>,
    outcome:  Option<oneshot::Receiver<Result<()>>>,
    producer: Option<JoinHandle<()>>,
    finished: bool,
    failed:   bool,
    guard:    AssemblyGuard,
}

impl Piped {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_PIPE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (reader, writer) = tokio::io::duplex(capacity.max(1));
        Self {
            reader:   Some(reader),
            writer:   Some(writer),
            outcome:  None,
            producer: None,
            finished: false,
            failed:   false,
            guard:    AssemblyGuard::default(),
        }
    }

    /// Always `None`: the payload is produced while it is consumed.
    pub fn len(&self) -> Option<u64> {
        None
    }

    pub fn readiness(&self) -> Readiness {
        self.guard.readiness()
    }

    pub(crate) fn assemble(&mut self, boundary: &str, parts: Vec<Part>) -> Result<()> {
        if !self.guard.begin() {
            return Ok(());
        }
        let Some(mut writer) = self.writer.take() else {
            return Err(Error::PayloadClosed);
        };

        let (tx, rx) = oneshot::channel();
        let boundary = boundary.to_string();
        let count = parts.len();

        self.producer = Some(tokio::spawn(async move {
            debug!(parts = count, "piped multipart assembly started");
            let outcome = write_form(&mut writer, &boundary, parts)
                .await
                .map_err(|err| match err {
                    Error::Io(e) if e.kind() == io::ErrorKind::BrokenPipe => Error::AssemblyAborted,
                    other => other,
                });

            match &outcome {
                Ok(()) => debug!("piped multipart assembly finished"),
                Err(Error::AssemblyAborted) => debug!("piped multipart assembly aborted by reader"),
                Err(err) => warn!(error = %err, "piped multipart assembly failed"),
            }

            // The outcome must be in the slot before the reader can observe EOF.
            let _ = tx.send(outcome);
            drop(writer);
        }));

        self.outcome = Some(rx);
        self.guard.mark_ready();
        Ok(())
    }

    /// Drop the read half. A producer that is still writing fails with
    /// `AssemblyAborted`; one that already finished is unaffected.
    pub(crate) fn close(&mut self) {
        self.reader = None;
        self.writer = None;
    }

    /// Wait for the producer task and return its outcome.
    ///
    /// Returns `Ok` if assembly never started. The reader must be drained or
    /// [closed](Self::close) first: a producer blocked on a full pipe never
    /// finishes while the read side is open and idle.
    pub(crate) async fn wait(&mut self) -> Result<()> {
        if let Some(producer) = self.producer.take() {
            if producer.await.is_err() {
                self.failed = true;
                return Err(Error::AssemblyFailed);
            }
        }
        match self.take_outcome() {
            Some(err) => Err(err),
            None if self.failed => Err(Error::AssemblyFailed),
            None => Ok(()),
        }
    }

    /// Non-blocking check of the outcome slot. Returns the producer's error,
    /// if one has been delivered and not yet handed out.
    fn take_outcome(&mut self) -> Option<Error> {
        let slot = self.outcome.as_mut()?;
        match slot.try_recv() {
            Ok(Ok(())) => {
                self.outcome = None;
                self.finished = true;
                None
            }
            Ok(Err(err)) => {
                self.outcome = None;
                self.failed = true;
                Some(err)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                // Producer went away without reporting: it panicked.
                self.outcome = None;
                self.failed = true;
                Some(Error::AssemblyFailed)
            }
        }
    }
}

impl Default for Piped {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncRead for Piped {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if !this.guard.is_ready() {
            // Reading before the producer exists would wait forever.
            return Poll::Ready(Err(Error::NotReady { kind: "piped" }.into_io()));
        }
        if this.failed {
            return Poll::Ready(Err(Error::AssemblyFailed.into_io()));
        }
        if let Some(err) = this.take_outcome() {
            return Poll::Ready(Err(err.into_io()));
        }
        let Some(reader) = this.reader.as_mut() else {
            return Poll::Ready(Err(Error::PayloadClosed.into_io()));
        };

        let before = buf.filled().len();
        ready!(Pin::new(reader).poll_read(cx, buf))?;

        let at_eof = buf.filled().len() == before && buf.remaining() > 0;
        if at_eof && !this.finished {
            if let Some(err) = this.take_outcome() {
                return Poll::Ready(Err(err.into_io()));
            }
        }
        Poll::Ready(Ok(()))
    }
}
