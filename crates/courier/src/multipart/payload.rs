use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use super::allocated::Allocated;
use super::part::Part;
use super::piped::Piped;
use super::wiretap::Wiretap;
use crate::error::{BoxError, Result};

/// Assembly state of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Not assembled; reading is an error.
    Pending,
    /// Assembly started but did not complete; further assembly calls are no-ops.
    Assembling,
    /// Assembled; reads proceed and may surface deferred assembly errors.
    Ready,
}

const PENDING: u8 = 0;
const ASSEMBLING: u8 = 1;
const READY: u8 = 2;

/// Run-once gate for payload assembly.
#[derive(Debug, Default)]
pub(crate) struct AssemblyGuard(AtomicU8);

impl AssemblyGuard {
    /// Returns `true` for exactly one caller; every later call gets `false`.
    pub(crate) fn begin(&self) -> bool {
        self.0
            .compare_exchange(PENDING, ASSEMBLING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn mark_ready(&self) {
        self.0.store(READY, Ordering::Release);
    }

    pub(crate) fn readiness(&self) -> Readiness {
        match self.0.load(Ordering::Acquire) {
            PENDING => Readiness::Pending,
            ASSEMBLING => Readiness::Assembling,
            _ => Readiness::Ready,
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.readiness() == Readiness::Ready
    }
}

/// The readable byte stream produced by assembling a set of parts.
pub enum Payload {
    /// Assembled synchronously into memory; length is known.
    Allocated(Allocated),
    /// Assembled on a background task into a bounded pipe; length is unknown.
    Piped(Piped),
    /// Decorator exposing every byte read to an observer.
    Wiretap(Wiretap),
}

impl Payload {
    pub fn allocated() -> Self {
        Payload::Allocated(Allocated::new())
    }

    pub fn piped() -> Self {
        Payload::Piped(Piped::new())
    }

    pub fn piped_with_capacity(capacity: usize) -> Self {
        Payload::Piped(Piped::with_capacity(capacity))
    }

    /// Wrap this payload so `observer` sees each chunk as it is read.
    pub fn wiretap<F>(self, observer: F) -> Self
    where
        F: FnMut(&[u8]) -> std::result::Result<(), BoxError> + Send + 'static,
    {
        Payload::Wiretap(Wiretap::new(self, observer))
    }

    /// Short name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Allocated(_) => "allocated",
            Payload::Piped(_) => "piped",
            Payload::Wiretap(_) => "wiretap",
        }
    }

    /// Remaining length, `None` when it cannot be known.
    pub fn len(&self) -> Option<u64> {
        match self {
            Payload::Allocated(p) => p.len(),
            Payload::Piped(p) => p.len(),
            Payload::Wiretap(p) => p.len(),
        }
    }

    pub fn readiness(&self) -> Readiness {
        match self {
            Payload::Allocated(p) => p.readiness(),
            Payload::Piped(p) => p.readiness(),
            Payload::Wiretap(p) => p.readiness(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.readiness() == Readiness::Ready
    }

    /// Assemble `parts` framed with `boundary`.
    ///
    /// Idempotent: only the first call does any work.
    pub async fn assemble(&mut self, boundary: &str, parts: Vec<Part>) -> Result<()> {
        match self {
            Payload::Allocated(p) => p.assemble(boundary, parts).await,
            Payload::Piped(p) => p.assemble(boundary, parts),
            Payload::Wiretap(p) => p.assemble(boundary, parts).await,
        }
    }

    /// Release the readable side.
    ///
    /// For a piped payload this also stops a producer that is still writing.
    pub fn close(&mut self) {
        match self {
            Payload::Allocated(p) => p.close(),
            Payload::Piped(p) => p.close(),
            Payload::Wiretap(p) => p.close(),
        }
    }

    /// Wait until assembly has finished and report how it ended.
    ///
    /// For a piped payload, drain or [close](Self::close) the reader first;
    /// otherwise this waits on a producer stuck behind a full pipe.
    pub async fn wait(&mut self) -> Result<()> {
        match self {
            Payload::Allocated(_) => Ok(()),
            Payload::Piped(p) => p.wait().await,
            Payload::Wiretap(p) => p.wait().await,
        }
    }
}

impl AsyncRead for Payload {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Payload::Allocated(p) => Pin::new(p).poll_read(cx, buf),
            Payload::Piped(p) => Pin::new(p).poll_read(cx, buf),
            Payload::Wiretap(p) => Pin::new(p).poll_read(cx, buf),
        }
    }
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Payload")
            .field("kind", &self.kind())
            .field("readiness", &self.readiness())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn guard_admits_one_caller() {
        let guard = AssemblyGuard::default();
        assert_eq!(guard.readiness(), Readiness::Pending);
        assert!(guard.begin());
        assert!(!guard.begin());
        assert_eq!(guard.readiness(), Readiness::Assembling);
        guard.mark_ready();
        assert!(!guard.begin());
        assert!(guard.is_ready());
    }

    #[test]
    fn guard_under_contention() {
        let guard = Arc::new(AssemblyGuard::default());
        let winners: usize = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                std::thread::spawn(move || guard.begin())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap() as usize)
            .sum();
        assert_eq!(winners, 1);
    }

    #[test]
    fn kinds() {
        assert_eq!(Payload::allocated().kind(), "allocated");
        assert_eq!(Payload::piped().kind(), "piped");
        assert_eq!(Payload::piped().wiretap(|_| Ok(())).kind(), "wiretap");
    }
}
