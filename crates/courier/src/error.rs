//! Error types for courier.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::data::Method;

/// Boxed error produced by hooks, handlers and transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("method `{0}` does not accept a request body")]
    BodyNotAllowed(Method),

    #[error("multipart stream has already been assembled")]
    AlreadyAssembled,

    #[error("{kind} payload is not ready to read; assemble it first")]
    NotReady { kind: &'static str },

    #[error("multipart payload is closed")]
    PayloadClosed,

    #[error("invalid multipart boundary {0:?}")]
    InvalidBoundary(String),

    #[error("failed to open file part {path:?}: {source}")]
    OpenPart {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("multipart assembly aborted: the reading side was closed")]
    AssemblyAborted,

    #[error("multipart assembly failed earlier in this transfer")]
    AssemblyFailed,

    #[error("{method} {url}: {source}")]
    Transport {
        method: Method,
        url:    String,
        #[source]
        source: BoxError,
    },

    #[error("failed to build HTTP transport: {0}")]
    Build(#[source] BoxError),

    #[error("before-send hook failed: {0}")]
    Hook(#[source] BoxError),

    #[error("progress handler failed: {0}")]
    Handler(#[source] BoxError),

    #[error("wiretap observer failed: {0}")]
    Tap(#[source] BoxError),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source:  Box<Error>,
    },

    #[error(transparent)]
    Io(io::Error),
}

impl Error {
    pub(crate) fn context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source:  Box::new(self),
        }
    }

    /// Returns the innermost error, looking through `Context` layers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn into_io(self) -> io::Error {
        io::Error::other(self)
    }
}

/// Recovers a courier error that crossed an `AsyncRead` boundary.
impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if !e.get_ref().is_some_and(|inner| inner.is::<Error>()) {
            return Error::Io(e);
        }
        let kind = e.kind();
        match e.into_inner().map(|inner| inner.downcast::<Error>()) {
            Some(Ok(err)) => *err,
            Some(Err(inner)) => Error::Io(io::Error::new(kind, inner)),
            None => Error::Io(io::Error::from(kind)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
