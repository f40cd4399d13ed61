//! HTTP request/response core with streamed multipart uploads.
//!
//! # Architecture
//!
//! The crate follows the three-layer pattern:
//! - `data` - Plain configuration and value types
//! - `core` - Pure functions (auth tokens, status classes, boundaries)
//! - `effects` - I/O: bodies, the [`Transport`] seam, requests and responses
//!
//! with `multipart` building form bodies on top of the I/O layer.
//!
//! # Key Features
//!
//! - **Two assembly strategies**: [`Multipart::allocated`] renders into
//!   memory with an exact length; [`Multipart::piped`] renders on a
//!   background task through a bounded pipe
//! - **Deferred failures**: a part that fails while piping surfaces as the
//!   error of the next read, never as a silent end of stream
//! - **Tee instrumentation**: upload and download progress, and wire
//!   tracing, observe bytes in flight without copying them twice
//! - **Mechanism-only**: no retries, no redirect policy; the transport and
//!   the caller own those
//!
//! # Example
//!
//! ```no_run
//! use courier::{BasicAuth, Client, Multipart};
//!
//! # async fn run() -> courier::Result<()> {
//! let client = Client::new()?;
//! let form = Multipart::piped()
//!     .add_field("json", "{}")
//!     .add_file("file0", "build/artifact.zip");
//!
//! let response = client
//!     .post("https://ci.example.com/job/deploy/build")
//!     .auth(BasicAuth::new("admin", "secret"))
//!     .body(form)
//!     .on_progress(|p| {
//!         println!("{} bytes sent", p.current);
//!         Ok(())
//!     })
//!     .send()
//!     .await?;
//!
//! assert!(response.is_success_or_redirect());
//! # Ok(())
//! # }
//! ```

mod core;
mod data;
mod effects;
mod error;
mod multipart;
pub mod trace;

pub use crate::core::{AuthSpec, BasicAuth, BearerToken};
pub use data::method::ParseMethodError;
pub use data::{
    BeforeSendHook, Direction, Headers, Method, Progress, ProgressHandler, RequestOptions,
    TransportOptions,
};
pub use effects::{
    Body, BoxReader, BoxStream, Client, RawRequest, RawResponse, Request, Response, Tee, Transport,
};
pub use multipart::{
    Allocated, DEFAULT_PIPE_CAPACITY, Multipart, Part, Payload, Piped, Readiness, Wiretap,
};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestTransport;

pub use error::{BoxError, Error, Result};
