//! I/O: bodies, the transport seam, and the request/response exchange.

mod body;
mod client;
mod progress;
mod request;
mod response;
mod tee;
mod transport;

pub use body::{Body, BoxReader};
pub use client::Client;
pub use request::Request;
pub use response::Response;
pub use tee::Tee;
pub use transport::{BoxStream, RawRequest, RawResponse, Transport};

#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
