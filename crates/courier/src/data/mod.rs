//! Plain data types shared by requests, responses and transports.
//!
//! Nothing in this module performs I/O.

pub mod headers;
pub mod method;
pub mod options;
pub mod progress;

pub use headers::Headers;
pub use method::Method;
pub use options::{BeforeSendHook, ProgressHandler, RequestOptions, TransportOptions};
pub use progress::{Direction, Progress};
