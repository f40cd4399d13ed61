//! Request tracing.
//!
//! [`trace_request`] logs a request's method, URL and headers at debug
//! level, with credentials redacted. When the [`WIRE_TARGET`] target is
//! enabled at trace level it also taps the body so every byte is logged as
//! the transport reads it:
//!
//! ```text
//! RUST_LOG=courier=debug,courier::wire=trace
//! ```

use tracing::{Level, debug, trace};

use crate::data::Headers;
use crate::effects::{Request, Transport};
use crate::error::BoxError;

/// Target of the per-chunk body events.
pub const WIRE_TARGET: &str = "courier::wire";

const REDACTED: &str = ":: REDACTED ::";

/// Log `request` and, if wire tracing is on, tap its body.
pub fn trace_request<T: Transport>(request: &mut Request<T>) {
    debug!(
        method = %request.method(),
        url = %request.url(),
        headers = ?redacted_headers(request.headers_ref()),
        "request"
    );

    if tracing::enabled!(target: WIRE_TARGET, Level::TRACE) {
        tap_request_body(request, |chunk| {
            trace!(
                target: WIRE_TARGET,
                len = chunk.len(),
                "{}",
                String::from_utf8_lossy(chunk)
            );
            Ok(())
        });
    }
}

/// Show every request body byte to `observer` as the transport reads it.
///
/// Returns `false` when the request has no body.
pub fn tap_request_body<T, F>(request: &mut Request<T>, observer: F) -> bool
where
    T: Transport,
    F: FnMut(&[u8]) -> Result<(), BoxError> + Send + 'static,
{
    match request.body_mut() {
        Some(body) => {
            body.tap(observer);
            true
        }
        None => false,
    }
}

/// Copy of `headers` with the `Authorization` value masked.
pub fn redacted_headers(headers: &Headers) -> Headers {
    headers
        .iter()
        .map(|(key, value)| {
            let value = if key.eq_ignore_ascii_case("authorization") {
                REDACTED
            } else {
                value
            };
            (key.to_string(), value.to_string())
        })
        .collect()
}
