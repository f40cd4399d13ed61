//! Pure functions: credential encoding, status classification and
//! multipart framing rules.

mod auth;
mod boundary;
mod status;

pub use auth::{AuthSpec, BasicAuth, BearerToken};
pub use boundary::{content_type, escape_quotes, random_boundary, validate_boundary};
pub use status::{is_auth_error, is_error, is_redirect, is_success, is_success_or_redirect};
