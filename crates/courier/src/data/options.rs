use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::headers::Headers;
use super::progress::Progress;
use crate::core::AuthSpec;
use crate::effects::RawRequest;
use crate::error::BoxError;

/// Progress handler, invoked synchronously for every chunk transferred.
///
/// Returning an error aborts the transfer being observed.
pub type ProgressHandler = Arc<dyn Fn(&Progress) -> Result<(), BoxError> + Send + Sync>;

/// Hook run against the fully built request just before it is handed to
/// the transport. Returning an error cancels the send without any I/O.
pub type BeforeSendHook = Box<dyn FnMut(&mut RawRequest) -> Result<(), BoxError> + Send>;

/// Settings for the default `reqwest` transport.
///
/// # Examples
///
/// ```
/// use courier::TransportOptions;
/// use std::time::Duration;
///
/// let options = TransportOptions::default()
///     .connect_timeout(Duration::from_secs(10))
///     .timeout(Duration::from_secs(120));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    /// Maximum time to establish a connection.
    ///
    /// Default: 30s
    pub connect_timeout: Duration,

    /// Overall deadline for a request, including reading the body.
    ///
    /// Default: None (no deadline)
    pub timeout: Option<Duration>,

    /// `User-Agent` sent with every request.
    ///
    /// Default: `courier/<crate version>`
    pub user_agent: Option<String>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout:         None,
            user_agent:      Some(concat!("courier/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl TransportOptions {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn no_user_agent(mut self) -> Self {
        self.user_agent = None;
        self
    }
}

/// Bulk request configuration, applied with `Request::options`.
///
/// Empty collections leave the request untouched; non-empty ones replace
/// what the request already had.
#[derive(Default)]
pub struct RequestOptions {
    pub headers:      Headers,
    pub auth:         Option<Arc<dyn AuthSpec>>,
    pub content_type: Option<String>,
    pub on_progress:  Vec<ProgressHandler>,
    pub before_send:  Vec<BeforeSendHook>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(key, value);
        self
    }

    pub fn auth(mut self, auth: impl AuthSpec + 'static) -> Self {
        self.auth = Some(Arc::new(auth));
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn on_progress<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Progress) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.on_progress.push(Arc::new(handler));
        self
    }

    pub fn before_send<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut RawRequest) -> Result<(), BoxError> + Send + 'static,
    {
        self.before_send.push(Box::new(hook));
        self
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("headers", &self.headers.len())
            .field("auth", &self.auth.is_some())
            .field("content_type", &self.content_type)
            .field("on_progress", &self.on_progress.len())
            .field("before_send", &self.before_send.len())
            .finish()
    }
}
