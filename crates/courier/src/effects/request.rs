use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use super::body::{Body, BoxReader};
use super::progress::progress_observer;
use super::response::Response;
use super::tee::Tee;
use super::transport::{RawRequest, Transport};
use crate::core::AuthSpec;
use crate::data::{
    BeforeSendHook, Direction, Headers, Method, Progress, ProgressHandler, RequestOptions,
};
use crate::error::{BoxError, Error, Result};

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";

/// An outbound request, built up with consuming setters and sent once.
pub struct Request<T> {
    method:      Method,
    url:         String,
    headers:     Headers,
    body:        Option<Body>,
    before_send: Vec<BeforeSendHook>,
    on_progress: Vec<ProgressHandler>,
    transport:   Arc<T>,
}

impl<T: Transport> Request<T> {
    pub(crate) fn new(method: Method, url: String, transport: Arc<T>) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: None,
            before_send: Vec::new(),
            on_progress: Vec::new(),
            transport,
        }
    }

    /// Add a header, keeping any existing values for the same key.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(key, value);
        self
    }

    /// Replace every header.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.headers.set(CONTENT_TYPE, content_type);
        self
    }

    /// Append a form-encoded `key=value` pair to the URL's query string.
    ///
    /// The pair goes before any `#fragment`. A URL that does not parse is
    /// still extended, so the transport reports the bad URL when sending.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        if let Ok(mut parsed) = url::Url::parse(&self.url) {
            parsed.query_pairs_mut().append_pair(key, value);
            self.url = parsed.into();
            return self;
        }

        let fragment = self.url.find('#').map(|at| self.url.split_off(at));
        let separator = match self.url.find('?') {
            None => "?",
            Some(_) if self.url.ends_with('?') || self.url.ends_with('&') => "",
            Some(_) => "&",
        };
        self.url.push_str(separator);
        self.url.extend(url::form_urlencoded::byte_serialize(key.as_bytes()));
        self.url.push('=');
        self.url.extend(url::form_urlencoded::byte_serialize(value.as_bytes()));
        if let Some(fragment) = fragment {
            self.url.push_str(&fragment);
        }
        self
    }

    /// Attach a body. A [`Multipart`](crate::Multipart) body also sets the
    /// `Content-Type` header to its boundary.
    ///
    /// Whether the method accepts a body is only checked when sending.
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        let body = body.into();
        if let Some(multipart) = body.as_multipart() {
            self.headers.set(CONTENT_TYPE, multipart.content_type());
        }
        self.body = Some(body);
        self
    }

    pub fn body_string(self, text: impl Into<String>) -> Self {
        self.body(text.into())
    }

    /// Authorize with `auth`, replacing any previous `Authorization`.
    pub fn auth(mut self, auth: impl AuthSpec) -> Self {
        self.headers.set(AUTHORIZATION, auth.token());
        self
    }

    pub fn clear_auth(mut self) -> Self {
        self.headers.remove(AUTHORIZATION);
        self
    }

    /// Register a hook that sees the fully built request right before it
    /// goes to the transport. Hooks run in registration order.
    pub fn before_send<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut RawRequest) -> std::result::Result<(), BoxError> + Send + 'static,
    {
        self.before_send.push(Box::new(hook));
        self
    }

    /// Register an upload progress handler.
    pub fn on_progress<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Progress) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        self.on_progress.push(Arc::new(handler));
        self
    }

    /// Apply a whole [`RequestOptions`] at once.
    pub fn options(mut self, options: RequestOptions) -> Self {
        if !options.headers.is_empty() {
            self.headers = options.headers;
        }
        if let Some(auth) = options.auth {
            self.headers.set(AUTHORIZATION, auth.token());
        }
        if let Some(content_type) = options.content_type {
            self.headers.set(CONTENT_TYPE, content_type);
        }
        if !options.on_progress.is_empty() {
            self.on_progress = options.on_progress;
        }
        if !options.before_send.is_empty() {
            self.before_send = options.before_send;
        }
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers_ref(&self) -> &Headers {
        &self.headers
    }

    pub fn body_mut(&mut self) -> Option<&mut Body> {
        self.body.as_mut()
    }

    /// Send the request and hand the response to `on_response`.
    ///
    /// A multipart body is assembled here, so it must not have been
    /// assembled before: a form that was already assembled, or whose
    /// allocated assembly failed, is rejected with `AlreadyAssembled`.
    /// Any assembly error aborts before network I/O. The transport is called
    /// exactly once unless an earlier step fails.
    pub async fn send_with<F, Fut, R>(self, on_response: F) -> Result<R>
    where
        F: FnOnce(Response) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let Self {
            method,
            url,
            headers,
            body,
            before_send,
            on_progress,
            transport,
        } = self;

        if body.is_some() && !method.allows_body() {
            return Err(Error::BodyNotAllowed(method));
        }

        let mut body = body;
        if let Some(multipart) = body.as_mut().and_then(Body::as_multipart_mut) {
            multipart
                .assemble()
                .await
                .map_err(|e| e.context("failed to assemble multipart request body"))?;
        }

        let content_length = body.as_ref().and_then(Body::len);
        let body: Option<BoxReader> = body.map(|body| -> BoxReader {
            if on_progress.is_empty() {
                Box::pin(body)
            } else {
                let observer = progress_observer(content_length, Direction::Upload, on_progress);
                Box::pin(Tee::new(body, observer))
            }
        });

        let mut raw = RawRequest {
            method,
            url,
            headers,
            content_length,
            body,
        };
        for mut hook in before_send {
            hook(&mut raw).map_err(Error::Hook)?;
        }

        let (method, url) = (raw.method, raw.url.clone());
        debug!(%method, %url, content_length = ?raw.content_length, "sending request");

        let raw = transport
            .execute(raw)
            .await
            .map_err(|e| Error::Transport {
                method,
                url: url.clone(),
                source: Box::new(e),
            })?;
        debug!(%method, %url, status = raw.status, "received response");

        on_response(Response::from_raw(raw)).await
    }

    /// Send the request and return the unread response.
    pub async fn send(self) -> Result<Response> {
        self.send_with(|response| async { Ok(response) }).await
    }
}

impl<T> fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers.len())
            .field("body", &self.body)
            .field("before_send", &self.before_send.len())
            .field("on_progress", &self.on_progress.len())
            .finish_non_exhaustive()
    }
}
