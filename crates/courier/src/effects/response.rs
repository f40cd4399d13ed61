use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::io::AsyncReadExt;

use super::body::BoxReader;
use super::progress::progress_observer;
use super::tee::Tee;
use super::transport::RawResponse;
use crate::data::{Direction, Headers, Progress, ProgressHandler};
use crate::error::{BoxError, Result};

/// A received response whose body has not been read yet.
///
/// The body can be consumed once; [`consume`](Response::consume) and
/// [`read_all`](Response::read_all) take the response by value.
pub struct Response {
    status:         u16,
    headers:        Headers,
    content_length: Option<u64>,
    body:           BoxReader,
    on_progress:    Vec<ProgressHandler>,
}

impl Response {
    pub fn from_raw(raw: RawResponse) -> Self {
        Self {
            status:         raw.status,
            headers:        raw.headers,
            content_length: raw.content_length,
            body:           raw.body,
            on_progress:    Vec::new(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// First value of header `key`, matched case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn is_success(&self) -> bool {
        crate::core::is_success(self.status)
    }

    pub fn is_redirect(&self) -> bool {
        crate::core::is_redirect(self.status)
    }

    pub fn is_success_or_redirect(&self) -> bool {
        crate::core::is_success_or_redirect(self.status)
    }

    pub fn is_error(&self) -> bool {
        crate::core::is_error(self.status)
    }

    pub fn is_auth_error(&self) -> bool {
        crate::core::is_auth_error(self.status)
    }

    /// Register a download progress handler.
    pub fn on_progress<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Progress) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        self.on_progress.push(Arc::new(handler));
        self
    }

    /// Hand the body to `f`. The body is dropped, closing the underlying
    /// connection stream, as soon as `f` completes or fails.
    pub async fn consume<F, Fut, R>(self, f: F) -> Result<R>
    where
        F: FnOnce(BoxReader) -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let body = if self.on_progress.is_empty() {
            self.body
        } else {
            let observer =
                progress_observer(self.content_length, Direction::Download, self.on_progress);
            Box::pin(Tee::new(self.body, observer))
        };
        f(body).await
    }

    /// Read the whole body into memory.
    pub async fn read_all(self) -> Result<Vec<u8>> {
        let capacity = self.content_length.unwrap_or(0).min(1 << 20) as usize;
        self.consume(|mut body| async move {
            let mut out = Vec::with_capacity(capacity);
            body.read_to_end(&mut out).await?;
            Ok::<_, crate::Error>(out)
        })
        .await
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("content_length", &self.content_length)
            .field("on_progress", &self.on_progress.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static [u8]) -> Response {
        let headers: Headers = [("Content-Type".to_string(), "text/plain".to_string())]
            .into_iter()
            .collect();
        Response::from_raw(RawResponse::new(
            status,
            headers,
            Some(body.len() as u64),
            body,
        ))
    }

    #[test]
    fn unauthorized_is_an_auth_error() {
        let res = response(401, b"");
        assert!(res.is_auth_error());
        assert!(res.is_error());
        assert!(!res.is_success());
    }

    #[test]
    fn no_content_is_success() {
        let res = response(204, b"");
        assert!(res.is_success());
        assert!(res.is_success_or_redirect());
        assert!(!res.is_error());
        assert_eq!(res.header("content-type"), Some("text/plain"));
    }

    #[tokio::test]
    async fn read_all_returns_the_body() {
        let body = response(200, b"{\"jobs\":[]}").read_all().await.unwrap();
        assert_eq!(body, b"{\"jobs\":[]}");
    }
}
