use std::fmt;
use std::future::Future;
use std::pin::Pin;

use futures_util::Stream;
use tokio::io::AsyncRead;

use super::body::BoxReader;
use crate::data::{Headers, Method};

/// A boxed stream type for transport bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// A fully built request, as handed to before-send hooks and then to the
/// transport.
pub struct RawRequest {
    pub method:         Method,
    pub url:            String,
    pub headers:        Headers,
    /// Declared body length; `None` means unknown (streamed).
    pub content_length: Option<u64>,
    pub body:           Option<BoxReader>,
}

impl fmt::Debug for RawRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("content_length", &self.content_length)
            .field("body", &self.body.is_some())
            .finish()
    }
}

/// What a transport hands back: status line, headers and an unread body.
pub struct RawResponse {
    pub status:         u16,
    pub headers:        Headers,
    pub content_length: Option<u64>,
    pub body:           BoxReader,
}

impl RawResponse {
    pub fn new<R>(status: u16, headers: Headers, content_length: Option<u64>, body: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            status,
            headers,
            content_length,
            body: Box::pin(body),
        }
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Asynchronous HTTP transport.
///
/// The request core never speaks HTTP itself; it builds a [`RawRequest`]
/// and hands it here exactly once per send. Implementations own
/// connection handling, TLS, redirects and timeouts.
///
/// # Implementations
///
/// - [`ReqwestTransport`]: production implementation using `reqwest`
/// - Fakes in tests
pub trait Transport: Send + Sync {
    /// Error type for transport failures (DNS, connect, TLS, I/O).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send `request` and return the response head with an unread body.
    fn execute(
        &self,
        request: RawRequest,
    ) -> impl Future<Output = Result<RawResponse, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use std::io;

    use bytes::Bytes;
    use futures_util::StreamExt;
    use tokio_util::io::{ReaderStream, StreamReader};

    use super::*;
    use crate::data::TransportOptions;

    const CHUNK_SIZE: usize = 8 * 1024;

    /// Production transport backed by a `reqwest::Client`.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        /// Transport with [`TransportOptions::default`].
        pub fn new() -> Result<Self, reqwest::Error> {
            Self::with_options(&TransportOptions::default())
        }

        pub fn with_options(options: &TransportOptions) -> Result<Self, reqwest::Error> {
            let mut builder = reqwest::Client::builder().connect_timeout(options.connect_timeout);
            if let Some(timeout) = options.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(agent) = &options.user_agent {
                builder = builder.user_agent(agent.as_str());
            }
            Ok(Self {
                client: builder.build()?,
            })
        }

        /// Wrap an already configured client.
        pub fn from_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    impl Transport for ReqwestTransport {
        type Error = reqwest::Error;

        async fn execute(&self, request: RawRequest) -> Result<RawResponse, Self::Error> {
            let RawRequest {
                method,
                url,
                headers,
                content_length,
                body,
            } = request;

            let mut builder = self.client.request(to_reqwest(method), url.as_str());
            for (key, value) in headers.iter() {
                builder = builder.header(key, value);
            }
            if let Some(body) = body {
                if let Some(len) = content_length {
                    builder = builder.header(reqwest::header::CONTENT_LENGTH, len.to_string());
                }
                builder = builder.body(reqwest::Body::wrap_stream(request_body(body)));
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(key, value)| {
                    (
                        key.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let content_length = response.content_length();

            Ok(RawResponse::new(
                status,
                headers,
                content_length,
                response_body(response.bytes_stream()),
            ))
        }
    }

    fn to_reqwest(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Connect => reqwest::Method::CONNECT,
            Method::Options => reqwest::Method::OPTIONS,
            Method::Trace => reqwest::Method::TRACE,
        }
    }

    /// Chunk stream over a request body reader.
    fn request_body(body: BoxReader) -> ReaderStream<BoxReader> {
        ReaderStream::with_capacity(body, CHUNK_SIZE)
    }

    /// `AsyncRead` over response chunks; a stream error fails the read.
    fn response_body<S, E>(stream: S) -> StreamReader<BoxStream<'static, io::Result<Bytes>>, Bytes>
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        StreamReader::new(Box::pin(stream.map(|chunk| chunk.map_err(io::Error::other))))
    }

}

#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;
