use std::sync::Arc;

use super::request::Request;
use super::transport::Transport;
use crate::data::Method;

/// Entry point for building requests against a shared transport.
///
/// Cloning is cheap; every clone and every request it creates share the
/// same transport.
#[derive(Debug)]
pub struct Client<T> {
    transport: Arc<T>,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    pub fn from_shared(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a request with an arbitrary method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> Request<T> {
        Request::new(method, url.into(), Arc::clone(&self.transport))
    }

    pub fn get(&self, url: impl Into<String>) -> Request<T> {
        self.request(Method::Get, url)
    }

    pub fn head(&self, url: impl Into<String>) -> Request<T> {
        self.request(Method::Head, url)
    }

    pub fn post(&self, url: impl Into<String>) -> Request<T> {
        self.request(Method::Post, url)
    }

    pub fn put(&self, url: impl Into<String>) -> Request<T> {
        self.request(Method::Put, url)
    }

    pub fn patch(&self, url: impl Into<String>) -> Request<T> {
        self.request(Method::Patch, url)
    }

    pub fn delete(&self, url: impl Into<String>) -> Request<T> {
        self.request(Method::Delete, url)
    }

    pub fn connect(&self, url: impl Into<String>) -> Request<T> {
        self.request(Method::Connect, url)
    }

    pub fn options(&self, url: impl Into<String>) -> Request<T> {
        self.request(Method::Options, url)
    }

    pub fn trace(&self, url: impl Into<String>) -> Request<T> {
        self.request(Method::Trace, url)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_client {
    use super::*;
    use crate::data::TransportOptions;
    use crate::effects::ReqwestTransport;
    use crate::error::{Error, Result};

    impl Client<ReqwestTransport> {
        /// Client over `reqwest` with default [`TransportOptions`].
        pub fn new() -> Result<Self> {
            Self::with_options(&TransportOptions::default())
        }

        pub fn with_options(options: &TransportOptions) -> Result<Self> {
            let transport =
                ReqwestTransport::with_options(options).map_err(|e| Error::Build(Box::new(e)))?;
            Ok(Self::with_transport(transport))
        }

        pub fn from_reqwest(client: reqwest::Client) -> Self {
            Self::with_transport(ReqwestTransport::from_client(client))
        }
    }
}
