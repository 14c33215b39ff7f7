//! Dataset fetching.
//!
//! [`Fetch`] is the only asynchronous step of the volume pipeline: it returns
//! the whole response body or a [`TransportError`]. [`HttpFetcher`] talks to a
//! server through reqwest; [`FileFetcher`] reads local files and reports
//! failures with HTTP-like status codes.

use std::future::Future;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use reqwest::Method;

/// Expected representation of the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// Raw bytes.
    #[default]
    ArrayBuffer,
}

/// A single fetch request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub response_kind: ResponseKind,
}

impl FetchRequest {
    /// A `GET` request for a binary body.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            response_kind: ResponseKind::ArrayBuffer,
        }
    }
}

/// A failed fetch. Network failures carry status 0.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("request failed with status {status}: {status_text}")]
pub struct TransportError {
    pub status: u16,
    pub status_text: String,
}

impl TransportError {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.status().map_or(0, |s| s.as_u16()), err.to_string())
    }
}

/// Retrieves a response body as a contiguous byte buffer.
pub trait Fetch {
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

/// Fetches over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        let builder = self.client.request(request.method.clone(), &request.url);
        async move {
            let response = builder.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::new(
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default(),
                ));
            }
            Ok(response.bytes().await?.to_vec())
        }
    }
}

/// Reads datasets from the local filesystem.
///
/// Accepts plain paths and `file://` URLs. Relative paths resolve against the
/// configured root, if any.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn read(&self, request: &FetchRequest) -> Result<Vec<u8>, TransportError> {
        if request.method != Method::GET {
            return Err(TransportError::new(405, "Method Not Allowed"));
        }
        let path = self.resolve(&request.url);
        std::fs::read(&path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => TransportError::new(404, "Not Found"),
            std::io::ErrorKind::PermissionDenied => TransportError::new(403, "Forbidden"),
            _ => TransportError::new(0, format!("{}: {err}", path.display())),
        })
    }
}

impl Fetch for FileFetcher {
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        std::future::ready(self.read(request))
    }
}
