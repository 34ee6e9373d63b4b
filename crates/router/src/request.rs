//! The narrow boundary between the routing engine and the HTTP server that
//! hosts it.
//!
//! The engine never touches sockets or wire parsing. The hosting server
//! adapts its own request representation into a [`Request`] (method, URI,
//! headers) before calling [`dispatch`](crate::Router::dispatch), and writes
//! the [`Response`] (status, headers, accumulated body) back out afterwards.
//! The only observable side effect of dispatch on the request is the
//! population of its parameter map with captured path values.

use bytes::{BufMut, Bytes, BytesMut};
use http::{HeaderMap, Method, StatusCode, Uri};
use std::collections::HashMap;

/// An inbound request, as seen by middleware and handlers.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self { method, uri, headers: HeaderMap::new(), params: HashMap::new() }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The request path the route table matches against.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Raw captured path values, keyed by parameter name.
    ///
    /// Populated by dispatch after a route matches and before the handler
    /// runs, so downstream middleware and the handler itself can read them.
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.params
    }
}

/// An outbound response: a status code plus an append-only body writer.
///
/// The engine itself never writes a response — not even for unmatched paths.
/// Everything here is produced by user handlers and middleware.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

impl Response {
    pub fn new() -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), body: BytesMut::new() }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Appends a chunk to the response body.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) {
        self.body.put_slice(chunk.as_ref());
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Takes the accumulated body, leaving the response empty.
    pub fn take_body(&mut self) -> Bytes {
        std::mem::take(&mut self.body).freeze()
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}
