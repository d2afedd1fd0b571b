//! HTTP message types
//!
//! This module defines the request handed to the application and the
//! response it fills in.

use super::{Error, Headers, Result, CONTENT_TYPE, HTTP_11};
use bytes::{Buf, Bytes};
use std::fmt;
use std::io::{self, Read};

/// Default response status code
pub const DEFAULT_CODE: u16 = 200;

/// Default response mimetype
pub const DEFAULT_MIMETYPE: &str = "text/plain";

/// HTTP request
///
/// Only produced for a request line that parsed and declared HTTP/1.1.
/// Never modified after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    command_line: String,
    method: String,
    path: String,
    version: String,
    headers: Headers,
}

impl Request {
    pub(crate) fn new(
        command_line: String,
        method: String,
        path: String,
        version: String,
        headers: Headers,
    ) -> Self {
        Request {
            command_line,
            method,
            path,
            version,
            headers,
        }
    }

    /// Create a builder for constructing requests outside the parser
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Get the raw request line as received
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Get the request method
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the request path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the HTTP version token
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line)
    }
}

/// Builder for requests
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<String>,
    path: Option<String>,
    version: Option<String>,
    headers: Headers,
}

impl RequestBuilder {
    /// Set the method
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the version token
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Build the request
    pub fn build(self) -> Request {
        let method = self.method.unwrap_or_else(|| "GET".to_string());
        let path = self.path.unwrap_or_else(|| "/".to_string());
        let version = self.version.unwrap_or_else(|| HTTP_11.to_string());
        let command_line = format!("{} {} {}", method, path, version);
        Request::new(command_line, method, path, version, self.headers)
    }
}

/// HTTP response
///
/// The status code is not validated: any `u16` is written as-is, and
/// producing a meaningful code is the handler's job. `Content-Type` is
/// always taken from the mimetype and cannot be set as a header.
pub struct Response {
    code: u16,
    mimetype: String,
    headers: Headers,
    content: Box<dyn Read + Send>,
}

impl Response {
    /// Create a `200 text/plain` response with an empty body
    pub fn new() -> Self {
        Response {
            code: DEFAULT_CODE,
            mimetype: DEFAULT_MIMETYPE.to_string(),
            headers: Headers::new(),
            content: Box::new(io::empty()),
        }
    }

    /// Get the status code
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Set the status code
    pub fn set_code(&mut self, code: u16) {
        self.code = code;
    }

    /// Get the mimetype written as `Content-Type`
    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    /// Set the mimetype
    pub fn set_mimetype(&mut self, mimetype: impl Into<String>) {
        self.mimetype = mimetype.into();
    }

    /// Get the additional headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Set an additional header
    ///
    /// Fails with `Error::ReservedHeader` for `Content-Type` in any casing,
    /// and with `Error::InvalidHeader` when the name or value holds CR or LF.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        let value = value.into();
        if name.trim().eq_ignore_ascii_case(CONTENT_TYPE) {
            return Err(Error::ReservedHeader(name));
        }
        if has_line_break(&name) {
            return Err(Error::InvalidHeader(name));
        }
        if has_line_break(&value) {
            return Err(Error::InvalidHeader(value));
        }
        self.headers.insert(name, value);
        Ok(())
    }

    /// Remove an additional header
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(name)
    }

    /// Set an in-memory body
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.content = Box::new(body.into().reader());
    }

    /// Set a streaming body, drained once when the response is written
    pub fn set_content(&mut self, content: impl Read + Send + 'static) {
        self.content = Box::new(content);
    }

    /// Builder-style `set_code`
    pub fn with_code(mut self, code: u16) -> Self {
        self.set_code(code);
        self
    }

    /// Builder-style `set_mimetype`
    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.set_mimetype(mimetype);
        self
    }

    /// Builder-style `set_header`
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        self.set_header(name, value)?;
        Ok(self)
    }

    /// Builder-style `set_body`
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.set_body(body);
        self
    }

    pub(crate) fn into_parts(self) -> (u16, String, Headers, Box<dyn Read + Send>) {
        (self.code, self.mimetype, self.headers, self.content)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("code", &self.code)
            .field("mimetype", &self.mimetype)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_defaults() {
        let resp = Response::default();
        assert_eq!(resp.code(), 200);
        assert_eq!(resp.mimetype(), "text/plain");
        assert!(resp.headers().is_empty());

        let (_, _, _, mut content) = resp.into_parts();
        let mut body = Vec::new();
        content.read_to_end(&mut body).unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_content_type_is_reserved() {
        let mut resp = Response::new();
        assert!(matches!(
            resp.set_header("Content-Type", "text/html"),
            Err(Error::ReservedHeader(_))
        ));
        assert!(matches!(
            resp.set_header("content-type", "text/html"),
            Err(Error::ReservedHeader(_))
        ));
        assert!(resp.headers().is_empty());

        resp.set_mimetype("text/html");
        assert_eq!(resp.mimetype(), "text/html");
    }

    #[test]
    fn test_header_line_breaks_are_rejected() {
        let mut resp = Response::new();
        assert!(matches!(
            resp.set_header("X-Test", "1\r\nSet-Cookie: a=b"),
            Err(Error::InvalidHeader(_))
        ));
        assert!(matches!(
            resp.set_header("X-Test\n", "1"),
            Err(Error::InvalidHeader(_))
        ));
        assert!(Response::new().with_header("X-Test", "a\rb").is_err());
        assert!(resp.headers().is_empty());

        resp.set_header("X-Test", "a: b").unwrap();
        assert_eq!(resp.headers().get("X-Test"), Some("a: b"));
    }

    #[test]
    fn test_code_is_not_validated() {
        let resp = Response::new().with_code(999);
        assert_eq!(resp.code(), 999);
    }

    #[test]
    fn test_builder_style() {
        let resp = Response::new()
            .with_code(404)
            .with_mimetype("application/json")
            .with_header("X-Test", "1")
            .unwrap()
            .with_body("{}");

        assert_eq!(resp.code(), 404);
        assert_eq!(resp.mimetype(), "application/json");
        assert_eq!(resp.headers().get("X-Test"), Some("1"));

        let (_, _, _, mut content) = resp.into_parts();
        let mut body = String::new();
        content.read_to_string(&mut body).unwrap();
        assert_eq!(body, "{}");
    }

    #[test]
    fn test_streaming_content() {
        let mut resp = Response::new();
        resp.set_content(io::Cursor::new(b"streamed".to_vec()));

        let (_, _, _, mut content) = resp.into_parts();
        let mut body = Vec::new();
        content.read_to_end(&mut body).unwrap();
        assert_eq!(body, b"streamed");
    }

    #[test]
    fn test_request_builder() {
        let req = Request::builder()
            .method("POST")
            .path("/submit")
            .header("Host", "localhost")
            .build();

        assert_eq!(req.command_line(), "POST /submit HTTP/1.1");
        assert_eq!(req.method(), "POST");
        assert_eq!(req.path(), "/submit");
        assert_eq!(req.version(), "HTTP/1.1");
        assert_eq!(req.header("Host"), Some("localhost"));
        assert_eq!(req.to_string(), "POST /submit HTTP/1.1");
    }
}
