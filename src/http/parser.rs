//! HTTP request parsing
//!
//! This module reads a request line and header block off a buffered
//! connection. Request bodies are never read.

use super::{Headers, Request, HTTP_11};
use std::fmt;
use std::io::{self, BufRead, Read};

/// Longest accepted line, terminator included
pub const MAX_LINE_LEN: usize = 8192;

/// Parse HTTP request line
///
/// Format: METHOD PATH VERSION
/// Example: GET /index.html HTTP/1.1
///
/// The line is split on single spaces and the first three tokens are used;
/// anything after the third token is ignored.
pub fn parse_request_line(line: &str) -> Result<(String, String, String), InvalidRequest> {
    if line.trim().is_empty() {
        return Err(InvalidRequest::Empty);
    }
    if !line.contains(HTTP_11) {
        return Err(InvalidRequest::UnsupportedVersion(line.to_string()));
    }

    let mut parts = line.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(path), Some(version)) => {
            Ok((method.to_string(), path.to_string(), version.to_string()))
        }
        _ => Err(InvalidRequest::MalformedRequestLine(line.to_string())),
    }
}

/// Why a connection did not yield a request
#[derive(Debug)]
pub enum InvalidRequest {
    /// The peer closed the connection before sending a request line
    Closed,
    /// The request line was blank
    Empty,
    /// The request line does not declare HTTP/1.1
    UnsupportedVersion(String),
    /// The request line has fewer than three tokens
    MalformedRequestLine(String),
    /// A line exceeded `MAX_LINE_LEN`
    LineTooLong,
    /// Reading failed, including read timeouts
    Io(io::Error),
}

impl fmt::Display for InvalidRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidRequest::Closed => write!(f, "connection closed before request line"),
            InvalidRequest::Empty => write!(f, "empty request line"),
            InvalidRequest::UnsupportedVersion(line) => write!(f, "not an HTTP/1.1 request: {:?}", line),
            InvalidRequest::MalformedRequestLine(line) => write!(f, "malformed request line: {:?}", line),
            InvalidRequest::LineTooLong => write!(f, "line longer than {} bytes", MAX_LINE_LEN),
            InvalidRequest::Io(e) => write!(f, "read failed: {}", e),
        }
    }
}

/// Result of parsing one connection's request
#[derive(Debug)]
pub enum ParseOutcome {
    Parsed(Request),
    Invalid(InvalidRequest),
}

impl ParseOutcome {
    /// True if a request line was parsed
    pub fn is_valid(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }

    /// Get the request, if valid
    pub fn request(&self) -> Option<&Request> {
        match self {
            ParseOutcome::Parsed(request) => Some(request),
            ParseOutcome::Invalid(_) => None,
        }
    }

    /// Take the request, if valid
    pub fn into_request(self) -> Option<Request> {
        match self {
            ParseOutcome::Parsed(request) => Some(request),
            ParseOutcome::Invalid(_) => None,
        }
    }
}

/// What a single line read produced
enum Line {
    Text(String),
    Eof,
}

/// HTTP request parser
///
/// Wraps a line-buffered reader bound to one connection.
pub struct RequestParser<R> {
    reader: R,
    line: Vec<u8>,
}

impl<R: BufRead> RequestParser<R> {
    /// Create a new request parser
    pub fn new(reader: R) -> Self {
        RequestParser {
            reader,
            line: Vec::with_capacity(256),
        }
    }

    /// Parse the request line and headers
    ///
    /// Never fails: read errors are logged and reported as
    /// `ParseOutcome::Invalid`.
    pub fn parse(&mut self) -> ParseOutcome {
        match self.parse_inner() {
            Ok(request) => ParseOutcome::Parsed(request),
            Err(InvalidRequest::Io(e)) => {
                tracing::warn!("Error reading request: {}", e);
                ParseOutcome::Invalid(InvalidRequest::Io(e))
            }
            Err(reason) => ParseOutcome::Invalid(reason),
        }
    }

    /// Get the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn parse_inner(&mut self) -> Result<Request, InvalidRequest> {
        let command_line = match self.read_line()? {
            Line::Text(line) => line,
            Line::Eof => return Err(InvalidRequest::Closed),
        };

        let (method, path, version) = parse_request_line(&command_line)?;
        let headers = self.parse_headers()?;

        Ok(Request::new(command_line, method, path, version, headers))
    }

    fn parse_headers(&mut self) -> Result<Headers, InvalidRequest> {
        let mut headers = Headers::new();

        // A blank line, a line without a colon or end of stream ends the block
        while let Line::Text(line) = self.read_line()? {
            match Headers::parse_header_line(&line) {
                Some((name, value)) => {
                    headers.insert(name, value);
                }
                None => break,
            }
        }

        Ok(headers)
    }

    /// Read one line, stripping `\n` or `\r\n`
    fn read_line(&mut self) -> Result<Line, InvalidRequest> {
        self.line.clear();

        let limit = MAX_LINE_LEN as u64;
        let n = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut self.line)
            .map_err(InvalidRequest::Io)?;

        if n == 0 {
            return Ok(Line::Eof);
        }

        if self.line.last() == Some(&b'\n') {
            self.line.pop();
            if self.line.last() == Some(&b'\r') {
                self.line.pop();
            }
        } else if n as u64 == limit {
            return Err(InvalidRequest::LineTooLong);
        }

        Ok(Line::Text(String::from_utf8_lossy(&self.line).into_owned()))
    }
}
