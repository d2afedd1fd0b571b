//! HTTP/1.1 request/response core
//!
//! This module provides the wire-level pieces of the server: parsing a
//! request off a connection, the request/response model, serializing a
//! response, and driving a single connection from accept to close.
//!
//! # Architecture
//!
//! Every connection carries exactly one exchange:
//!
//! - `RequestParser` reads the request line and headers from the socket
//! - the application's `Handler` fills in a `Response`
//! - `write_response` serializes it and the socket is closed
//!
//! There is no keep-alive, no chunked encoding and no request body framing.
//!
//! # Examples
//!
//! ```no_run
//! use minihttpd::http::{Request, Response, HandlerResult};
//! use minihttpd::{serve, ServerConfig};
//!
//! let config = ServerConfig::default().port(8080);
//! serve(&config, |request: &Request, response: &mut Response| -> HandlerResult {
//!     response.set_body(format!("you asked for {}", request.path()));
//!     Ok(())
//! })
//! .unwrap();
//! ```

pub mod connection;
pub mod handler;
pub mod headers;
pub mod message;
pub mod parser;
pub mod writer;

pub use connection::{ConnectionHandler, ConnectionOutcome};
pub use handler::{respond_with, Handler, HandlerError, HandlerResult};
pub use headers::Headers;
pub use message::{Request, Response};
pub use parser::{InvalidRequest, ParseOutcome, RequestParser};
pub use writer::write_response;

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP operation errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot resolve address: {0}")]
    AddrResolve(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Header {0} is controlled by the response mimetype")]
    ReservedHeader(String),

    #[error("Header line break in {0:?}")]
    InvalidHeader(String),

    #[error("Handler failed: {0}")]
    Handler(#[source] HandlerError),

    #[error("Handler panicked: {0}")]
    Panic(String),
}

/// Protocol version token every accepted request line must contain
pub const HTTP_11: &str = "HTTP/1.1";

/// CRLF line ending
pub const CRLF: &str = "\r\n";

/// Header name reserved for `Response::mimetype`
pub const CONTENT_TYPE: &str = "Content-Type";
