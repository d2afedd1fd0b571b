//! minihttpd - minimal embeddable HTTP/1.1 core
//!
//! This crate accepts raw TCP connections, parses one request per connection,
//! hands it to an application-supplied handler and writes the handler's
//! response back before closing the socket.

pub mod config;
pub mod diag;
pub mod http;
pub mod net;

pub use config::ServerConfig;
pub use http::{Handler, Request, Response};
pub use net::{serve, Listener, ShutdownHandle};
