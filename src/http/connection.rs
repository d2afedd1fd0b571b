//! Single-connection driver
//!
//! A `ConnectionHandler` owns one accepted socket from start to finish:
//!
//! ```text
//! accepted -> parsing -> invalid ------------------------------> closed
//!                     -> valid -> dispatch -> writing ----------> closed
//!          (any failure) -------------------------------> error -> closed
//! ```
//!
//! The socket is shut down and closed on every path, including a panicking
//! handler. Failures are logged here and never reach the listener.

use crate::config::DEFAULT_READ_TIMEOUT;

use super::{
    write_response, Error, Handler, InvalidRequest, ParseOutcome, RequestParser, Response, Result,
};
use std::any::Any;
use std::io::BufReader;
use std::net::{Shutdown, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a connection ended
#[derive(Debug)]
pub enum ConnectionOutcome {
    /// A response was written; carries the number of body bytes sent
    Responded(u64),
    /// No request could be parsed; nothing was written
    Invalid(InvalidRequest),
    /// Configuring the socket, the handler or writing failed
    Failed(Error),
}

impl ConnectionOutcome {
    /// True if a response was written
    pub fn is_responded(&self) -> bool {
        matches!(self, ConnectionOutcome::Responded(_))
    }
}

/// Shuts down and closes the socket when dropped
struct SocketGuard {
    stream: TcpStream,
}

impl Drop for SocketGuard {
    fn drop(&mut self) {
        // The peer may already be gone
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

/// Drives one request/response exchange per accepted socket
pub struct ConnectionHandler<H> {
    handler: Arc<H>,
    read_timeout: Duration,
}

impl<H> Clone for ConnectionHandler<H> {
    fn clone(&self) -> Self {
        ConnectionHandler {
            handler: Arc::clone(&self.handler),
            read_timeout: self.read_timeout,
        }
    }
}

impl<H: Handler> ConnectionHandler<H> {
    /// Create a connection handler
    ///
    /// `read_timeout` bounds every read and write on the socket. A zero
    /// timeout cannot be set on a socket and falls back to
    /// `DEFAULT_READ_TIMEOUT`.
    pub fn new(handler: Arc<H>, read_timeout: Duration) -> Self {
        let read_timeout = if read_timeout.is_zero() {
            DEFAULT_READ_TIMEOUT
        } else {
            read_timeout
        };

        ConnectionHandler {
            handler,
            read_timeout,
        }
    }

    /// Get the per-read/write socket timeout
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Get the application handler
    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// Handle one accepted connection, then close it
    pub fn handle(&self, stream: TcpStream) -> ConnectionOutcome {
        let start = Instant::now();
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let outcome = {
            let socket = SocketGuard { stream };
            self.exchange(&socket.stream)
        };

        match &outcome {
            ConnectionOutcome::Responded(bytes) => {
                tracing::debug!("Sent {} body bytes to {}", bytes, peer);
            }
            ConnectionOutcome::Invalid(InvalidRequest::Io(_)) => {
                // Already logged by the parser
            }
            ConnectionOutcome::Invalid(reason) => {
                tracing::debug!("Dropping {}: {}", peer, reason);
            }
            ConnectionOutcome::Failed(e) => {
                tracing::error!("Error: {}", e);
            }
        }

        tracing::info!("Request processed in {} ms", start.elapsed().as_millis());
        outcome
    }

    fn exchange(&self, stream: &TcpStream) -> ConnectionOutcome {
        if let Err(e) = self.configure(stream) {
            return ConnectionOutcome::Failed(e);
        }

        let request = match RequestParser::new(BufReader::new(stream)).parse() {
            ParseOutcome::Parsed(request) => request,
            ParseOutcome::Invalid(reason) => return ConnectionOutcome::Invalid(reason),
        };
        tracing::debug!("Serving {}", request);

        let mut response = Response::new();
        let handled = panic::catch_unwind(AssertUnwindSafe(|| {
            self.handler.handle(&request, &mut response)
        }));

        match handled {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return ConnectionOutcome::Failed(Error::Handler(e)),
            Err(payload) => return ConnectionOutcome::Failed(Error::Panic(panic_message(&*payload))),
        }

        // Draining the content runs application code too
        let written = panic::catch_unwind(AssertUnwindSafe(|| write_response(stream, response)));

        match written {
            Ok(Ok(bytes)) => ConnectionOutcome::Responded(bytes),
            Ok(Err(e)) => ConnectionOutcome::Failed(e),
            Err(payload) => ConnectionOutcome::Failed(Error::Panic(panic_message(&*payload))),
        }
    }

    fn configure(&self, stream: &TcpStream) -> Result<()> {
        stream.set_read_timeout(Some(self.read_timeout))?;
        stream.set_write_timeout(Some(self.read_timeout))?;
        stream.set_nodelay(true)?;
        Ok(())
    }
}

/// Extract the message of a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
