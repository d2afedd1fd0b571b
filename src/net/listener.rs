//! TCP listener with thread-per-connection dispatch.
//!
//! # Responsibilities
//! - Bind to the configured host and port
//! - Accept connections until the listener is closed
//! - Hand every connection to its own thread without waiting for it
//! - Keep accepting when a single `accept()` fails
//!
//! There is no connection limit and no queue: every accepted socket gets a
//! thread immediately.

use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::config::ServerConfig;
use crate::http::{ConnectionHandler, Error, Handler, Result};

/// Pause after a failed `accept()` before trying again
const ACCEPT_ERROR_PAUSE: Duration = Duration::from_millis(50);

/// How long `ShutdownHandle::close` waits for its wake-up connection
const WAKE_TIMEOUT: Duration = Duration::from_millis(500);

/// A bound listening socket.
pub struct Listener {
    socket: Socket,
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    read_timeout: Duration,
}

impl Listener {
    /// Bind to the configured address.
    ///
    /// A failure is logged and returned; no socket is left open.
    pub fn bind(config: &ServerConfig) -> Result<Self> {
        tracing::info!("Binding to {}...", config.address());

        match Self::bind_inner(config) {
            Ok(listener) => {
                tracing::info!("Waiting for requests on http://{}/ ...", listener.local_addr);
                Ok(listener)
            }
            Err(e) => {
                tracing::error!("Error: {}", e);
                Err(e)
            }
        }
    }

    fn bind_inner(config: &ServerConfig) -> Result<Self> {
        if config.read_timeout.is_zero() {
            return Err(Error::InvalidConfig("read timeout must be non-zero".to_string()));
        }

        let addr = resolve(&config.host, config.port)?;
        let socket = open(addr, config.backlog).map_err(|source| Error::Bind {
            addr: config.address(),
            source,
        })?;

        let local_addr = socket
            .local_addr()?
            .as_socket()
            .ok_or_else(|| Error::AddrResolve(config.address()))?;

        Ok(Listener {
            socket,
            local_addr,
            closed: Arc::new(AtomicBool::new(false)),
            read_timeout: config.read_timeout,
        })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Get a handle that can close this listener from another thread.
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        Ok(ShutdownHandle {
            socket: Arc::new(self.socket.try_clone()?),
            local_addr: self.local_addr,
            closed: Arc::clone(&self.closed),
        })
    }

    /// Accept and dispatch connections until the listener is closed.
    pub fn run<H: Handler>(self, handler: H) -> Result<()> {
        self.run_shared(Arc::new(handler))
    }

    /// Like `run`, for a handler the caller keeps a reference to.
    pub fn run_shared<H: Handler>(self, handler: Arc<H>) -> Result<()> {
        let Listener {
            socket,
            local_addr,
            closed,
            read_timeout,
        } = self;

        let listener: TcpListener = socket.into();
        let conn = ConnectionHandler::new(handler, read_timeout);
        let mut next_id: u64 = 0;

        loop {
            match listener.accept() {
                Ok((stream, peer)) => {
                    if closed.load(Ordering::Acquire) {
                        tracing::debug!("Dropping connection from {}: listener closed", peer);
                        break;
                    }

                    next_id += 1;
                    tracing::debug!("Accepted connection from {}", peer);
                    dispatch(&conn, stream, next_id);
                }
                Err(_) if closed.load(Ordering::Acquire) => break,
                Err(e) => {
                    tracing::error!("Error: {}", e);
                    thread::sleep(ACCEPT_ERROR_PAUSE);
                }
            }
        }

        tracing::info!("Listener on {} closed", local_addr);
        Ok(())
    }
}

/// Closes a running `Listener` from another thread.
///
/// Holds a duplicate of the listening socket, so the port stays bound until
/// both the listener and every handle are dropped.
#[derive(Clone)]
pub struct ShutdownHandle {
    socket: Arc<Socket>,
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Stop the accept loop. Connections already dispatched run to completion.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        // Wakes a blocked accept() on Linux
        let _ = self.socket.shutdown(Shutdown::Both);

        // Elsewhere a throwaway connection does the same
        let _ = TcpStream::connect_timeout(&wake_addr(self.local_addr), WAKE_TIMEOUT);
    }

    /// True once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Bind to `config` and serve `handler` until the listener is closed.
pub fn serve<H: Handler>(config: &ServerConfig, handler: H) -> Result<()> {
    Listener::bind(config)?.run(handler)
}

/// Spawn the connection thread for `stream`
fn dispatch<H: Handler>(conn: &ConnectionHandler<H>, stream: TcpStream, id: u64) {
    let conn = conn.clone();
    let spawned = thread::Builder::new()
        .name(format!("conn-{}", id))
        .spawn(move || {
            conn.handle(stream);
        });

    // On failure the closure, and with it the socket, is dropped
    if let Err(e) = spawned {
        tracing::error!("Error: cannot spawn connection thread: {}", e);
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| Error::AddrResolve(format!("{}:{}: {}", host, port, e)))?
        .next()
        .ok_or_else(|| Error::AddrResolve(format!("{}:{}", host, port)))
}

fn open(addr: SocketAddr, backlog: i32) -> std::io::Result<Socket> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&SockAddr::from(addr))?;
    socket.listen(backlog)?;
    Ok(socket)
}

/// Address a local client can connect to for `addr`
fn wake_addr(addr: SocketAddr) -> SocketAddr {
    let mut addr = addr;
    if addr.ip().is_unspecified() {
        match addr {
            SocketAddr::V4(_) => addr.set_ip(std::net::Ipv4Addr::LOCALHOST.into()),
            SocketAddr::V6(_) => addr.set_ip(std::net::Ipv6Addr::LOCALHOST.into()),
        }
    }
    addr
}
