//! Network layer
//!
//! Listening socket management and per-connection dispatch.

pub mod listener;

pub use listener::{serve, Listener, ShutdownHandle};
