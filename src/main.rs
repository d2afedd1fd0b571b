//! minihttpd demo server
//!
//! Answers every request with a numbered greeting and logs what it served.

use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use clap::Parser;
use minihttpd::http::HandlerResult;
use minihttpd::{serve, Request, Response, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "minihttpd", version, about = "Minimal HTTP/1.1 demo server")]
struct Args {
    /// Host or address to bind
    #[arg(long, env = "MINIHTTPD_HOST", default_value = minihttpd::config::DEFAULT_HOST)]
    host: String,

    /// Port to bind
    #[arg(short, long, env = "MINIHTTPD_PORT", default_value_t = minihttpd::config::DEFAULT_PORT)]
    port: u16,

    /// Per-read/write socket timeout in milliseconds
    #[arg(
        long,
        env = "MINIHTTPD_READ_TIMEOUT_MS",
        default_value_t = 5000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    read_timeout_ms: u64,

    /// Listen backlog
    #[arg(long, env = "MINIHTTPD_BACKLOG", default_value_t = minihttpd::config::DEFAULT_BACKLOG)]
    backlog: i32,
}

impl Args {
    fn config(&self) -> ServerConfig {
        ServerConfig::new(self.host.clone(), self.port)
            .read_timeout(Duration::from_millis(self.read_timeout_ms))
            .backlog(self.backlog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_read_timeout_is_rejected() {
        assert!(Args::try_parse_from(["minihttpd", "--read-timeout-ms", "0"]).is_err());

        let args = Args::try_parse_from(["minihttpd", "--read-timeout-ms", "250"]).unwrap();
        assert_eq!(args.config().read_timeout, Duration::from_millis(250));
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = minihttpd::diag::init() {
        eprintln!("cannot initialize logging: {}", e);
    }
    tracing::info!("Initializing minihttpd...");

    let counter = AtomicU64::new(0);
    let result = serve(
        &args.config(),
        move |request: &Request, response: &mut Response| -> HandlerResult {
            tracing::info!("SERVE: {} {}", request.command_line(), request.headers());
            response.set_header("CustomHeader", "CustomHeaderValue")?;

            let n = counter.fetch_add(1, Ordering::Relaxed);
            response.set_body(format!("[{}] Hello world", n));
            Ok(())
        },
    );

    tracing::info!("Terminated main thread.");
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
