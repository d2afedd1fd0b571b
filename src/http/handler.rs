//! Application callback interface
//!
//! The server calls a `Handler` once per valid request, on the connection's
//! own thread. Two callback styles are supported:
//!
//! - `Fn(&Request, &mut Response) -> HandlerResult`, which fills in the
//!   response the server created
//! - `Fn(&Request) -> HandlerResult<Response>`, wrapped with `respond_with`,
//!   which builds its own response

use super::{Request, Response};

/// Error type handlers may return
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by handlers
pub type HandlerResult<T = ()> = std::result::Result<T, HandlerError>;

/// Request handler
///
/// Handlers are shared by every connection thread, so any state they carry
/// must be thread-safe.
pub trait Handler: Send + Sync + 'static {
    /// Fill in `response` for `request`
    ///
    /// An error aborts the exchange: nothing is written and the connection
    /// is closed.
    fn handle(&self, request: &Request, response: &mut Response) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
{
    fn handle(&self, request: &Request, response: &mut Response) -> HandlerResult {
        self(request, response)
    }
}

/// Handler built from a function returning a fresh `Response`
pub struct RespondWith<F>(F);

impl<F> Handler for RespondWith<F>
where
    F: Fn(&Request) -> HandlerResult<Response> + Send + Sync + 'static,
{
    fn handle(&self, request: &Request, response: &mut Response) -> HandlerResult {
        *response = (self.0)(request)?;
        Ok(())
    }
}

/// Adapt a `Request -> Response` function into a `Handler`
pub fn respond_with<F>(f: F) -> RespondWith<F>
where
    F: Fn(&Request) -> HandlerResult<Response> + Send + Sync + 'static,
{
    RespondWith(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn body_of(response: Response) -> String {
        let (_, _, _, mut content) = response.into_parts();
        let mut body = String::new();
        content.read_to_string(&mut body).unwrap();
        body
    }

    #[test]
    fn test_closure_handler() {
        let handler = |request: &Request, response: &mut Response| -> HandlerResult {
            response.set_header("X-Path", request.path())?;
            response.set_body("hello");
            Ok(())
        };

        let request = Request::builder().path("/greet").build();
        let mut response = Response::new();
        handler.handle(&request, &mut response).unwrap();

        assert_eq!(response.headers().get("X-Path"), Some("/greet"));
        assert_eq!(body_of(response), "hello");
    }

    #[test]
    fn test_respond_with() {
        let handler = respond_with(|request: &Request| {
            Ok(Response::new()
                .with_code(201)
                .with_body(request.method().to_string()))
        });

        let request = Request::builder().method("PUT").build();
        let mut response = Response::new();
        handler.handle(&request, &mut response).unwrap();

        assert_eq!(response.code(), 201);
        assert_eq!(body_of(response), "PUT");
    }

    #[test]
    fn test_handler_error_propagates() {
        let handler = |_: &Request, response: &mut Response| -> HandlerResult {
            response.set_header("Content-Type", "text/html")?;
            Ok(())
        };

        let request = Request::builder().build();
        let mut response = Response::new();
        let err = handler.handle(&request, &mut response).unwrap_err();
        assert!(err.to_string().contains("Content-Type"));
    }
}
