//! HTTP response serialization
//!
//! Wire format, every line ending in CRLF:
//!
//! ```text
//! HTTP/1.1 <code> \r\n
//! Content-Type: <mimetype>\r\n
//! <name>: <value>\r\n        one per header, insertion order
//! \r\n
//! <content>
//! ```
//!
//! The status line carries no reason phrase. No `Content-Length` or
//! `Connection` header is added: the body ends when the server closes the
//! connection.

use super::{Headers, Response, Result, CONTENT_TYPE, CRLF, HTTP_11};
use std::io::{self, BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};

/// Write the status line and header block
fn write_head<W: Write>(
    out: &mut W,
    code: u16,
    mimetype: &str,
    headers: &Headers,
) -> io::Result<()> {
    write!(out, "{} {} {}", HTTP_11, code, CRLF)?;
    write!(out, "{}: {}{}", CONTENT_TYPE, mimetype, CRLF)?;

    for (name, value) in headers.iter() {
        write!(out, "{}: {}{}", name, value, CRLF)?;
    }

    out.write_all(CRLF.as_bytes())
}

/// Serialize `response` onto `sink`
///
/// Consumes the response: its content is drained exactly once. The buffer
/// is flushed and dropped before returning. Returns the number of body
/// bytes written.
///
/// If the content reader panics, whatever is still buffered is discarded
/// rather than flushed and the panic is resumed.
pub fn write_response<W: Write>(sink: W, response: Response) -> Result<u64> {
    let (code, mimetype, headers, mut content) = response.into_parts();
    let mut out = BufWriter::new(sink);

    write_head(&mut out, code, &mimetype, &headers)?;
    let copied = match panic::catch_unwind(AssertUnwindSafe(|| io::copy(&mut content, &mut out))) {
        Ok(copied) => copied?,
        Err(payload) => {
            drop(out.into_parts());
            panic::resume_unwind(payload);
        }
    };
    out.flush()?;

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Error;

    #[test]
    fn test_write_response_exact_bytes() {
        let response = Response::new()
            .with_header("X-Test", "1")
            .unwrap()
            .with_body("ok");

        let mut wire = Vec::new();
        let written = write_response(&mut wire, response).unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(wire).unwrap(),
            "HTTP/1.1 200 \r\nContent-Type: text/plain\r\nX-Test: 1\r\n\r\nok"
        );
    }

    #[test]
    fn test_write_response_empty_body() {
        let mut wire = Vec::new();
        write_response(&mut wire, Response::new()).unwrap();

        assert_eq!(wire, b"HTTP/1.1 200 \r\nContent-Type: text/plain\r\n\r\n");
    }

    #[test]
    fn test_headers_in_insertion_order() {
        let mut response = Response::new().with_code(404).with_mimetype("text/html");
        response.set_header("Z-Last", "z").unwrap();
        response.set_header("A-First", "a").unwrap();
        response.set_header("M-Middle", "m").unwrap();

        let mut wire = Vec::new();
        write_response(&mut wire, response).unwrap();

        assert_eq!(
            String::from_utf8(wire).unwrap(),
            "HTTP/1.1 404 \r\nContent-Type: text/html\r\nZ-Last: z\r\nA-First: a\r\nM-Middle: m\r\n\r\n"
        );
    }

    #[test]
    fn test_large_streamed_body() {
        let body = "Hello World".repeat(10_000);
        let mut response = Response::new();
        response.set_content(io::Cursor::new(body.clone().into_bytes()));

        let mut wire = Vec::new();
        let written = write_response(&mut wire, response).unwrap();

        assert_eq!(written as usize, body.len());
        assert!(wire.ends_with(body.as_bytes()));
    }

    #[test]
    fn test_content_panic_discards_buffered_head() {
        struct Exploding;

        impl io::Read for Exploding {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                panic!("exploded");
            }
        }

        let mut wire = Vec::new();
        let mut response = Response::new();
        response.set_content(Exploding);

        let result = panic::catch_unwind(AssertUnwindSafe(|| write_response(&mut wire, response)));
        assert!(result.is_err());
        assert!(wire.is_empty());
    }

    #[test]
    fn test_write_error_is_returned() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let result = write_response(Broken, Response::new().with_body("ok"));
        assert!(matches!(result, Err(Error::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe));
    }
}
