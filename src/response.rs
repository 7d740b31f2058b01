//! In-memory responses and output rendering
//!
//! A `Response` is either freshly fetched or reconstructed from a cache
//! entry; callers cannot tell the two apart. Rendering with `include` set
//! reproduces a curl `--include` style block: status line, headers, blank
//! line, body.

use std::io::{self, Write};

/// A complete HTTP response: status code, headers (ordered, duplicates
/// preserved), raw body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// The status line used for `--include` output.
    ///
    /// The HTTP version is not part of the cached record, so a fixed
    /// `HTTP/1.1` prefix is used with the canonical reason phrase for the
    /// stored code.
    pub fn status_line(&self) -> String {
        let reason = reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("");
        format!("HTTP/1.1 {} {}", self.status, reason)
            .trim_end()
            .to_string()
    }

    /// Writes the response to `out`, optionally preceded by the status line
    /// and headers.
    pub fn write_to(&self, out: &mut dyn Write, include: bool) -> io::Result<()> {
        if include {
            writeln!(out, "{}", self.status_line())?;
            for (name, value) in &self.headers {
                writeln!(out, "{name}: {value}")?;
            }
            writeln!(out)?;
        }
        out.write_all(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Response {
        Response {
            status: 200,
            headers: vec![
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("Set-Cookie".to_string(), "a=1".to_string()),
                ("Set-Cookie".to_string(), "b=2".to_string()),
            ],
            body: b"hello".to_vec(),
        }
    }

    #[test]
    fn test_status_line_has_reason_phrase() {
        assert_eq!(sample().status_line(), "HTTP/1.1 200 OK");
        let not_found = Response {
            status: 404,
            headers: vec![],
            body: vec![],
        };
        assert_eq!(not_found.status_line(), "HTTP/1.1 404 Not Found");
    }

    #[test]
    fn test_status_line_tolerates_unknown_codes() {
        let odd = Response {
            status: 599,
            headers: vec![],
            body: vec![],
        };
        assert_eq!(odd.status_line(), "HTTP/1.1 599");
    }

    #[test]
    fn test_write_body_only() {
        let mut out = Vec::new();
        sample().write_to(&mut out, false).unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn test_write_include_preserves_header_order_and_duplicates() {
        let mut out = Vec::new();
        sample().write_to(&mut out, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "HTTP/1.1 200 OK\nContent-Type: text/plain\nSet-Cookie: a=1\nSet-Cookie: b=2\n\nhello"
        );
    }
}
