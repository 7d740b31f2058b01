//! Request descriptors
//!
//! A `RequestDescriptor` is the normalized representation of what is being
//! asked for. It is immutable once built; fingerprinting is a pure function
//! of it.

use url::Url;

/// A normalized outgoing request.
///
/// The `headers` field holds decorative headers (`User-Agent`, anything
/// passed with `--header`). They are sent on the wire but deliberately do
/// not participate in the cache fingerprint, so two requests differing only
/// in decoration share a cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// HTTP method, always upper-cased
    method: String,
    /// Absolute target URL
    url: Url,
    /// Decorative header name/value pairs, in the order given
    headers: Vec<(String, String)>,
    /// Raw request body, if any
    body: Option<Vec<u8>>,
    /// Upstream proxy as `host` or `host:port`, if any
    proxy: Option<String>,
}

impl RequestDescriptor {
    pub fn new(method: &str, url: Url) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url,
            headers: Vec::new(),
            body: None,
            proxy: None,
        }
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_is_uppercased() {
        let url = Url::parse("http://example.com").unwrap();
        let req = RequestDescriptor::new("patch", url);
        assert_eq!(req.method(), "PATCH");
    }

    #[test]
    fn test_builder_fields_round_trip() {
        let url = Url::parse("http://example.com/a?b=c").unwrap();
        let req = RequestDescriptor::new("POST", url.clone())
            .with_headers(vec![("Gub".to_string(), "zub".to_string())])
            .with_body(b"gub=zub".to_vec())
            .with_proxy("boom:123");

        assert_eq!(req.url(), &url);
        assert_eq!(req.headers(), &[("Gub".to_string(), "zub".to_string())]);
        assert_eq!(req.body(), Some(b"gub=zub".as_slice()));
        assert_eq!(req.proxy(), Some("boom:123"));
    }
}
