//! Incoming request view.

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};

/// The request side of a [`Context`](crate::Context): the parsed head of the
/// inbound HTTP request plus its fully collected body.
#[derive(Debug)]
pub struct Request {
    pub(crate) parts: Parts,
    pub(crate) body: Bytes,
}

impl Request {
    pub(crate) fn new(parts: Parts, body: Bytes) -> Self {
        Self { parts, body }
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn uri(&self) -> &Uri { &self.parts.uri }
    pub fn path(&self) -> &str { self.parts.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Header lookup by name. Returns `None` for absent headers and for
    /// values that are not valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parses the URL's query string. Derived on each call from the URI —
    /// the request stores no query state.
    pub fn query(&self) -> Query {
        Query::parse(self.parts.uri.query().unwrap_or(""))
    }
}

// ── Query ─────────────────────────────────────────────────────────────────────

/// Parsed query parameters.
///
/// Keys are unique. A duplicate key overwrites the previous value
/// (last-value-wins) while keeping the position of its first occurrence, so
/// `a=1&a=2&b=3` yields `a=2, b=3` in that order. Keys and values are
/// percent-decoded.
#[derive(Debug)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub(crate) fn parse(raw: &str) -> Self {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match pairs.iter_mut().find(|(k, _)| k.as_str() == key.as_ref()) {
                Some((_, v)) => *v = value.into_owned(),
                None => pairs.push((key.into_owned(), value.into_owned())),
            }
        }
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates pairs in insertion order of each key's first occurrence.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize { self.pairs.len() }
    pub fn is_empty(&self) -> bool { self.pairs.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_last_value_wins() {
        let q = Query::parse("a=1&a=2&b=3");
        assert_eq!(q.get("a"), Some("2"));
        assert_eq!(q.get("b"), Some("3"));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn order_is_first_occurrence() {
        let q = Query::parse("b=1&a=2&b=3");
        let keys: Vec<&str> = q.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(q.get("b"), Some("3"));
    }

    #[test]
    fn percent_decoding() {
        let q = Query::parse("msg=hello%20world&plus=a+b");
        assert_eq!(q.get("msg"), Some("hello world"));
        assert_eq!(q.get("plus"), Some("a b"));
    }

    #[test]
    fn empty_query() {
        let q = Query::parse("");
        assert!(q.is_empty());
        assert_eq!(q.get("a"), None);
    }

    #[test]
    fn query_derived_from_uri() {
        let (parts, _) = http::Request::builder()
            .uri("/x?a=1&a=2&b=3")
            .body(())
            .unwrap()
            .into_parts();
        let req = Request::new(parts, bytes::Bytes::new());
        assert_eq!(req.path(), "/x");
        assert_eq!(req.query().get("a"), Some("2"));
    }
}
