//! Request types consumed by form binding.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::{self, Read};

use bytes::Bytes;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};

/// A request body delivered as a stream of chunks.
pub type BodyStream<'a> = BoxStream<'a, io::Result<Bytes>>;

/// Chunk size used by [`read_chunks`] callers that have no better figure.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// HEAD method
    Head,
    /// OPTIONS method
    Options,
    /// TRACE method
    Trace,
    /// CONNECT method
    Connect,
    /// Any extension method. Never safe.
    Other,
}

impl Method {
    /// Parses a method from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            "TRACE" => Some(Self::Trace),
            "CONNECT" => Some(Self::Connect),
            _ => None,
        }
    }

    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
            Self::Other => "OTHER",
        }
    }

    /// Returns whether the method only reads. Forms received through a safe
    /// method are never considered submitted.
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options | Self::Trace)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The parts of a request form binding reads.
///
/// Implement this for the request type of your HTTP stack; the crate ships
/// an implementation for its own [`Request`] and, with the `http` feature,
/// for `http::Request<B>`.
pub trait FormRequest {
    /// Returns the request method.
    fn method(&self) -> Method;

    /// Returns the raw `Content-Type` header value.
    fn content_type(&self) -> Option<&str>;

    /// Returns the declared body length, when known.
    ///
    /// A declared length above the size limit rejects the request before any
    /// chunk of the body is pulled.
    fn content_length(&self) -> Option<u64> {
        None
    }

    /// Returns the body as a stream of chunks, or `None` when the request
    /// has none.
    ///
    /// Chunks are pulled as the decoder consumes them and the size limit is
    /// checked on every chunk, so an oversized body is never read in full.
    fn body(&self) -> Option<BodyStream<'_>>;

    /// Returns the raw query string without the leading `?`.
    fn query(&self) -> Option<&str> {
        None
    }
}

/// An HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Raw query string.
    pub query: Option<String>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Bytes>,
}

impl Request {
    /// Creates a new request. A `?` in `uri` starts the query string.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (uri, None),
        };
        Self {
            method,
            path,
            query,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Creates a GET request.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::Get, uri)
    }

    /// Creates a POST request.
    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::Post, uri)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a URL-encoded form body and its content type.
    #[must_use]
    pub fn form(self, pairs: &[(&str, &str)]) -> Self {
        // Serializing string pairs cannot fail.
        let body = serde_urlencoded::to_string(pairs).unwrap_or_default();
        self.header("Content-Type", mime::APPLICATION_WWW_FORM_URLENCODED.as_ref())
            .body(body)
    }

    /// Sets a multipart body and its content type.
    #[must_use]
    pub fn multipart(self, body: MultipartBody) -> Self {
        let content_type = body.content_type();
        self.header("Content-Type", content_type).body(body.into_bytes())
    }

    /// Gets a header value.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

impl FormRequest for Request {
    fn method(&self) -> Method {
        self.method
    }

    fn content_type(&self) -> Option<&str> {
        self.get_header("content-type")
    }

    fn content_length(&self) -> Option<u64> {
        self.body
            .as_ref()
            .map(|body| u64::try_from(body.len()).unwrap_or(u64::MAX))
    }

    fn body(&self) -> Option<BodyStream<'_>> {
        self.body.clone().map(buffered)
    }

    fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

/// Wraps an in-memory body as a single-chunk stream.
pub fn buffered(body: Bytes) -> BodyStream<'static> {
    stream::once(future::ready(Ok(body))).boxed()
}

/// Streams a reader in chunks of at most `chunk_size` bytes.
///
/// Each chunk is read only when the consumer asks for it.
pub fn read_chunks<'a, R>(reader: R, chunk_size: usize) -> BodyStream<'a>
where
    R: Read + Send + 'a,
{
    stream::unfold(Some(reader), move |reader| async move {
        let Some(mut reader) = reader else {
            return None;
        };
        let mut buf = vec![0; chunk_size];
        match reader.read(&mut buf) {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                Some((Ok(Bytes::from(buf)), Some(reader)))
            }
            Err(err) => Some((Err(err), None)),
        }
    })
    .boxed()
}

#[cfg(feature = "http")]
impl From<&http::Method> for Method {
    /// Method names are case-sensitive; anything unlisted is an extension.
    fn from(method: &http::Method) -> Self {
        match method.as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "PATCH" => Self::Patch,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "TRACE" => Self::Trace,
            "CONNECT" => Self::Connect,
            _ => Self::Other,
        }
    }
}

/// Adapts requests from the `http` crate. An empty body counts as no body.
#[cfg(feature = "http")]
impl<B: AsRef<[u8]>> FormRequest for http::Request<B> {
    fn method(&self) -> Method {
        Method::from(self.method())
    }

    fn content_type(&self) -> Option<&str> {
        self.headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    fn content_length(&self) -> Option<u64> {
        u64::try_from(self.body().as_ref().len()).ok()
    }

    fn body(&self) -> Option<BodyStream<'_>> {
        let body = self.body().as_ref();
        if body.is_empty() {
            return None;
        }
        Some(buffered(Bytes::copy_from_slice(body)))
    }

    fn query(&self) -> Option<&str> {
        self.uri().query()
    }
}

/// Builds a `multipart/form-data` body.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    /// Creates an empty body with a fixed boundary.
    pub fn new() -> Self {
        Self::with_boundary("oxide-forms-boundary-7MA4YWxkTrZu0gW")
    }

    /// Creates an empty body with the given boundary.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    /// Appends a text part.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part(&format!(r#"form-data; name="{name}""#), None);
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Appends a file part.
    #[must_use]
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.open_part(
            &format!(r#"form-data; name="{name}"; filename="{filename}""#),
            Some(content_type),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Returns the matching `Content-Type` header value.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Closes the body and returns its bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        let closing = format!("--{}--\r\n", self.boundary);
        self.body.extend_from_slice(closing.as_bytes());
        self.body
    }

    fn open_part(&mut self, disposition: &str, content_type: Option<&str>) {
        let mut head = format!("--{}\r\nContent-Disposition: {disposition}\r\n", self.boundary);
        if let Some(content_type) = content_type {
            let _ = write!(head, "Content-Type: {content_type}\r\n");
        }
        head.push_str("\r\n");
        self.body.extend_from_slice(head.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!(Method::parse("GET"), Some(Method::Get));
        assert_eq!(Method::parse("post"), Some(Method::Post));
        assert_eq!(Method::parse("trace"), Some(Method::Trace));
        assert_eq!(Method::parse("CONNECT"), Some(Method::Connect));
        assert_eq!(Method::parse("INVALID"), None);
    }

    #[test]
    fn test_safe_methods() {
        assert!(Method::Get.is_safe());
        assert!(Method::Head.is_safe());
        assert!(Method::Trace.is_safe());
        assert!(!Method::Post.is_safe());
        assert!(!Method::Delete.is_safe());
        assert!(!Method::Connect.is_safe());
        assert!(!Method::Other.is_safe());
    }

    fn collect(body: BodyStream<'_>) -> Vec<Bytes> {
        futures::executor::block_on(body.map(|chunk| chunk.unwrap()).collect())
    }

    #[test]
    fn test_read_chunks_splits_reader() {
        let data = b"abcdefghij";
        let chunks = collect(read_chunks(&data[..], 4));
        assert_eq!(chunks, [&b"abcd"[..], &b"efgh"[..], &b"ij"[..]]);
    }

    #[test]
    fn test_read_chunks_stops_after_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk gone"))
            }
        }

        let results: Vec<_> =
            futures::executor::block_on(read_chunks(Broken, 4).collect::<Vec<_>>());
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_request_builder() {
        let req = Request::post("/signup?ref=home")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("email=a%40b.com");

        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/signup");
        assert_eq!(FormRequest::query(&req), Some("ref=home"));
        assert_eq!(
            FormRequest::content_type(&req),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(FormRequest::content_length(&req), Some(15));
        let body = FormRequest::body(&req).map(collect);
        assert_eq!(body, Some(vec![Bytes::from_static(b"email=a%40b.com")]));
    }

    #[test]
    fn test_request_without_body() {
        let req = Request::post("/signup");
        assert!(FormRequest::body(&req).is_none());
        assert_eq!(FormRequest::content_length(&req), None);
    }

    #[test]
    fn test_form_body_is_encoded() {
        let req = Request::post("/").form(&[("name", "John Doe"), ("email", "a@b.com")]);
        assert_eq!(
            req.body.as_deref(),
            Some(&b"name=John+Doe&email=a%40b.com"[..])
        );
        assert_eq!(
            req.get_header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_multipart_body_layout() {
        let body = MultipartBody::with_boundary("XYZ")
            .text("title", "Hello")
            .file("doc", "a.txt", "text/plain", b"data");
        assert_eq!(body.content_type(), "multipart/form-data; boundary=XYZ");
        let bytes = String::from_utf8(body.into_bytes()).unwrap();
        assert_eq!(
            bytes,
            "--XYZ\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nHello\r\n\
             --XYZ\r\nContent-Disposition: form-data; name=\"doc\"; filename=\"a.txt\"\r\n\
             Content-Type: text/plain\r\n\r\ndata\r\n--XYZ--\r\n"
        );
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_request_adapter() {
        let req = http::Request::post("/signup?x=1")
            .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(b"a=1".to_vec())
            .unwrap();
        assert_eq!(FormRequest::method(&req), Method::Post);
        assert_eq!(FormRequest::query(&req), Some("x=1"));
        assert_eq!(FormRequest::content_length(&req), Some(3));
        let body = FormRequest::body(&req).map(collect);
        assert_eq!(body, Some(vec![Bytes::from_static(b"a=1")]));
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_adapter_maps_every_method() {
        let method = |m: http::Method| {
            let req = http::Request::builder().method(m).body(Vec::<u8>::new()).unwrap();
            FormRequest::method(&req)
        };
        assert_eq!(method(http::Method::TRACE), Method::Trace);
        assert_eq!(method(http::Method::CONNECT), Method::Connect);
        assert_eq!(method(http::Method::PATCH), Method::Patch);
        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        assert_eq!(method(purge), Method::Other);
        assert!(method(http::Method::TRACE).is_safe());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_empty_body_is_no_body() {
        let req = http::Request::post("/signup")
            .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Vec::<u8>::new())
            .unwrap();
        assert!(FormRequest::body(&req).is_none());
    }
}
