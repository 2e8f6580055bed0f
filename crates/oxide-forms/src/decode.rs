//! Request body decoding.
//!
//! The decoder picks a strategy from the request content type, enforces the
//! body size ceiling while the body streams in and splits it into raw scalar
//! values and raw uploads keyed by form name.

use std::collections::HashMap;

use bytes::Bytes;
use futures::executor::block_on;
use futures::TryStreamExt;
use mime::Mime;
use tracing::{debug, warn};

use crate::error::{FormError, Result};
use crate::request::{BodyStream, FormRequest};

/// Bytes per megabyte of the size limit.
const MEGABYTE: u64 = 1 << 20;

/// How a request body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `application/x-www-form-urlencoded`
    UrlEncoded,
    /// `multipart/form-data`
    Multipart,
    /// Anything else. Decodes to empty maps.
    Other,
}

impl Encoding {
    /// Selects the encoding from a `Content-Type` header value.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(mime) = content_type.and_then(|ct| ct.parse::<Mime>().ok()) else {
            return Self::Other;
        };
        if mime.essence_str() == mime::MULTIPART_FORM_DATA.essence_str() {
            Self::Multipart
        } else if mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
            Self::UrlEncoded
        } else {
            Self::Other
        }
    }
}

/// An uploaded part as received, before coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Filename sent by the client.
    pub filename: String,
    /// Content type declared by the client. Not trusted.
    pub declared_type: Option<String>,
    /// Part content.
    pub data: Bytes,
}

/// Raw form data extracted from a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawForm {
    /// Scalar values in arrival order under each key.
    pub values: HashMap<String, Vec<String>>,
    /// Uploads in arrival order under each key.
    pub files: HashMap<String, Vec<Upload>>,
}

impl RawForm {
    /// Returns the first value under `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.values.get(key)?.first().map(String::as_str)
    }

    fn push_value(&mut self, key: String, value: String) {
        self.values.entry(key).or_default().push(value);
    }

    fn push_file(&mut self, key: String, upload: Upload) {
        self.files.entry(key).or_default().push(upload);
    }
}

/// Decodes a request body.
///
/// Returns `Ok(None)` when the request has no body. `limit_mb` bounds the
/// body in megabytes. A declared length above the limit is rejected before
/// the body is touched; otherwise the limit is checked as each chunk
/// arrives.
pub fn decode(request: &dyn FormRequest, limit_mb: u64) -> Result<Option<RawForm>> {
    let Some(body) = request.body() else {
        debug!("request has no body, nothing to decode");
        return Ok(None);
    };

    let encoding = Encoding::from_content_type(request.content_type());
    let declared = request.content_length();
    debug!(?encoding, ?declared, "decoding form body");

    let limit = limit_mb.saturating_mul(MEGABYTE);
    if encoding != Encoding::Other {
        if let Some(size) = declared {
            check_size(size, limit)?;
        }
    }

    let raw = match encoding {
        Encoding::Multipart => {
            let content_type = request.content_type().unwrap_or_default();
            decode_multipart(content_type, body, limit)?
        }
        Encoding::UrlEncoded => {
            let body = read_limited(body, limit)?;
            decode_url_encoded(&body, request.query())?
        }
        Encoding::Other => RawForm::default(),
    };
    Ok(Some(raw))
}

fn check_size(size: u64, limit: u64) -> Result<()> {
    if size > limit {
        warn!(size, limit, "rejecting oversized form body");
        return Err(FormError::BodyTooLarge { size, limit });
    }
    Ok(())
}

/// Collects a body, failing as soon as it grows past `limit` bytes.
/// The chunk that crosses the limit is dropped unread.
fn read_limited(mut body: BodyStream<'_>, limit: u64) -> Result<Vec<u8>> {
    block_on(async {
        let mut buf = Vec::new();
        while let Some(chunk) = body.try_next().await? {
            let size = u64::try_from(buf.len() + chunk.len()).unwrap_or(u64::MAX);
            check_size(size, limit)?;
            buf.extend_from_slice(&chunk);
        }
        Ok::<_, FormError>(buf)
    })
}

/// Decodes a URL-encoded body. Query-string values follow body values
/// under the same key.
pub fn decode_url_encoded(body: &[u8], query: Option<&str>) -> Result<RawForm> {
    let mut raw = RawForm::default();
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
    for (key, value) in pairs {
        raw.push_value(key, value);
    }
    if let Some(query) = query {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
        for (key, value) in pairs {
            raw.push_value(key, value);
        }
    }
    Ok(raw)
}

/// Decodes a multipart body, rejecting streams longer than `limit` bytes.
///
/// The parser pulls chunks on demand and fails with
/// [`multer::Error::StreamSizeExceeded`] once the limit is crossed.
/// Parts without a filename are scalar values; parts with a filename,
/// including empty ones, are uploads.
pub fn decode_multipart(content_type: &str, body: BodyStream<'_>, limit: u64) -> Result<RawForm> {
    let boundary = multer::parse_boundary(content_type)?;
    let constraints =
        multer::Constraints::new().size_limit(multer::SizeLimit::new().whole_stream(limit));
    let mut multipart = multer::Multipart::with_constraints(body, boundary, constraints);

    block_on(async {
        let mut raw = RawForm::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(key) = field.name().map(str::to_string) else {
                continue;
            };
            let filename = field.file_name().map(str::to_string);
            let declared_type = field.content_type().map(ToString::to_string);
            let data = field.bytes().await.map_err(|source| FormError::Part {
                key: key.clone(),
                source,
            })?;

            match filename {
                Some(filename) if !filename.is_empty() => {
                    debug!(%key, %filename, size = data.len(), "read uploaded part");
                    raw.push_file(
                        key,
                        Upload {
                            filename,
                            declared_type,
                            data,
                        },
                    );
                }
                _ => raw.push_value(key, String::from_utf8_lossy(&data).into_owned()),
            }
        }
        Ok::<_, FormError>(raw)
    })
}
