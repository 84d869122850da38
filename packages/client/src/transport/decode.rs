//! Transparent response decompression.

use std::io::{self, Read};

use bytes::Bytes;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use http::HeaderMap;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH};

use crate::error::{self, Error};

/// Value sent as `Accept-Encoding` when the caller did not choose one.
pub(crate) const ACCEPT_ENCODING: &str = "gzip, deflate";

/// Decompressed bodies larger than this are rejected.
const READ_LIMIT: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Gzip,
    Deflate,
}

impl Encoding {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(CONTENT_ENCODING)?.to_str().ok()?.trim();
        if value.eq_ignore_ascii_case("gzip") || value.eq_ignore_ascii_case("x-gzip") {
            Some(Encoding::Gzip)
        } else if value.eq_ignore_ascii_case("deflate") {
            Some(Encoding::Deflate)
        } else {
            None
        }
    }
}

/// Decodes `body` according to `Content-Encoding`.
///
/// Decoded responses lose their `Content-Encoding` and `Content-Length`
/// headers. Unknown encodings are passed through untouched.
pub(crate) fn decode(headers: &mut HeaderMap, body: Bytes) -> Result<Bytes, Error> {
    let Some(encoding) = Encoding::from_headers(headers) else {
        return Ok(body);
    };

    let decoded = if body.is_empty() {
        body
    } else {
        match encoding {
            Encoding::Gzip => read_limited(GzDecoder::new(&body[..]))?,
            // servers disagree on whether deflate carries the zlib wrapper
            Encoding::Deflate => match read_limited(ZlibDecoder::new(&body[..])) {
                Ok(decoded) => decoded,
                Err(_) => read_limited(DeflateDecoder::new(&body[..]))?,
            },
        }
    };

    headers.remove(CONTENT_ENCODING);
    headers.remove(CONTENT_LENGTH);
    Ok(decoded)
}

fn read_limited<R: Read>(decoder: R) -> Result<Bytes, Error> {
    let mut out = Vec::new();
    let read = decoder
        .take(READ_LIMIT + 1)
        .read_to_end(&mut out)
        .map_err(error::decode)?;
    if read as u64 > READ_LIMIT {
        return Err(error::decode(io::Error::new(
            io::ErrorKind::InvalidData,
            "decompressed body exceeds size limit",
        )));
    }
    Ok(Bytes::from(out))
}
