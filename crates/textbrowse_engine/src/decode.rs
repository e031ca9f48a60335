use std::borrow::Cow;
use std::io::Read;

use encoding_rs::UTF_8;
use engine_logging::engine_debug;
use flate2::read::GzDecoder;
use percent_encoding::percent_decode_str;
use thiserror::Error;

use crate::http::ProtocolError;

/// The only `content-encoding` value that is decompressed.
pub const GZIP_ENCODING: &str = "gzip";

/// Decode a response body: gunzip when `content_encoding` is exactly `gzip`,
/// then strict UTF-8. Any other encoding value leaves the bytes untouched.
pub fn decode_body(bytes: &[u8], content_encoding: Option<&str>) -> Result<String, ProtocolError> {
    let raw: Cow<'_, [u8]> = if content_encoding == Some(GZIP_ENCODING) {
        let mut inflated = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut inflated)
            .map_err(ProtocolError::Gzip)?;
        engine_debug!(
            "gunzipped body: {} -> {} bytes",
            bytes.len(),
            inflated.len()
        );
        Cow::Owned(inflated)
    } else {
        if let Some(other) = content_encoding {
            engine_debug!("leaving content-encoding {other:?} undecoded");
        }
        Cow::Borrowed(bytes)
    };

    utf8_text(&raw).ok_or(ProtocolError::InvalidBodyEncoding)
}

/// Strict UTF-8 decode. A leading BOM is kept as U+FEFF.
pub(crate) fn utf8_text(bytes: &[u8]) -> Option<String> {
    UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed percent escape at offset {offset}")]
pub struct MalformedEscape {
    pub offset: usize,
}

/// Replace `%XX` escapes with the byte they encode. Every `%` must be followed
/// by two hex digits.
pub fn percent_decode(input: &str) -> Result<Vec<u8>, MalformedEscape> {
    let bytes = input.as_bytes();
    let malformed = bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'%')
        .map(|(offset, _)| offset)
        .find(|&offset| {
            !bytes
                .get(offset + 1..offset + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit))
        });
    if let Some(offset) = malformed {
        return Err(MalformedEscape { offset });
    }
    Ok(percent_decode_str(input).collect())
}
