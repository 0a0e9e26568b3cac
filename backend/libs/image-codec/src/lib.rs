//! Inline image codec for the Mural API.
//!
//! Posts carry their image as a base64 data URL inside the JSON payload.
//! This crate owns both directions of that contract:
//!
//! - [`decode`]: data URL (or raw base64) -> validated raw bytes
//! - [`encode`]: raw bytes -> data URL labeled from the sniffed format
//!
//! No MIME type is ever stored. The format is always derived from the magic
//! bytes of the payload, so a data URL with a lying `data:image/...` prefix
//! is either relabeled (payload is a real JPEG/PNG) or rejected.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Maximum accepted image payload after base64 decoding.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Minimum payload length required to sniff a format.
///
/// The PNG signature is eight bytes long; anything shorter cannot be
/// classified and is treated as unsupported.
const SNIFF_LEN: usize = 8;

const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageCodecError {
    #[error("image payload is not valid base64")]
    InvalidEncoding,

    #[error("image payload exceeds the maximum size of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("image payload is not a supported format (JPEG or PNG)")]
    UnsupportedFormat,
}

/// Image formats accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Classify a payload by its leading magic bytes.
    ///
    /// Returns `None` for payloads shorter than eight bytes or with an
    /// unrecognized signature.
    pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
        if bytes.len() < SNIFF_LEN {
            return None;
        }
        if bytes[..JPEG_MAGIC.len()] == JPEG_MAGIC {
            return Some(ImageFormat::Jpeg);
        }
        if bytes[..PNG_MAGIC.len()] == PNG_MAGIC {
            return Some(ImageFormat::Png);
        }
        None
    }

    pub fn mime(&self) -> mime::Mime {
        match self {
            ImageFormat::Jpeg => mime::IMAGE_JPEG,
            ImageFormat::Png => mime::IMAGE_PNG,
        }
    }
}

/// Decode and validate an inline image.
///
/// Accepts either a raw base64 string or a `data:image/<type>;base64,<b64>`
/// data URL. A data-URL prefix is stripped; the type it declares is ignored.
/// The decoded payload must be at most [`MAX_IMAGE_BYTES`] and carry a JPEG
/// or PNG signature.
pub fn decode(input: &str) -> Result<Vec<u8>, ImageCodecError> {
    decode_with_limit(input, MAX_IMAGE_BYTES)
}

/// [`decode`] with a caller-supplied size cap (deployments may lower it).
pub fn decode_with_limit(input: &str, limit: usize) -> Result<Vec<u8>, ImageCodecError> {
    let payload = strip_data_url_prefix(input);

    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| ImageCodecError::InvalidEncoding)?;

    if bytes.len() > limit {
        return Err(ImageCodecError::PayloadTooLarge { limit });
    }

    if ImageFormat::sniff(&bytes).is_none() {
        return Err(ImageCodecError::UnsupportedFormat);
    }

    Ok(bytes)
}

/// Encode stored image bytes as a data URL.
///
/// The MIME label comes strictly from the sniffed signature. Empty or
/// unrecognized payloads yield `None`, matching the external contract where
/// a post without a usable image serializes `imagem: null`.
pub fn encode(bytes: &[u8]) -> Option<String> {
    let format = ImageFormat::sniff(bytes)?;
    Some(format!(
        "data:{};base64,{}",
        format.mime(),
        STANDARD.encode(bytes)
    ))
}

/// Strip a `data:image/<type>;base64,` prefix, if present.
///
/// Only the `data:image/` scheme is recognized; a prefix without the
/// `;base64,` marker is left alone so the strict base64 decode rejects it.
fn strip_data_url_prefix(input: &str) -> &str {
    if !input.starts_with("data:image/") {
        return input;
    }
    match input.find(";base64,") {
        Some(idx) => &input[idx + ";base64,".len()..],
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest payloads that pass the signature sniff. Not renderable
    // images, but the codec only inspects the leading bytes.
    fn jpeg_bytes(len: usize) -> Vec<u8> {
        assert!(len >= SNIFF_LEN);
        let mut bytes = vec![0u8; len];
        bytes[..3].copy_from_slice(&JPEG_MAGIC);
        bytes
    }

    fn png_bytes(len: usize) -> Vec<u8> {
        assert!(len >= SNIFF_LEN);
        let mut bytes = vec![0u8; len];
        bytes[..8].copy_from_slice(&PNG_MAGIC);
        bytes
    }

    #[test]
    fn decodes_raw_base64_jpeg() {
        let original = jpeg_bytes(64);
        let decoded = decode(&STANDARD.encode(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn decodes_data_url_and_ignores_declared_type() {
        // PNG bytes wrapped in a prefix claiming JPEG: the sniffed format
        // wins and the decode succeeds.
        let original = png_bytes(32);
        let input = format!("data:image/jpeg;base64,{}", STANDARD.encode(&original));
        let decoded = decode(&input).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(ImageFormat::sniff(&decoded), Some(ImageFormat::Png));
    }

    #[test]
    fn rejects_malformed_base64() {
        assert_eq!(decode("not-base64!!"), Err(ImageCodecError::InvalidEncoding));
    }

    #[test]
    fn rejects_data_url_without_base64_marker() {
        // The unstripped prefix reaches the base64 decoder and fails there.
        let input = format!("data:image/png,{}", STANDARD.encode(png_bytes(16)));
        assert_eq!(decode(&input), Err(ImageCodecError::InvalidEncoding));
    }

    #[test]
    fn rejects_unsupported_signature() {
        let gif = b"GIF89a\x00\x00\x00\x00";
        assert_eq!(
            decode(&STANDARD.encode(gif)),
            Err(ImageCodecError::UnsupportedFormat)
        );
    }

    #[test]
    fn rejects_payload_too_short_to_sniff() {
        // Three bytes of JPEG magic alone cannot be classified.
        assert_eq!(
            decode(&STANDARD.encode(JPEG_MAGIC)),
            Err(ImageCodecError::UnsupportedFormat)
        );
    }

    #[test]
    fn accepts_exactly_max_size() {
        let original = jpeg_bytes(MAX_IMAGE_BYTES);
        assert!(decode(&STANDARD.encode(&original)).is_ok());
    }

    #[test]
    fn rejects_one_byte_over_max_size() {
        let original = jpeg_bytes(MAX_IMAGE_BYTES + 1);
        assert_eq!(
            decode(&STANDARD.encode(&original)),
            Err(ImageCodecError::PayloadTooLarge {
                limit: MAX_IMAGE_BYTES
            })
        );
    }

    #[test]
    fn size_limit_applies_before_signature_check() {
        // Oversized and unrecognizable: the size error wins.
        let oversized = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert_eq!(
            decode(&STANDARD.encode(&oversized)),
            Err(ImageCodecError::PayloadTooLarge {
                limit: MAX_IMAGE_BYTES
            })
        );
    }

    #[test]
    fn encode_labels_jpeg_from_magic_bytes() {
        let url = encode(&jpeg_bytes(16)).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn encode_labels_png_from_magic_bytes() {
        let url = encode(&png_bytes(16)).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn encode_returns_none_for_empty_or_unknown_payloads() {
        assert_eq!(encode(&[]), None);
        assert_eq!(encode(b"GIF89a\x00\x00\x00\x00"), None);
    }

    #[test]
    fn round_trip_relabels_lying_data_url() {
        // decode tolerates the wrong declared type; encode emits the truth.
        let original = jpeg_bytes(48);
        let lying = format!("data:image/png;base64,{}", STANDARD.encode(&original));
        let bytes = decode(&lying).unwrap();
        let url = encode(&bytes).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(decode(&url).unwrap(), original);
    }

    #[test]
    fn round_trip_preserves_bytes() {
        for original in [jpeg_bytes(1024), png_bytes(1024)] {
            let url = encode(&original).unwrap();
            assert_eq!(decode(&url).unwrap(), original);
        }
    }
}
