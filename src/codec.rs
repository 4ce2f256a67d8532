use crate::{PixelClipError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::debug;

/// An in-memory media file: opaque bytes plus the declared MIME type.
///
/// Payloads are immutable once created; re-selecting a file produces a new
/// payload rather than mutating the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    bytes: Vec<u8>,
    mime: String,
}

impl MediaPayload {
    /// Create a payload from raw bytes and a declared MIME type
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// The raw file contents
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The declared MIME type, e.g. `video/mp4`
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the declared MIME type identifies a video
    pub fn is_video(&self) -> bool {
        self.mime.starts_with("video/")
    }
}

/// Encode a payload as a self-describing data URI:
/// `data:<mime>;base64,<data>`.
///
/// Deterministic and total for any binary input.
pub fn encode(payload: &MediaPayload) -> String {
    debug!(
        "Encoding {} byte payload ({}) as data URI",
        payload.len(),
        payload.mime()
    );
    format!("data:{};base64,{}", payload.mime, STANDARD.encode(&payload.bytes))
}

/// Decode a data URI back into a payload.
///
/// The exact left inverse of [`encode`]: for every payload `p`,
/// `decode(&encode(&p))` returns `p`. Fails with `MalformedRepresentation`
/// when the scheme, the `;base64,` delimiter, or the base64 payload segment
/// is not well formed.
pub fn decode(repr: &str) -> Result<MediaPayload> {
    let rest = repr
        .strip_prefix("data:")
        .ok_or_else(|| malformed("missing 'data:' scheme"))?;

    let (mime, data) = rest
        .split_once(";base64,")
        .ok_or_else(|| malformed("missing ';base64,' delimiter"))?;

    let bytes = STANDARD
        .decode(data)
        .map_err(|e| malformed(&format!("invalid base64 payload: {}", e)))?;

    debug!("Decoded data URI into {} byte payload ({})", bytes.len(), mime);
    Ok(MediaPayload::new(bytes, mime))
}

/// Extract the top-level MIME category, e.g. `video` from `video/mp4`.
///
/// Used at the processing boundary to reject a response whose declared type
/// is incompatible with the input's media category (a still image returned
/// for a video input, for instance).
pub fn mime_category(mime: &str) -> &str {
    mime.split('/').next().unwrap_or(mime)
}

fn malformed(detail: &str) -> PixelClipError {
    PixelClipError::MalformedRepresentation(detail.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_shape() {
        let payload = MediaPayload::new(b"hello".to_vec(), "video/mp4");
        assert_eq!(encode(&payload), "data:video/mp4;base64,aGVsbG8=");
    }

    #[test]
    fn test_encode_empty_payload() {
        let payload = MediaPayload::new(Vec::new(), "video/webm");
        assert_eq!(encode(&payload), "data:video/webm;base64,");
    }

    #[test]
    fn test_round_trip() {
        let payload = MediaPayload::new((0u8..=255).collect(), "video/mp4");
        let decoded = decode(&encode(&payload)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_round_trip_empty() {
        let payload = MediaPayload::new(Vec::new(), "video/ogg");
        let decoded = decode(&encode(&payload)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_decode_missing_scheme() {
        let result = decode("video/mp4;base64,aGVsbG8=");
        assert!(matches!(
            result,
            Err(PixelClipError::MalformedRepresentation(_))
        ));
    }

    #[test]
    fn test_decode_missing_delimiter() {
        let result = decode("data:video/mp4,aGVsbG8=");
        assert!(matches!(
            result,
            Err(PixelClipError::MalformedRepresentation(_))
        ));
    }

    #[test]
    fn test_decode_invalid_base64() {
        let result = decode("data:video/mp4;base64,not*valid*base64!");
        assert!(matches!(
            result,
            Err(PixelClipError::MalformedRepresentation(_))
        ));
    }

    #[test]
    fn test_mime_category() {
        assert_eq!(mime_category("video/mp4"), "video");
        assert_eq!(mime_category("image/png"), "image");
        assert_eq!(mime_category("weird"), "weird");
    }

    #[test]
    fn test_is_video() {
        assert!(MediaPayload::new(vec![], "video/mp4").is_video());
        assert!(!MediaPayload::new(vec![], "image/png").is_video());
        assert!(!MediaPayload::new(vec![], "application/octet-stream").is_video());
    }
}
