//! Blob <-> text conversion for backup files.
//!
//! A token is a data URL, `data:<media-type>;base64,<payload>`, which is what
//! a browser produces for a file read as a data URL. Standard base64 never
//! emits `,`, so the last comma in a token always separates header and
//! payload and any media-type string survives the round trip.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::models::Blob;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("blob token does not start with `data:`")]
    MissingScheme,
    #[error("blob token has no payload separator")]
    MissingSeparator,
    #[error("blob token is not base64 encoded")]
    NotBase64,
    #[error("blob payload is not valid base64: {0}")]
    Payload(#[from] base64::DecodeError),
}

/// Encode a blob into a self-describing text token.
pub fn encode(blob: &Blob) -> String {
    let payload = STANDARD.encode(&blob.bytes);
    format!("{SCHEME}{}{BASE64_MARKER},{payload}", blob.media_type)
}

/// Decode a token produced by [`encode`].
pub fn decode(token: &str) -> Result<Blob, CodecError> {
    let rest = token.strip_prefix(SCHEME).ok_or(CodecError::MissingScheme)?;
    let (header, payload) = rest.rsplit_once(',').ok_or(CodecError::MissingSeparator)?;
    let media_type = header
        .strip_suffix(BASE64_MARKER)
        .ok_or(CodecError::NotBase64)?;
    let bytes = STANDARD.decode(payload)?;

    Ok(Blob {
        media_type: media_type.to_string(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_as_data_url() {
        let blob = Blob::new("audio/mpeg", b"ID3".to_vec());
        assert_eq!(encode(&blob), "data:audio/mpeg;base64,SUQz");
    }

    #[test]
    fn round_trips_bytes_and_media_type() {
        let all_bytes: Vec<u8> = (0..=255).collect();
        let cases = [
            Blob::new("audio/mpeg", all_bytes),
            Blob::new("image/png", Vec::new()),
            Blob::new("", vec![0]),
            Blob::new("audio/ogg; codecs=opus", vec![1, 2]),
            Blob::new("odd,type;base64,with,commas", vec![3, 4, 5, 6]),
        ];

        for blob in cases {
            let decoded = decode(&encode(&blob)).unwrap();
            assert_eq!(decoded, blob);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let blob = Blob::new("image/webp", vec![7; 64]);
        assert_eq!(encode(&blob), encode(&blob.clone()));
    }

    #[test]
    fn rejects_missing_scheme() {
        assert!(matches!(
            decode("audio/mpeg;base64,SUQz"),
            Err(CodecError::MissingScheme)
        ));
    }

    #[test]
    fn rejects_missing_separator() {
        assert!(matches!(
            decode("data:audio/mpeg;base64"),
            Err(CodecError::MissingSeparator)
        ));
    }

    #[test]
    fn rejects_non_base64_header() {
        assert!(matches!(
            decode("data:text/plain,hello"),
            Err(CodecError::NotBase64)
        ));
    }

    #[test]
    fn rejects_bad_alphabet_and_truncation() {
        assert!(matches!(
            decode("data:audio/mpeg;base64,SU*z"),
            Err(CodecError::Payload(_))
        ));
        assert!(matches!(
            decode("data:audio/mpeg;base64,SUQzB"),
            Err(CodecError::Payload(_))
        ));
    }
}
