//! Text-safe snapshot encoding
//!
//! The durable medium stores string values, so the binary snapshot is
//! carried as standard base64. `decode(encode(b)) == b` for every byte
//! sequence, including the empty one.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mercura_core::{LedgerError, LedgerResult};

/// Encode a binary snapshot for storage in a string value space.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a previously encoded snapshot. Input that is not valid base64
/// fails with `CorruptSnapshot`.
pub fn decode(text: &str) -> LedgerResult<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| LedgerError::CorruptSnapshot(format!("invalid encoding: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let cases: Vec<Vec<u8>> = vec![
            vec![],
            vec![0],
            vec![0xff; 32],
            (0..=255).collect(),
            b"snapshot body".to_vec(),
        ];
        for bytes in cases {
            assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
        }
    }

    #[test]
    fn test_encoded_form_is_text_safe() {
        let encoded = encode(&(0..=255).collect::<Vec<u8>>());
        assert!(encoded.chars().all(|c| c.is_ascii_alphanumeric()
            || c == '+'
            || c == '/'
            || c == '='));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode("not valid base64 !!!").unwrap_err();
        assert!(matches!(err, LedgerError::CorruptSnapshot(_)));
    }
}
