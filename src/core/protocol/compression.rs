//! Gzip adapter shared by both wire formats.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use super::ProtocolError;

/// Gzip-compress `data` with the default compression level.
pub fn gzip_compress(data: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let capacity = data.len() / 2 + 32;
    let mut encoder = GzEncoder::new(Vec::with_capacity(capacity), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ProtocolError::Compression(format!("gzip write failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| ProtocolError::Compression(format!("gzip finish failed: {e}")))
}

/// Decompress a complete gzip member.
pub fn gzip_decompress(data: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 2);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| ProtocolError::Compression(format!("gzip read failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_magic_header() {
        let compressed = gzip_compress(b"{\"code\":1000}").unwrap();
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
        assert_eq!(gzip_decompress(&compressed).unwrap(), b"{\"code\":1000}");
    }

    #[test]
    fn test_empty_input_is_valid_gzip() {
        let compressed = gzip_compress(&[]).unwrap();
        assert!(!compressed.is_empty());
        assert!(gzip_decompress(&compressed).unwrap().is_empty());
    }

    #[test]
    fn test_decompress_garbage_fails() {
        let err = gzip_decompress(b"not gzip at all").unwrap_err();
        assert!(matches!(err, ProtocolError::Compression(_)));
    }
}
