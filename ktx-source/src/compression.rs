/// Transparent gzip support for ridership exports
use flate2::read::GzDecoder;
use ktx_core::Result;
use std::borrow::Cow;
use std::io::Read;

/// First two bytes of every gzip stream.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Returns true if `bytes` start with the gzip magic number.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Decompress a gzip stream into raw bytes.
///
/// # Errors
///
/// Returns `KtxError::Io` if the stream is truncated or corrupt.
pub fn gunzip(input: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(input);
    let mut output: Vec<u8> = Vec::new();
    decoder.read_to_end(&mut output)?;
    Ok(output)
}

/// Gunzip `bytes` if they are compressed, otherwise borrow them unchanged.
pub fn maybe_gunzip(bytes: &[u8]) -> Result<Cow<'_, [u8]>> {
    if is_gzip(bytes) {
        let output = gunzip(bytes)?;
        log::info!(
            "[KTX] source: decompressed {} gzip bytes into {}",
            bytes.len(),
            output.len()
        );
        Ok(Cow::Owned(output))
    } else {
        Ok(Cow::Borrowed(bytes))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_round_trip_through_gzip() {
        let compressed = gzip(b"period,station\n2023-01,A\n");
        assert!(is_gzip(&compressed));
        let output = maybe_gunzip(&compressed).unwrap();
        assert_eq!(&output[..], b"period,station\n2023-01,A\n");
    }

    #[test]
    fn test_plain_bytes_are_borrowed() {
        let plain = b"period,station\n";
        let output = maybe_gunzip(plain).unwrap();
        assert!(matches!(output, Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncated_stream_fails() {
        let compressed = gzip(b"some ridership rows that will be cut short");
        let truncated = &compressed[..compressed.len() / 2];
        assert!(gunzip(truncated).is_err());
    }
}
