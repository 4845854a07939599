//! Legacy text encoding detection.
//!
//! The published ridership files are not UTF-8. Each candidate encoding is
//! tried in order with strict decoding (no replacement characters); the first
//! clean decode wins. A byte-order mark, when present, overrides the chain.

use encoding_rs::Encoding;
use ktx_core::{KtxError, Result};

/// Candidate labels tried when none are configured.
pub const DEFAULT_ENCODINGS: [&str; 3] = ["euc-kr", "cp949", "utf-8"];

/// Successfully decoded text plus the encoding that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static str,
}

/// The default candidate chain as owned labels.
pub fn default_labels() -> Vec<String> {
    DEFAULT_ENCODINGS.iter().map(|s| s.to_string()).collect()
}

/// Look up a label, accepting the Windows code page names that WHATWG omits.
///
/// encoding_rs implements EUC-KR as the unified Hangul superset, so the
/// Windows names map onto it.
pub fn lookup(label: &str) -> Option<&'static Encoding> {
    match label.trim().to_ascii_lowercase().as_str() {
        "cp949" | "ms949" | "uhc" => Some(encoding_rs::EUC_KR),
        other => Encoding::for_label(other.as_bytes()),
    }
}

/// Resolve labels to encodings, failing on any unknown label.
pub fn resolve_labels(labels: &[String]) -> Result<Vec<&'static Encoding>> {
    labels
        .iter()
        .map(|label| {
            lookup(label)
                .ok_or_else(|| KtxError::Config(format!("unknown text encoding label: {label}")))
        })
        .collect()
}

/// Decode `bytes` with the first candidate that succeeds.
///
/// Returns `Ok(None)` when every candidate fails; the caller turns that into
/// `EncodingUndetermined` with the file path attached.
pub fn decode(bytes: &[u8], labels: &[String]) -> Result<Option<Decoded>> {
    let candidates = resolve_labels(labels)?;

    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let body = &bytes[bom_len..];
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(body) {
            log::debug!("[KTX] source: decoded with BOM-declared {}", encoding.name());
            return Ok(Some(Decoded {
                text: text.into_owned(),
                encoding: encoding.name(),
            }));
        }
    }

    for (label, encoding) in labels.iter().zip(candidates) {
        match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            Some(text) => {
                log::debug!("[KTX] source: decoded as {} (label {})", encoding.name(), label);
                return Ok(Some(Decoded {
                    text: text.into_owned(),
                    encoding: encoding.name(),
                }));
            }
            None => log::debug!("[KTX] source: {} failed to decode, trying next", label),
        }
    }
    Ok(None)
}
