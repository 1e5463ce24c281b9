use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::SourceTextError;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SourceText {
    pub text: String,
    pub encoding: String,
    pub confidence: f32,
    pub had_errors: bool,
}

/// Reads a source document, honouring a BOM and otherwise guessing the
/// encoding from the bytes. Lossy decoding is reported, not rejected.
pub fn load_source_text(path: &Path) -> Result<SourceText, SourceTextError> {
    let bytes = fs::read(path).map_err(|e| SourceTextError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let decoded = decode(&bytes);
    if decoded.text.trim().is_empty() {
        return Err(SourceTextError::Empty(path.to_path_buf()));
    }

    if decoded.had_errors {
        warn!(path = %path.display(), encoding = %decoded.encoding, "source text decoded with replacements");
    } else {
        debug!(path = %path.display(), encoding = %decoded.encoding, "source text loaded");
    }
    Ok(decoded)
}

pub fn decode(bytes: &[u8]) -> SourceText {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return SourceText {
            text: text.into_owned(),
            encoding: encoding.name().to_lowercase(),
            confidence: 0.99,
            had_errors,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);

    let (text, _, had_errors) = encoding.decode(bytes);
    SourceText {
        confidence: estimate_confidence(text.len(), had_errors),
        text: text.into_owned(),
        encoding: encoding.name().to_lowercase(),
        had_errors,
    }
}

fn estimate_confidence(len: usize, had_errors: bool) -> f32 {
    if had_errors {
        return 0.35;
    }

    if len < 64 {
        0.55
    } else if len < 512 {
        0.70
    } else if len < 4096 {
        0.82
    } else {
        0.90
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("Yo te extrañaré.".as_bytes());

        let out = decode(&bytes);
        assert_eq!(out.text, "Yo te extrañaré.");
        assert_eq!(out.encoding, "utf-8");
        assert!(!out.had_errors);
    }

    #[test]
    fn legacy_single_byte_text_is_not_utf8() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode("¿Qué pasó? Mañana será otro día.");
        let out = decode(&bytes);
        assert_ne!(out.encoding, "utf-8");
        assert!(!out.had_errors);
    }

    #[test]
    fn empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "  \n").unwrap();

        assert!(matches!(load_source_text(&path), Err(SourceTextError::Empty(_))));
    }

    #[test]
    fn loads_plain_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.txt");
        std::fs::write(&path, "Hola mundo. ¿Cómo estás?").unwrap();

        let out = load_source_text(&path).unwrap();
        assert_eq!(out.text, "Hola mundo. ¿Cómo estás?");
        assert_eq!(out.encoding, "utf-8");
    }
}
