//! Barcode Encoder
//!
//! Renders sample identifiers as Code128 PNG images under a fixed artifact
//! directory. Rendering the same identifier twice yields the same path and
//! overwrites the file with identical content.

use std::fs;
use std::path::PathBuf;

use barcoders::generators::image::Image;
use barcoders::sym::code128::Code128;
use tracing::debug;

use bionexa_utils::{encode_path_component, require_non_blank, BionexaError, BionexaResult};

/// Code128 character set B start marker understood by `barcoders`.
const CHARSET_B: char = '\u{0181}';

pub const DEFAULT_BAR_HEIGHT: u32 = 80;

pub trait BarcodeEncoder: Send + Sync {
    /// Where the artifact for `identifier` lives, whether or not it exists yet.
    fn artifact_path(&self, identifier: &str) -> PathBuf;

    fn encode(&self, identifier: &str) -> BionexaResult<PathBuf>;
}

#[derive(Debug, Clone)]
pub struct Code128Encoder {
    artifact_dir: PathBuf,
    bar_height: u32,
}

impl Code128Encoder {
    pub fn new(artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            bar_height: DEFAULT_BAR_HEIGHT,
        }
    }

    fn render(&self, identifier: &str) -> BionexaResult<Vec<u8>> {
        let barcode = Code128::new(format!("{}{}", CHARSET_B, identifier)).map_err(|e| {
            BionexaError::validation(
                "sample_id",
                format!("'{}' cannot be encoded as Code128: {:?}", identifier, e),
            )
        })?;

        Image::png(self.bar_height)
            .generate(&barcode.encode()[..])
            .map_err(|e| BionexaError::artifact(format!("PNG rendering failed: {:?}", e)))
    }
}

impl BarcodeEncoder for Code128Encoder {
    fn artifact_path(&self, identifier: &str) -> PathBuf {
        self.artifact_dir
            .join(format!("{}.png", encode_path_component(identifier)))
    }

    fn encode(&self, identifier: &str) -> BionexaResult<PathBuf> {
        require_non_blank("sample_id", identifier)?;
        if let Some(bad) = identifier.chars().find(|c| !(' '..='~').contains(c)) {
            return Err(BionexaError::validation(
                "sample_id",
                format!("character {:?} is outside the Code128 printable set", bad),
            ));
        }

        let png = self.render(identifier)?;
        fs::create_dir_all(&self.artifact_dir)?;
        let path = self.artifact_path(identifier);
        fs::write(&path, png)?;

        debug!(identifier, path = %path.display(), "Barcode rendered");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_encode_writes_png_named_after_identifier() {
        let dir = TempDir::new().unwrap();
        let encoder = Code128Encoder::new(dir.path());

        let path = encoder.encode("ACE-1-B-1").unwrap();
        assert_eq!(path, dir.path().join("ACE-1-B-1.png"));

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_encode_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let encoder = Code128Encoder::new(dir.path());

        let first = encoder.encode("ACE-1-B-1").unwrap();
        let first_bytes = fs::read(&first).unwrap();
        let second = encoder.encode("ACE-1-B-1").unwrap();

        assert_eq!(first, second);
        assert_eq!(first_bytes, fs::read(&second).unwrap());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_path_separators_are_encoded() {
        let dir = TempDir::new().unwrap();
        let encoder = Code128Encoder::new(dir.path());

        let path = encoder.encode("LOT/7-B 2").unwrap();
        assert_eq!(path, dir.path().join("LOT%2F7-B%202.png"));
    }

    #[test]
    fn test_similar_identifiers_get_distinct_artifacts() {
        let dir = TempDir::new().unwrap();
        let encoder = Code128Encoder::new(dir.path());

        let paths: Vec<PathBuf> = ["LOT 7-B-1", "LOT/7-B-1", "LOT_7-B-1"]
            .iter()
            .map(|id| encoder.encode(id).unwrap())
            .collect();
        assert_ne!(paths[0], paths[1]);
        assert_ne!(paths[0], paths[2]);
        assert_ne!(paths[1], paths[2]);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_rejects_unencodable_identifiers() {
        let dir = TempDir::new().unwrap();
        let encoder = Code128Encoder::new(dir.path());

        assert_eq!(encoder.encode("  ").unwrap_err().error_code(), "VALIDATION_ERROR");
        assert_eq!(encoder.encode("ÄCE-1-B-1").unwrap_err().error_code(), "VALIDATION_ERROR");
        assert!(!encoder.artifact_path("ÄCE-1-B-1").exists());
    }

    #[test]
    fn test_creates_missing_artifact_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("static").join("barcodes");
        let encoder = Code128Encoder::new(&nested);

        let path = encoder.encode("ETH-9-B-3").unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }
}
