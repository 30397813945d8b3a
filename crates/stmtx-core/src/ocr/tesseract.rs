//! Tesseract OCR backend.
//!
//! Runs the tesseract command-line tool on a temporary PNG of the page.
//! The executable path is injected through [`OcrConfig`] rather than being
//! fixed at build time.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, trace};

use super::OcrBackend;
use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Tesseract OCR backend.
#[derive(Debug, Clone)]
pub struct TesseractBackend {
    binary: PathBuf,
    language: String,
}

impl TesseractBackend {
    /// Create a backend running `binary` with the given language.
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    /// Create a backend from OCR configuration.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.tesseract_path.clone(), config.language.clone())
    }

    /// Run tesseract on an image file and return its stdout.
    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(OcrError::Recognition(format!(
                    "tesseract failed: {}",
                    stderr.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(format!(
                    "{} not found (install tesseract-ocr or set ocr.tesseract_path)",
                    self.binary.display()
                )))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::from_config(&OcrConfig::default())
    }
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();

        let temp_dir = tempfile::tempdir()?;
        let image_path = temp_dir.path().join("page.png");
        image
            .save_with_format(&image_path, image::ImageFormat::Png)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;
        trace!("Wrote OCR input to {}", image_path.display());

        let text = self.run_tesseract(&image_path)?;

        debug!(
            "tesseract recognized {} chars from {}x{} image in {}ms",
            text.len(),
            image.width(),
            image.height(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_uses_injected_path() {
        let config = OcrConfig {
            tesseract_path: PathBuf::from("/opt/ocr/tesseract"),
            language: "eng".to_string(),
            ..Default::default()
        };
        let backend = TesseractBackend::from_config(&config);
        assert_eq!(backend.binary, PathBuf::from("/opt/ocr/tesseract"));
        assert_eq!(backend.language, "eng");
    }

    #[test]
    fn test_missing_binary_reports_unavailable() {
        let backend = TesseractBackend::new("/nonexistent/tesseract", "eng");
        let image = DynamicImage::new_luma8(8, 8);

        assert!(matches!(
            backend.recognize(&image),
            Err(OcrError::BackendNotAvailable(_))
        ));
    }
}
