//! OCR backends used for pages without a text layer.

#[cfg(feature = "onnx")]
mod pure_engine;
mod tesseract;

#[cfg(feature = "onnx")]
pub use pure_engine::PureOcrEngine;
pub use tesseract::TesseractBackend;

use image::DynamicImage;
use tracing::info;

use crate::error::OcrError;
use crate::models::config::{OcrBackendKind, OcrConfig};

/// Something that turns a page image into text.
pub trait OcrBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Recognize the text in an image.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        (**self).recognize(image)
    }
}

/// Create the OCR backend selected by the configuration.
pub fn create_backend(config: &OcrConfig) -> Result<Box<dyn OcrBackend>, OcrError> {
    match config.backend {
        OcrBackendKind::Tesseract => {
            info!(
                "Using tesseract OCR at {} ({})",
                config.tesseract_path.display(),
                config.language
            );
            Ok(Box::new(TesseractBackend::from_config(config)))
        }
        #[cfg(feature = "onnx")]
        OcrBackendKind::Onnx => Ok(Box::new(PureOcrEngine::from_dir(
            &config.model_dir,
            config.clone(),
        )?)),
        #[cfg(not(feature = "onnx"))]
        OcrBackendKind::Onnx => Err(OcrError::BackendNotAvailable(
            "ONNX OCR requires building with the `onnx` feature".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tesseract_backend() {
        let backend = create_backend(&OcrConfig::default()).unwrap();
        assert_eq!(backend.name(), "tesseract");
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn test_onnx_without_feature() {
        let config = OcrConfig {
            backend: OcrBackendKind::Onnx,
            ..Default::default()
        };
        assert!(matches!(
            create_backend(&config),
            Err(OcrError::BackendNotAvailable(_))
        ));
    }
}
