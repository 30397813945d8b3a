//! Error types for the stmtx-core library.

use thiserror::Error;

/// Main error type for the stmtx library.
///
/// Field recognition never produces errors: a missing field is `None` and an
/// unparseable value falls back to its raw text. Everything here is either an
/// I/O-level problem or a page that could not be acquired.
#[derive(Error, Debug)]
pub enum StmtError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// A single page could not be rendered or recognized.
    #[error("page {page} could not be acquired: {source}")]
    Page {
        page: u32,
        #[source]
        source: PageError,
    },

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to render a page to an image.
    #[error("failed to render page: {0}")]
    Render(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR backend (binary or models) is not available.
    #[error("backend not available: {0}")]
    BackendNotAvailable(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// I/O error while talking to the backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a page could not be acquired.
#[derive(Error, Debug)]
pub enum PageError {
    /// Rasterizing the page failed.
    #[error("render failed: {0}")]
    Render(#[from] PdfError),

    /// Running OCR on the rendered page failed.
    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),
}

/// Result type for the stmtx library.
pub type Result<T> = std::result::Result<T, StmtError>;
