//! Core library for credit-card statement extraction.
//!
//! This crate provides:
//! - Page text acquisition: PDF text layers first, OCR for pages without one
//! - Rule-based recognition of card, period, due date and balance fields
//! - Record output as a JSON array or newline-delimited JSON

pub mod acquire;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod statement;
pub mod store;

pub use acquire::{AcquiredText, PageText, PageTextAcquirer, TextSource};
pub use error::{Result, StmtError};
pub use models::{ExtractedRecord, Field, StmtxConfig};
pub use ocr::{create_backend, OcrBackend, TesseractBackend};
pub use pdf::{MemoryDocument, PageSource, PdfDocument, PdfType};
pub use pipeline::{Extraction, StatementExtractor};
pub use statement::{FieldRecognizer, FieldRule};
pub use store::{RecordSink, SinkFormat};
