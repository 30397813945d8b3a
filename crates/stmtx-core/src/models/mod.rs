//! Data models for the extraction pipeline.

pub mod config;
pub mod record;

pub use config::{
    ExtractionConfig, OcrBackendKind, OcrConfig, PageFailurePolicy, PdfConfig, StmtxConfig,
};
pub use record::{ExtractedRecord, Field};
