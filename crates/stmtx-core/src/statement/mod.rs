//! Statement field recognition.

mod recognizer;
pub mod rules;

pub use recognizer::{FieldRecognizer, FieldRule, Normalizer};
