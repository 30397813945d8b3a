//! Appending extracted records to an output file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::record::ExtractedRecord;

/// On-disk layout of a record file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkFormat {
    /// A single pretty-printed JSON array, rewritten on every append.
    JsonArray,
    /// One compact JSON object per line.
    Ndjson,
}

impl SinkFormat {
    /// `.json` files hold an array; anything else is written line by line.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SinkFormat::JsonArray,
            _ => SinkFormat::Ndjson,
        }
    }
}

/// Accumulates records in a file across runs.
#[derive(Debug, Clone)]
pub struct RecordSink {
    path: PathBuf,
    format: SinkFormat,
}

impl RecordSink {
    /// Create a sink, picking the format from the file extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = SinkFormat::for_path(&path);
        Self { path, format }
    }

    /// The file records are written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file layout in use.
    pub fn format(&self) -> SinkFormat {
        self.format
    }

    /// Append one record.
    pub fn append(&self, record: &ExtractedRecord) -> Result<()> {
        self.append_all(std::slice::from_ref(record))
    }

    /// Append several records in order.
    pub fn append_all(&self, records: &[ExtractedRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        match self.format {
            SinkFormat::JsonArray => self.append_array(records)?,
            SinkFormat::Ndjson => self.append_lines(records)?,
        }

        debug!("Appended {} record(s) to {}", records.len(), self.path.display());
        Ok(())
    }

    fn append_array(&self, records: &[ExtractedRecord]) -> Result<()> {
        let mut entries = self.read_existing();
        for record in records {
            entries.push(serde_json::to_value(record)?);
        }

        let content = serde_json::to_string_pretty(&Value::Array(entries))?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn append_lines(&self, records: &[ExtractedRecord]) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        for record in records {
            let line = serde_json::to_string(record)?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    /// Entries already in the array file. A missing file is an empty array;
    /// a file that cannot be read as a JSON array is replaced.
    fn read_existing(&self) -> Vec<Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("{} could not be read ({}), starting a new array", self.path.display(), e);
                return Vec::new();
            }
        };

        if content.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                warn!("{} does not hold a JSON array, starting a new one", self.path.display());
                Vec::new()
            }
            Err(e) => {
                warn!("{} is not valid JSON ({}), starting a new array", self.path.display(), e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(file: &str) -> ExtractedRecord {
        ExtractedRecord {
            total_balance: Some("10.00".to_string()),
            file: file.to_string(),
            ..Default::default()
        }
    }

    fn read_array(path: &Path) -> Vec<ExtractedRecord> {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(SinkFormat::for_path(Path::new("out.json")), SinkFormat::JsonArray);
        assert_eq!(SinkFormat::for_path(Path::new("OUT.JSON")), SinkFormat::JsonArray);
        assert_eq!(SinkFormat::for_path(Path::new("out.ndjson")), SinkFormat::Ndjson);
        assert_eq!(SinkFormat::for_path(Path::new("out")), SinkFormat::Ndjson);
        assert_eq!(RecordSink::new("records.ndjson").format(), SinkFormat::Ndjson);
    }

    #[test]
    fn test_array_accumulates_across_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("records.json");
        let sink = RecordSink::new(&path);

        sink.append(&record("a.pdf")).unwrap();
        sink.append_all(&[record("b.pdf"), record("c.pdf")]).unwrap();

        let files: Vec<String> = read_array(&path).into_iter().map(|r| r.file).collect();
        assert_eq!(files, vec!["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn test_malformed_array_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        fs::write(&path, "{ not json").unwrap();

        RecordSink::new(&path).append(&record("a.pdf")).unwrap();
        assert_eq!(read_array(&path), vec![record("a.pdf")]);

        fs::write(&path, r#"{"card_last4": "1234"}"#).unwrap();
        RecordSink::new(&path).append(&record("b.pdf")).unwrap();
        assert_eq!(read_array(&path), vec![record("b.pdf")]);
    }

    #[test]
    fn test_unreadable_array_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        fs::write(&path, [b'[', 0xff, 0xfe, b']']).unwrap();

        RecordSink::new(&path).append(&record("a.pdf")).unwrap();
        assert_eq!(read_array(&path), vec![record("a.pdf")]);
    }

    #[test]
    fn test_array_file_keeps_record_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let sink = RecordSink::new(&path);

        sink.append(&record("a.pdf")).unwrap();
        sink.append(&record("b.pdf")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let keys: Vec<&str> = content
            .lines()
            .filter_map(|line| line.trim().strip_prefix('"'))
            .filter_map(|line| line.split('"').next())
            .collect();
        let expected = [
            "card_last4",
            "card_variant",
            "billing_cycle",
            "payment_due_date",
            "total_balance",
            "_file",
            "_sample_text_snippet",
        ];
        assert_eq!(keys, [expected, expected].concat());
    }

    #[test]
    fn test_ndjson_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.ndjson");
        let sink = RecordSink::new(&path);

        sink.append(&record("a.pdf")).unwrap();
        sink.append(&record("b.pdf")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<ExtractedRecord> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines, vec![record("a.pdf"), record("b.pdf")]);
    }
}
