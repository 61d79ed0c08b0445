//! Audit log records.
//!
//! Every publish appends one CSV record to `logs/kallysto.log`:
//!
//! ```text
//! uid,published_at,title,notebook,KIND,path[,path]
//! ```
//!
//! Paths are relative to the logs directory. Figures list the image file
//! and then the data file; values and tables list only the data file.

use std::fmt;
use std::fs::File;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::error::{KallystoError, Result};
use crate::export::{ExportKind, Uid};

/// One line of the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    #[serde(serialize_with = "display")]
    pub uid: Uid,
    pub published_at: String,
    pub title: String,
    pub notebook: String,
    pub kind: ExportKind,
    pub paths: Vec<String>,
}

fn display<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl AuditRecord {
    /// Render as a single CSV record without a trailing newline.
    pub fn to_line(&self) -> Result<String> {
        let mut fields = vec![
            self.uid.to_string(),
            self.published_at.clone(),
            self.title.clone(),
            self.notebook.clone(),
            self.kind.tag().to_string(),
        ];
        fields.extend(self.paths.iter().cloned());

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(&fields)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| KallystoError::Config(format!("Failed to render audit record: {}", e)))?;

        let line = String::from_utf8_lossy(&bytes);
        Ok(line.strip_suffix('\n').unwrap_or(&line).to_string())
    }

    /// Parse a single audit log line.
    pub fn parse(line: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes());

        let record = reader
            .records()
            .next()
            .ok_or_else(|| KallystoError::EmptyData("Empty audit log line".to_string()))??;
        Self::from_record(&record)
    }

    fn from_record(record: &csv::StringRecord) -> Result<Self> {
        if record.len() < 6 {
            return Err(KallystoError::Config(format!(
                "Audit record has {} fields, expected at least 6",
                record.len()
            )));
        }

        Ok(Self {
            uid: record[0].parse()?,
            published_at: record[1].to_string(),
            title: record[2].to_string(),
            notebook: record[3].to_string(),
            kind: record[4].parse()?,
            paths: record.iter().skip(5).map(|s| s.to_string()).collect(),
        })
    }
}

/// Read every record of an audit log, oldest first.
pub fn read_log(path: impl AsRef<Path>) -> Result<Vec<AuditRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| KallystoError::io(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    reader
        .records()
        .map(|record| AuditRecord::from_record(&record?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AuditRecord {
        AuditRecord {
            uid: Uid::from_micros(1_508_412_345_123_456),
            published_at: "2017-10-19 11:25:45".to_string(),
            title: "paper".to_string(),
            notebook: "nb".to_string(),
            kind: ExportKind::Figure,
            paths: vec!["../figs/nb/trend.pdf".to_string(), "../data/nb/trend.csv".to_string()],
        }
    }

    #[test]
    fn test_line_format() {
        assert_eq!(
            record().to_line().unwrap(),
            "1508412345.123456,2017-10-19 11:25:45,paper,nb,FIGURE,../figs/nb/trend.pdf,../data/nb/trend.csv"
        );
    }

    #[test]
    fn test_parse_line() {
        let parsed = AuditRecord::parse(&record().to_line().unwrap()).unwrap();
        assert_eq!(parsed, record());
    }

    #[test]
    fn test_parse_rejects_short_lines() {
        assert!(AuditRecord::parse("1.000000,2017-10-19 11:25:45,paper,nb,VALUE").is_err());
        assert!(AuditRecord::parse("").is_err());
    }

    #[test]
    fn test_json_uses_display_uid() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["uid"], "1508412345.123456");
        assert_eq!(json["kind"], "FIGURE");
    }
}
