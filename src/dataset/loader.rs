//! CSV ingestion of `text,label` corpora.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use super::{Dataset, LabeledRecord};

/// Errors returned when loading a dataset file.
#[derive(Debug, Error)]
pub enum DatasetLoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("no data rows found")]
    Empty,
}

/// Load a dataset from a CSV file with `text` and `label` columns.
///
/// Columns are located by header name, so a leading index column is
/// tolerated. Rows missing either field are skipped.
pub fn load_csv(path: &Path) -> Result<Dataset, DatasetLoadError> {
    read_csv(File::open(path)?)
}

/// Load a dataset from any CSV reader. See [`load_csv`].
pub fn read_csv<R: Read>(input: R) -> Result<Dataset, DatasetLoadError> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?.clone();
    let text_idx =
        column_index(&headers, "text").ok_or(DatasetLoadError::MissingColumn("text"))?;
    let label_idx =
        column_index(&headers, "label").ok_or(DatasetLoadError::MissingColumn("label"))?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.records() {
        let row = row?;
        let text = row.get(text_idx).unwrap_or("").trim();
        let label = row.get(label_idx).unwrap_or("").trim();
        if text.is_empty() || label.is_empty() {
            skipped += 1;
            continue;
        }
        records.push(LabeledRecord {
            text: text.to_string(),
            label: label.to_string(),
            embedding: None,
        });
    }
    if skipped > 0 {
        tracing::debug!(skipped, "skipped rows with missing text or label");
    }
    if records.is_empty() {
        return Err(DatasetLoadError::Empty);
    }
    Ok(Dataset::new(records))
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_rows_with_a_leading_index_column() {
        let csv = ",label,text\n0,flu,\"fever, cough and chills\"\n1,migraine,throbbing one-sided headache\n";
        let dataset = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].label, "flu");
        assert_eq!(dataset.records()[0].text, "fever, cough and chills");
    }

    #[test]
    fn rejects_missing_label_column() {
        let csv = "text\nsome symptoms\n";
        assert!(matches!(
            read_csv(csv.as_bytes()),
            Err(DatasetLoadError::MissingColumn("label"))
        ));
    }

    #[test]
    fn rejects_file_with_no_usable_rows() {
        let csv = "text,label\n,\n  ,flu\n";
        assert!(matches!(
            read_csv(csv.as_bytes()),
            Err(DatasetLoadError::Empty)
        ));
    }

    #[test]
    fn header_match_is_case_insensitive() {
        let csv = "Text,Label\nchest pain on exertion,angina\n";
        let dataset = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(dataset.records()[0].label, "angina");
    }
}
