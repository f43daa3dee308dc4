//! Tabular export of processed datasets and prediction history.

use std::io::Write;

use thiserror::Error;

use super::Dataset;
use crate::ml::labels::{LabelCodec, LabelCodecError};
use crate::triage::history::HistoryEntry;

/// Errors returned when writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("label codec error: {0}")]
    Labels(#[from] LabelCodecError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write the processed dataset with encoded labels and embeddings appended.
///
/// Embeddings are JSON-encoded into a single column so the file stays plain
/// tabular text; unprocessed records leave the column empty.
pub fn write_processed_csv<W: Write>(
    dataset: &Dataset,
    codec: &LabelCodec,
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["text", "label", "encoded_label", "embedding"])?;
    for record in dataset.records() {
        let code = codec.encode_one(&record.label)?.to_string();
        let embedding = match &record.embedding {
            Some(vector) => serde_json::to_string(vector)?,
            None => String::new(),
        };
        csv_writer.write_record([
            record.text.as_str(),
            record.label.as_str(),
            code.as_str(),
            embedding.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the prediction history log as CSV.
pub fn write_history_csv<W: Write>(
    entries: &[HistoryEntry],
    writer: W,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["input_text", "prediction", "confidence", "timestamp"])?;
    for entry in entries {
        let confidence = format!("{:.4}", entry.confidence);
        let timestamp = entry.timestamp_display();
        csv_writer.write_record([
            entry.input_text.as_str(),
            entry.prediction.as_str(),
            confidence.as_str(),
            timestamp.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::LabeledRecord;

    fn processed_dataset() -> (Dataset, LabelCodec) {
        let dataset = Dataset::new(vec![
            LabeledRecord {
                text: "fever and chills".to_string(),
                label: "flu".to_string(),
                embedding: Some(vec![0.5, -0.5]),
            },
            LabeledRecord {
                text: "one-sided headache".to_string(),
                label: "migraine".to_string(),
                embedding: None,
            },
        ]);
        let mut codec = LabelCodec::default();
        codec.fit(&dataset.labels()).unwrap();
        (dataset, codec)
    }

    #[test]
    fn processed_export_appends_codes_and_embeddings() {
        let (dataset, codec) = processed_dataset();
        let mut out = Vec::new();
        write_processed_csv(&dataset, &codec, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "text,label,encoded_label,embedding");
        let first = lines.next().unwrap();
        assert!(first.contains("flu"));
        assert!(first.contains("[0.5,-0.5]"));
        let second = lines.next().unwrap();
        assert!(second.contains("migraine,1,"));
    }

    #[test]
    fn processed_export_rejects_labels_outside_the_codec() {
        let (dataset, _) = processed_dataset();
        let mut codec = LabelCodec::default();
        codec.fit(&["vertigo".to_string()]).unwrap();
        let mut out = Vec::new();
        let err = write_processed_csv(&dataset, &codec, &mut out).unwrap_err();
        assert!(matches!(err, ExportError::Labels(_)));
    }

    #[test]
    fn history_export_writes_one_row_per_entry() {
        let mut entry = HistoryEntry::new("fever and chills", "flu", 0.91);
        entry.timestamp = time::OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let mut out = Vec::new();
        write_history_csv(&[entry], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "input_text,prediction,confidence,timestamp"
        );
        assert_eq!(
            lines.next().unwrap(),
            "fever and chills,flu,0.9100,2023-11-14 22:13:20"
        );
    }
}
