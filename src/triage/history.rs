//! Append-only prediction history and per-condition reliability statistics.

use std::collections::BTreeMap;

use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

use super::TierThresholds;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// One logged diagnostic prediction.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Symptom text as entered.
    pub input_text: String,
    /// Predicted condition label.
    pub prediction: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
    /// When the prediction was made.
    pub timestamp: OffsetDateTime,
}

impl HistoryEntry {
    /// Create an entry stamped with the current time.
    pub fn new(input_text: &str, prediction: &str, confidence: f32) -> Self {
        Self {
            input_text: input_text.to_string(),
            prediction: prediction.to_string(),
            confidence,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Timestamp formatted for display and export.
    pub fn timestamp_display(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).unwrap_or_default()
    }
}

/// Per-condition tier shares, in percent of that condition's entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierBreakdown {
    /// Share of entries at or above the green lower bound.
    pub green_pct: f32,
    /// Share of entries between the amber and green lower bounds.
    pub amber_pct: f32,
    /// Share of entries below the amber lower bound.
    pub red_pct: f32,
}

/// Append-only log of past predictions.
///
/// Entries are never mutated or removed individually; the whole log may be
/// cleared. The log lives independently of any trained model.
#[derive(Debug, Clone, Default)]
pub struct HistoryAggregator {
    entries: Vec<HistoryEntry>,
}

impl HistoryAggregator {
    /// Append one entry. Always succeeds.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// All entries in append order.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of logged entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop the entire log.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Per-condition tier distribution over the log.
    ///
    /// Partitions each condition's entries by confidence percentage against
    /// the green and amber lower bounds: green at or above `green.low`, amber
    /// from `amber.low` up to (excluding) `green.low`, red below. Returns an
    /// empty map for an empty log and never mutates the log.
    pub fn summarize(&self, thresholds: &TierThresholds) -> BTreeMap<String, TierBreakdown> {
        let mut counts: BTreeMap<&str, (usize, usize, usize)> = BTreeMap::new();
        let green_low = thresholds.green.low as f32;
        let amber_low = thresholds.amber.low as f32;
        for entry in &self.entries {
            let percent = entry.confidence * 100.0;
            let slot = counts.entry(entry.prediction.as_str()).or_default();
            if percent >= green_low {
                slot.0 += 1;
            } else if percent >= amber_low {
                slot.1 += 1;
            } else {
                slot.2 += 1;
            }
        }

        counts
            .into_iter()
            .map(|(condition, (green, amber, red))| {
                let total = (green + amber + red) as f32;
                let breakdown = TierBreakdown {
                    green_pct: green as f32 / total * 100.0,
                    amber_pct: amber as f32 / total * 100.0,
                    red_pct: red as f32 / total * 100.0,
                };
                (condition.to_string(), breakdown)
            })
            .collect()
    }
}
