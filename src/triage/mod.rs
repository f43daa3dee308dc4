//! Confidence tiers for risk visualization.

use serde::{Deserialize, Serialize};

pub mod history;

/// Ordered confidence band, highest trust first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// High confidence.
    Green,
    /// Intermediate confidence; review advised.
    Amber,
    /// Low confidence; treat the prediction as unreliable.
    Red,
}

impl Tier {
    /// Lowercase tier name for display and export.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Amber => "amber",
            Self::Red => "red",
        }
    }
}

/// Inclusive integer percentage range `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRange {
    /// Lower bound in percent, inclusive.
    pub low: u8,
    /// Upper bound in percent, inclusive.
    pub high: u8,
}

impl TierRange {
    /// Whether a confidence percentage falls inside the range.
    pub fn contains(&self, percent: f32) -> bool {
        percent >= self.low as f32 && percent <= self.high as f32
    }
}

/// Configured tier boundaries over `[0, 100]`.
///
/// Ranges are expected to be contiguous and exhaustive but are applied
/// as configured: banding checks green, then amber, then red, and falls back
/// to red when nothing matches. Overlaps and gaps resolve by that first-match
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    /// Green confidence range.
    pub green: TierRange,
    /// Amber confidence range.
    pub amber: TierRange,
    /// Red confidence range.
    pub red: TierRange,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            green: TierRange { low: 75, high: 100 },
            amber: TierRange { low: 55, high: 74 },
            red: TierRange { low: 0, high: 54 },
        }
    }
}

impl TierThresholds {
    /// Band a confidence percentage into a tier.
    ///
    /// Red doubles as the fallback for values outside every configured range.
    pub fn band(&self, confidence_percent: f32) -> Tier {
        if self.green.contains(confidence_percent) {
            Tier::Green
        } else if self.amber.contains(confidence_percent) {
            Tier::Amber
        } else {
            Tier::Red
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_band_by_first_match() {
        let thresholds = TierThresholds::default();
        assert_eq!(thresholds.band(80.0), Tier::Green);
        assert_eq!(thresholds.band(60.0), Tier::Amber);
        assert_eq!(thresholds.band(10.0), Tier::Red);
        assert_eq!(thresholds.band(55.0), Tier::Amber);
        assert_eq!(thresholds.band(74.0), Tier::Amber);
        assert_eq!(thresholds.band(75.0), Tier::Green);
        assert_eq!(thresholds.band(100.0), Tier::Green);
        assert_eq!(thresholds.band(0.0), Tier::Red);
    }

    #[test]
    fn gapped_thresholds_fall_back_to_red() {
        let thresholds = TierThresholds {
            green: TierRange { low: 90, high: 100 },
            amber: TierRange { low: 80, high: 89 },
            red: TierRange { low: 0, high: 40 },
        };
        // 60 is inside no configured range.
        assert_eq!(thresholds.band(60.0), Tier::Red);
    }

    #[test]
    fn overlapping_thresholds_resolve_green_first() {
        let thresholds = TierThresholds {
            green: TierRange { low: 50, high: 100 },
            amber: TierRange { low: 40, high: 80 },
            red: TierRange { low: 0, high: 60 },
        };
        assert_eq!(thresholds.band(55.0), Tier::Green);
        assert_eq!(thresholds.band(45.0), Tier::Amber);
        assert_eq!(thresholds.band(10.0), Tier::Red);
    }

    #[test]
    fn banding_is_total_over_the_percent_scale() {
        let thresholds = TierThresholds::default();
        for percent in 0..=100 {
            // Every value maps to some tier without panicking.
            let _ = thresholds.band(percent as f32);
        }
    }
}
