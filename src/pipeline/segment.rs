//! Quantile-based spend segments and the segment table
//!
//! Mean prices are split into five equal-frequency bins. Bin edges are the
//! 0, 20, 40, 60, 80 and 100 percent quantiles computed with linear
//! interpolation between closest ranks. Bins are right-closed and the lowest
//! edge belongs to the first bin, so every price lands in exactly one bin.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::age::AgeBuckets;
use super::error::SegmentError;
use super::record::{CustomerKey, PRICE};

/// Number of spend segments
pub const SEGMENT_COUNT: usize = 5;

/// Spend tier, ordered from lowest to highest mean price
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Segment {
    Low,
    LowMid,
    Mid,
    HighMid,
    High,
}

impl Segment {
    pub const ALL: [Segment; SEGMENT_COUNT] = [
        Segment::Low,
        Segment::LowMid,
        Segment::Mid,
        Segment::HighMid,
        Segment::High,
    ];

    /// Zero-based rank, `Low` = 0
    pub fn rank(&self) -> usize {
        *self as usize
    }

    pub fn from_rank(rank: usize) -> Option<Self> {
        Self::ALL.get(rank).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::Low => "low",
            Segment::LowMid => "low-mid",
            Segment::Mid => "mid",
            Segment::HighMid => "high-mid",
            Segment::High => "high",
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Quantile at `q` of already-sorted values, linear interpolation
fn linear_quantile(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (h.ceil() as usize).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Equal-frequency bin edges (`bins + 1` values) for `values`.
///
/// Returns an empty vector for empty input.
pub fn quantile_edges(values: &[f64], bins: usize) -> Vec<f64> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    (0..=bins)
        .map(|i| linear_quantile(&sorted, i as f64 / bins as f64))
        .collect()
}

/// Assign a segment to each value by a five-way quantile cut.
///
/// Output is index-aligned with `values`. Every value must be finite.
pub fn assign_segments(values: &[f64]) -> Result<Vec<Segment>, SegmentError> {
    if let Some((row, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(SegmentError::InvalidValue {
            column: PRICE.to_string(),
            row,
            value: value.to_string(),
            reason: "mean price must be a finite number".to_string(),
        });
    }
    if values.len() < SEGMENT_COUNT {
        return Err(SegmentError::InsufficientKeys {
            found: values.len(),
            required: SEGMENT_COUNT,
        });
    }

    let edges = quantile_edges(values, SEGMENT_COUNT);
    if edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(SegmentError::DuplicateQuantileEdges {
            edges,
            bins: SEGMENT_COUNT,
        });
    }

    let segments = values
        .iter()
        .map(|&value| {
            let rank = edges[1..]
                .iter()
                .position(|&upper| value <= upper)
                .unwrap_or(SEGMENT_COUNT - 1);
            Segment::ALL[rank]
        })
        .collect();

    Ok(segments)
}

/// Stored result for one customer key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentRow {
    pub mean_price: f64,
    pub segment: Segment,
}

/// Customer keys mapped to their mean price and segment, plus the age
/// buckets the keys were built with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTable {
    age_buckets: AgeBuckets,
    segments: BTreeMap<CustomerKey, SegmentRow>,
}

impl SegmentTable {
    pub fn new(age_buckets: AgeBuckets, segments: BTreeMap<CustomerKey, SegmentRow>) -> Self {
        Self {
            age_buckets,
            segments,
        }
    }

    pub fn age_buckets(&self) -> &AgeBuckets {
        &self.age_buckets
    }

    pub fn get(&self, key: &CustomerKey) -> Option<&SegmentRow> {
        self.segments.get(key)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Rows in key order
    pub fn iter(&self) -> impl Iterator<Item = (&CustomerKey, &SegmentRow)> {
        self.segments.iter()
    }

    /// Rows sorted by mean price, highest first; key order breaks ties
    pub fn rows_by_price(&self) -> Vec<(&CustomerKey, &SegmentRow)> {
        let mut rows: Vec<_> = self.segments.iter().collect();
        rows.sort_by(|a, b| b.1.mean_price.total_cmp(&a.1.mean_price));
        rows
    }

    /// Distinct country codes present in the keys
    pub fn countries(&self) -> Vec<String> {
        self.segments
            .keys()
            .map(CustomerKey::country)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Price statistics for one segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub segment: Segment,
    pub keys: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
}

/// Count, mean, min, max and sum of mean price per segment.
///
/// Segments without keys are omitted.
pub fn summarize_segments(table: &SegmentTable) -> Vec<SegmentSummary> {
    Segment::ALL
        .iter()
        .filter_map(|&segment| {
            let prices: Vec<f64> = table
                .iter()
                .filter(|(_, row)| row.segment == segment)
                .map(|(_, row)| row.mean_price)
                .collect();
            if prices.is_empty() {
                return None;
            }
            let sum: f64 = prices.iter().sum();
            Some(SegmentSummary {
                segment,
                keys: prices.len(),
                mean: sum / prices.len() as f64,
                min: prices.iter().copied().fold(f64::INFINITY, f64::min),
                max: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                sum,
            })
        })
        .collect()
}
