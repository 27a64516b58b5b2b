//! Segment table export and reload

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::pipeline::{SegmentTable, Weighting};

/// Metadata about the segmentation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Timestamp of the run (RFC 3339)
    pub timestamp: String,
    /// Persona version
    pub persona_version: String,
    /// Input file path
    pub input_file: String,
    /// How per-age means were combined per key
    pub weighting: Weighting,
    /// Categorical threshold used while profiling
    pub categorical_threshold: usize,
}

impl ExportMetadata {
    pub fn new(input_file: &str, weighting: Weighting, categorical_threshold: usize) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            persona_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input_file.to_string(),
            weighting,
            categorical_threshold,
        }
    }
}

/// Exported segment table with run metadata.
///
/// The table's age buckets are written next to the segments, so a reloaded
/// table validates and buckets ages exactly as the run that built it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentExport {
    pub metadata: ExportMetadata,
    #[serde(flatten)]
    pub table: SegmentTable,
}

/// Write the segment table as pretty-printed JSON
pub fn export_segment_table(
    table: &SegmentTable,
    metadata: ExportMetadata,
    output_path: &Path,
) -> Result<()> {
    let export = SegmentExport {
        metadata,
        table: table.clone(),
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize segment table to JSON")?;

    std::fs::write(output_path, json).with_context(|| {
        format!(
            "Failed to write segment table to: {}",
            output_path.display()
        )
    })?;

    Ok(())
}

/// Read a segment table written by [`export_segment_table`]
pub fn load_segment_table(path: &Path) -> Result<SegmentExport> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read segment table: {}", path.display()))?;
    let export: SegmentExport = serde_json::from_str(&json)
        .with_context(|| format!("Invalid segment table JSON: {}", path.display()))?;
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{AgeBuckets, CustomerKey, Segment, SegmentRow, Sex, Source};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_table() -> SegmentTable {
        let buckets = AgeBuckets::new(66).unwrap();
        let bucket = buckets.bucket_for(30).unwrap();
        let mut rows = BTreeMap::new();
        rows.insert(
            CustomerKey::new("usa", Source::Android, Sex::Female, &bucket),
            SegmentRow {
                mean_price: 33.5,
                segment: Segment::HighMid,
            },
        );
        SegmentTable::new(buckets, rows)
    }

    #[test]
    fn test_export_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("segments.json");
        let metadata = ExportMetadata::new("persona.csv", Weighting::MeanOfMeans, 5);
        export_segment_table(&sample_table(), metadata, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["age_buckets"]["ceiling"], 66);
        assert_eq!(value["metadata"]["weighting"], "mean-of-means");
        assert_eq!(
            value["segments"]["USA_ANDROID_FEMALE_23_30"]["segment"],
            "high-mid"
        );
        assert_eq!(
            value["segments"]["USA_ANDROID_FEMALE_23_30"]["mean_price"],
            33.5
        );
    }

    #[test]
    fn test_reload_restores_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("segments.json");
        let table = sample_table();
        let metadata = ExportMetadata::new("persona.csv", Weighting::RecordWeighted, 10);
        export_segment_table(&table, metadata.clone(), &path).unwrap();

        let loaded = load_segment_table(&path).unwrap();
        assert_eq!(loaded.table, table);
        assert_eq!(loaded.metadata, metadata);
    }

    #[test]
    fn test_reload_missing_file() {
        let err = load_segment_table(Path::new("/nonexistent/segments.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read segment table"));
    }
}
