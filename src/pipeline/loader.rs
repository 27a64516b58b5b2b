//! Dataset loader for purchase CSV files

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use polars::prelude::*;
use std::path::Path;

use super::error::SegmentError;
use super::record::REQUIRED_COLUMNS;
use crate::utils::{create_spinner, finish_with_success};

fn ensure_csv(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if extension != "csv" {
        anyhow::bail!(
            "Unsupported file format: '{}'. Supported format: csv",
            extension
        );
    }
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(())
}

fn csv_reader(path: &Path, infer_schema_length: usize) -> LazyCsvReader {
    // 0 means full table scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(schema_length)
}

/// Load a purchase table from a CSV file.
///
/// Required column headers are matched case-insensitively and renamed to
/// their uppercase form (`PRICE`, `SOURCE`, `SEX`, `COUNTRY`, `AGE`).
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    ensure_csv(path)?;

    let mut df = csv_reader(path, infer_schema_length)
        .finish()
        .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
        .collect()
        .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;

    normalize_column_names(&mut df)?;
    require_columns(&df)?;

    Ok(df)
}

/// Load a dataset behind a spinner, returning the frame with its row count,
/// column count and estimated size in MB
pub fn load_dataset_with_progress(
    path: &Path,
    infer_schema_length: usize,
) -> Result<(DataFrame, usize, usize, f64)> {
    let spinner: ProgressBar = create_spinner(&format!("Reading {}...", path.display()));
    let df = match load_dataset(path, infer_schema_length) {
        Ok(df) => df,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };
    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);
    finish_with_success(&spinner, "Dataset loaded");

    Ok((df, rows, cols, memory_mb))
}

/// Read only the column names of a CSV file
pub fn get_column_names(path: &Path) -> Result<Vec<String>> {
    ensure_csv(path)?;

    let schema = csv_reader(path, 100)
        .finish()
        .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
        .collect_schema()
        .with_context(|| format!("Failed to read schema: {}", path.display()))?;

    Ok(schema.iter_names().map(|s| s.to_string()).collect())
}

/// Rename required columns to their canonical uppercase names
pub fn normalize_column_names(df: &mut DataFrame) -> Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for name in names {
        let upper = name.trim().to_uppercase();
        if upper != name && REQUIRED_COLUMNS.contains(&upper.as_str()) {
            df.rename(&name, upper.as_str().into())
                .with_context(|| format!("Failed to rename column '{}' to '{}'", name, upper))?;
        }
    }

    Ok(())
}

/// Fail with a data error if any required column is absent
pub fn require_columns(df: &DataFrame) -> Result<(), SegmentError> {
    let available: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    match REQUIRED_COLUMNS
        .iter()
        .find(|c| !available.iter().any(|a| a == *c))
    {
        Some(missing) => Err(SegmentError::MissingColumn {
            column: missing.to_string(),
            available,
        }),
        None => Ok(()),
    }
}
