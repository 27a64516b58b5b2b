//! Descriptive profiling of a loaded table
//!
//! Columns are split into categorical and numerical. A column is categorical
//! when its dtype is not numeric, or when it is numeric but has fewer distinct
//! non-null values than the categorical threshold. Categorical columns get
//! value counts; numerical columns get count/mean/std/min/max and an optional
//! histogram. Profiling never mutates the table.

use std::collections::HashMap;

use anyhow::Result;
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;

/// Default distinct-value threshold below which a numeric column is categorical
pub const DEFAULT_CATEGORICAL_THRESHOLD: usize = 10;

/// Rows shown in the head and tail previews
pub const PREVIEW_ROWS: usize = 5;

/// Equal-width bins per histogram
pub const HISTOGRAM_BINS: usize = 10;

/// Profiling options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileConfig {
    pub categorical_threshold: usize,
    pub histograms: bool,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            categorical_threshold: DEFAULT_CATEGORICAL_THRESHOLD,
            histograms: false,
        }
    }
}

/// Column classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Categorical,
    Numerical,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Categorical => write!(f, "categorical"),
            ColumnKind::Numerical => write!(f, "numerical"),
        }
    }
}

/// One value and how often it occurs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
    /// Percentage of all rows (nulls included in the denominator)
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Descriptive statistics for a numerical column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (ddof = 1)
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Vec<HistogramBin>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnDetail {
    Categorical { values: Vec<CategoryCount> },
    Numerical(NumericSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
    pub distinct: usize,
    pub kind: ColumnKind,
    pub detail: ColumnDetail,
}

/// Profile of a whole table
#[derive(Debug, Clone)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: usize,
    pub head: DataFrame,
    pub tail: DataFrame,
    pub column_profiles: Vec<ColumnProfile>,
}

impl DatasetProfile {
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.names_of(ColumnKind::Categorical)
    }

    pub fn numerical_columns(&self) -> Vec<&str> {
        self.names_of(ColumnKind::Numerical)
    }

    fn names_of(&self, kind: ColumnKind) -> Vec<&str> {
        self.column_profiles
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.as_str())
            .collect()
    }
}

fn distinct_non_null(col: &Column) -> Result<usize> {
    Ok(col.as_materialized_series().drop_nulls().n_unique()?)
}

/// Classify a single column against the categorical threshold
pub fn classify_column(col: &Column, categorical_threshold: usize) -> Result<ColumnKind> {
    if !col.dtype().is_primitive_numeric() {
        return Ok(ColumnKind::Categorical);
    }
    if distinct_non_null(col)? < categorical_threshold {
        Ok(ColumnKind::Categorical)
    } else {
        Ok(ColumnKind::Numerical)
    }
}

/// Split column names into `(categorical, numerical)`, in table order
pub fn classify_columns(
    df: &DataFrame,
    categorical_threshold: usize,
) -> Result<(Vec<String>, Vec<String>)> {
    let mut categorical = Vec::new();
    let mut numerical = Vec::new();

    for col in df.get_columns() {
        match classify_column(col, categorical_threshold)? {
            ColumnKind::Categorical => categorical.push(col.name().to_string()),
            ColumnKind::Numerical => numerical.push(col.name().to_string()),
        }
    }

    Ok((categorical, numerical))
}

/// Value counts sorted by count descending, then value ascending
pub fn value_counts(col: &Column, total_rows: usize) -> Result<Vec<CategoryCount>> {
    let as_string = col.cast(&DataType::String)?;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in as_string.str()?.into_iter().flatten() {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }

    let mut result: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(value, count)| CategoryCount {
            value,
            count,
            ratio: if total_rows > 0 {
                100.0 * count as f64 / total_rows as f64
            } else {
                0.0
            },
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

    Ok(result)
}

/// Equal-width histogram between the minimum and maximum
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        // The maximum belongs to the last bin
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

/// Count, mean, sample std, min and max of a numeric column
pub fn numeric_summary(col: &Column, with_histogram: bool) -> Result<NumericSummary> {
    let floats = col.cast(&DataType::Float64)?;
    let ca = floats.f64()?;

    let histogram = if with_histogram {
        let values: Vec<f64> = ca.into_iter().flatten().collect();
        Some(histogram(&values, HISTOGRAM_BINS))
    } else {
        None
    };

    Ok(NumericSummary {
        count: ca.len() - ca.null_count(),
        mean: ca.mean(),
        std: ca.std(1),
        min: ca.min(),
        max: ca.max(),
        histogram,
    })
}

fn profile_column(col: &Column, rows: usize, config: &ProfileConfig) -> Result<ColumnProfile> {
    let kind = classify_column(col, config.categorical_threshold)?;
    let detail = match kind {
        ColumnKind::Categorical => ColumnDetail::Categorical {
            values: value_counts(col, rows)?,
        },
        ColumnKind::Numerical => ColumnDetail::Numerical(numeric_summary(col, config.histograms)?),
    };

    Ok(ColumnProfile {
        name: col.name().to_string(),
        dtype: col.dtype().to_string(),
        null_count: col.null_count(),
        distinct: distinct_non_null(col)?,
        kind,
        detail,
    })
}

/// Profile every column of `df`.
///
/// Columns are profiled in parallel; the result keeps table order.
pub fn profile_dataset(df: &DataFrame, config: &ProfileConfig) -> Result<DatasetProfile> {
    let (rows, columns) = df.shape();

    let column_profiles = df
        .get_columns()
        .par_iter()
        .map(|col| profile_column(col, rows, config))
        .collect::<Result<Vec<_>>>()?;

    Ok(DatasetProfile {
        rows,
        columns,
        head: df.head(Some(PREVIEW_ROWS)),
        tail: df.tail(Some(PREVIEW_ROWS)),
        column_profiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_all_values() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = histogram(&values, 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert!(bins.iter().all(|b| b.count == 10));
        assert_eq!(bins[9].upper, 99.0);
    }

    #[test]
    fn test_histogram_single_value() {
        let bins = histogram(&[3.0, 3.0, 3.0], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(histogram(&[], 10).is_empty());
    }

    #[test]
    fn test_value_counts_sorted_with_ratio() {
        let df = df! {
            "SEX" => [Some("male"), Some("female"), Some("female"), None],
        }
        .unwrap();
        let counts = value_counts(df.column("SEX").unwrap(), df.height()).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].value, "female");
        assert_eq!(counts[0].count, 2);
        assert!((counts[0].ratio - 50.0).abs() < 1e-9);
        assert!((counts[1].ratio - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_with_few_values_is_categorical() {
        let df = df! {
            "PRICE" => [9i64, 19, 29, 39, 49, 59, 9, 19],
        }
        .unwrap();
        let col = df.column("PRICE").unwrap();
        assert_eq!(classify_column(col, 10).unwrap(), ColumnKind::Categorical);
        assert_eq!(classify_column(col, 5).unwrap(), ColumnKind::Numerical);
    }

    #[test]
    fn test_string_column_is_categorical() {
        let df = df! {
            "COUNTRY" => ["bra", "usa", "tur", "fra", "can", "deu"],
        }
        .unwrap();
        let col = df.column("COUNTRY").unwrap();
        assert_eq!(classify_column(col, 1).unwrap(), ColumnKind::Categorical);
    }
}
