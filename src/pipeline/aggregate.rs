//! Customer key aggregation
//!
//! Builds the segment table in three passes:
//! 1. mean price per `(country, source, sex, age)` group, sorted by price
//! 2. age bucketed and groups re-aggregated per customer key
//! 3. five-way quantile cut over the per-key mean prices

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::age::AgeBuckets;
use super::error::SegmentError;
use super::loader::require_columns;
use super::record::{CustomerKey, Sex, Source, AGE, COUNTRY, GROUPING_COLUMNS, PRICE, SEX, SOURCE};
use super::segment::{assign_segments, SegmentRow, SegmentTable};

/// Per-group record count column produced by the first pass
const RECORDS: &str = "RECORDS";

/// How group means are combined when several ages share one customer key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Weighting {
    /// Unweighted mean of the per-age group means
    #[default]
    MeanOfMeans,
    /// Mean over the underlying records (group means weighted by record count)
    RecordWeighted,
}

impl std::fmt::Display for Weighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Weighting::MeanOfMeans => write!(f, "mean-of-means"),
            Weighting::RecordWeighted => write!(f, "record-weighted"),
        }
    }
}

impl std::str::FromStr for Weighting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean-of-means" => Ok(Weighting::MeanOfMeans),
            "record-weighted" => Ok(Weighting::RecordWeighted),
            _ => Err(format!(
                "Unknown weighting: '{}'. Use 'mean-of-means' or 'record-weighted'.",
                s
            )),
        }
    }
}

/// Mean price of one `(country, source, sex, age)` group
#[derive(Debug, Clone, PartialEq)]
pub struct AgeGroup {
    pub country: String,
    pub source: Source,
    pub sex: Sex,
    pub age: u32,
    pub mean_price: f64,
    /// Records with a price in this group
    pub records: u64,
}

/// Mean price of one customer key before segmentation
#[derive(Debug, Clone, PartialEq)]
pub struct KeyAggregate {
    pub key: CustomerKey,
    pub mean_price: f64,
    /// Number of age groups merged into this key
    pub groups: usize,
    /// Number of priced records behind this key
    pub records: u64,
}

/// Check that grouping columns are complete and interpretable.
///
/// SOURCE and SEX must parse as their enums and AGE as a non-negative
/// integer; the first offending row is reported.
pub fn validate_grouping_keys(df: &DataFrame) -> Result<()> {
    require_columns(df)?;

    for name in GROUPING_COLUMNS {
        let count = df.column(name)?.null_count();
        if count > 0 {
            return Err(SegmentError::NullGroupingKey {
                column: name.to_string(),
                count,
            }
            .into());
        }
    }

    for name in [SOURCE, SEX] {
        let values = df.column(name)?.cast(&DataType::String)?;
        for (row, value) in values.str()?.into_iter().enumerate() {
            let value = value.unwrap_or_default();
            let parsed = if name == SOURCE {
                value.parse::<Source>().map(|_| ())
            } else {
                value.parse::<Sex>().map(|_| ())
            };
            if let Err(e) = parsed {
                return Err(SegmentError::InvalidValue {
                    column: name.to_string(),
                    row,
                    value: value.to_string(),
                    reason: e.to_string(),
                }
                .into());
            }
        }
    }

    // Casting a float to Int64 truncates, so fractional ages are caught first
    let age_column = df.column(AGE)?;
    if age_column.dtype().is_float() {
        let floats = age_column.cast(&DataType::Float64)?;
        for (row, age) in floats.f64()?.into_iter().enumerate() {
            if let Some(age) = age.filter(|a| a.fract() != 0.0) {
                return Err(SegmentError::InvalidValue {
                    column: AGE.to_string(),
                    row,
                    value: age.to_string(),
                    reason: "age must be an integer".to_string(),
                }
                .into());
            }
        }
    }

    let raw_ages = df.column(AGE)?.cast(&DataType::String)?;
    let ages = df.column(AGE)?.cast(&DataType::Int64)?;
    for (row, (age, raw)) in ages.i64()?.into_iter().zip(raw_ages.str()?).enumerate() {
        let reason = match age {
            None => "age must be an integer",
            Some(a) if a < 0 => "age must not be negative",
            Some(_) => continue,
        };
        return Err(SegmentError::InvalidValue {
            column: AGE.to_string(),
            row,
            value: raw.unwrap_or_default().to_string(),
            reason: reason.to_string(),
        }
        .into());
    }

    Ok(())
}

/// Mean price per `(country, source, sex, age)`, highest first.
///
/// Groups keep their first-seen order on equal mean price. Text keys are
/// grouped case-insensitively. Null and NaN prices are ignored; a group
/// without any priced record is dropped.
pub fn group_mean_prices(df: &DataFrame) -> Result<Vec<AgeGroup>> {
    validate_grouping_keys(df)?;

    let grouped = df
        .clone()
        .lazy()
        .with_columns([
            col(COUNTRY).cast(DataType::String).str().to_lowercase(),
            col(SOURCE).cast(DataType::String).str().to_lowercase(),
            col(SEX).cast(DataType::String).str().to_lowercase(),
            col(AGE).cast(DataType::Int64),
            col(PRICE)
                .cast(DataType::Float64)
                .fill_nan(lit(NULL).cast(DataType::Float64)),
        ])
        .group_by_stable([col(COUNTRY), col(SOURCE), col(SEX), col(AGE)])
        .agg([
            col(PRICE).mean().alias(PRICE),
            col(PRICE).count().cast(DataType::Int64).alias(RECORDS),
        ])
        .filter(col(PRICE).is_not_null())
        .sort(
            [PRICE],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;

    let countries = grouped.column(COUNTRY)?.str()?;
    let sources = grouped.column(SOURCE)?.str()?;
    let sexes = grouped.column(SEX)?.str()?;
    let ages = grouped.column(AGE)?.i64()?;
    let prices = grouped.column(PRICE)?.f64()?;
    let records = grouped.column(RECORDS)?.i64()?;

    let mut groups = Vec::with_capacity(grouped.height());
    for i in 0..grouped.height() {
        let (Some(country), Some(source), Some(sex), Some(age), Some(mean_price)) = (
            countries.get(i),
            sources.get(i),
            sexes.get(i),
            ages.get(i),
            prices.get(i),
        ) else {
            continue;
        };

        groups.push(AgeGroup {
            country: country.trim().to_lowercase(),
            source: source.parse()?,
            sex: sex.parse()?,
            age: u32::try_from(age)?,
            mean_price,
            records: records.get(i).unwrap_or(0).max(0) as u64,
        });
    }

    Ok(groups)
}

/// Bucket each group's age and combine groups that share a customer key.
///
/// Output is ordered by key.
pub fn aggregate_customer_keys(
    groups: &[AgeGroup],
    buckets: &AgeBuckets,
    weighting: Weighting,
) -> Result<Vec<KeyAggregate>, SegmentError> {
    #[derive(Default)]
    struct Acc {
        sum_of_means: f64,
        weighted_sum: f64,
        groups: usize,
        records: u64,
    }

    let mut by_key: BTreeMap<CustomerKey, Acc> = BTreeMap::new();
    for group in groups {
        let bucket = buckets
            .bucket_for(group.age)
            .ok_or_else(|| SegmentError::InvalidValue {
                column: AGE.to_string(),
                row: 0,
                value: group.age.to_string(),
                reason: format!("age exceeds the bucket ceiling {}", buckets.ceiling()),
            })?;
        let key = CustomerKey::new(&group.country, group.source, group.sex, &bucket);
        let acc = by_key.entry(key).or_default();
        acc.sum_of_means += group.mean_price;
        acc.weighted_sum += group.mean_price * group.records as f64;
        acc.groups += 1;
        acc.records += group.records;
    }

    let aggregates = by_key
        .into_iter()
        .map(|(key, acc)| {
            let mean_price = match weighting {
                Weighting::MeanOfMeans => acc.sum_of_means / acc.groups as f64,
                Weighting::RecordWeighted if acc.records > 0 => {
                    acc.weighted_sum / acc.records as f64
                }
                Weighting::RecordWeighted => acc.sum_of_means / acc.groups as f64,
            };
            KeyAggregate {
                key,
                mean_price,
                groups: acc.groups,
                records: acc.records,
            }
        })
        .collect();

    Ok(aggregates)
}

/// Run every aggregation pass and return the segment table.
///
/// The top age bucket ends at the oldest priced group's age.
pub fn build_segment_table(df: &DataFrame, weighting: Weighting) -> Result<SegmentTable> {
    let groups = group_mean_prices(df)?;
    let max_age = groups
        .iter()
        .map(|g| g.age)
        .max()
        .ok_or(SegmentError::EmptyTable)?;
    let buckets = AgeBuckets::new(max_age)?;

    let aggregates = aggregate_customer_keys(&groups, &buckets, weighting)?;
    let prices: Vec<f64> = aggregates.iter().map(|a| a.mean_price).collect();
    let segments = assign_segments(&prices)?;

    let rows = aggregates
        .into_iter()
        .zip(segments)
        .map(|(agg, segment)| {
            (
                agg.key,
                SegmentRow {
                    mean_price: agg.mean_price,
                    segment,
                },
            )
        })
        .collect();

    Ok(SegmentTable::new(buckets, rows))
}
