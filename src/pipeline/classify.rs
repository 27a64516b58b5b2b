//! New-customer classification against a segment table

use super::error::SegmentError;
use super::record::{normalize_country, CustomerKey, Sex, Source};
use super::segment::{SegmentRow, SegmentTable};

/// Attributes of a customer to classify
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerQuery {
    pub country: String,
    pub source: Source,
    pub sex: Sex,
    pub age: i64,
}

impl CustomerQuery {
    pub fn new(country: &str, source: Source, sex: Sex, age: i64) -> Self {
        Self {
            country: country.trim().to_lowercase(),
            source,
            sex,
            age,
        }
    }
}

/// Raw text of one interactive entry, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub country: String,
    pub source: String,
    pub sex: String,
    pub age: String,
}

/// Result of one lookup; `row` is `None` when the key is not in the table
#[derive(Debug, Clone, PartialEq)]
pub struct LookupOutcome {
    pub query: CustomerQuery,
    pub key: CustomerKey,
    pub row: Option<SegmentRow>,
}

/// Maps customer attributes to rows of a segment table.
///
/// Ages are validated against the table's own bucket ceiling.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    table: &'a SegmentTable,
}

impl<'a> Classifier<'a> {
    pub fn new(table: &'a SegmentTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a SegmentTable {
        self.table
    }

    /// Validate raw entry text into a query
    pub fn parse_entry(&self, entry: &RawEntry) -> Result<CustomerQuery, SegmentError> {
        let country = normalize_country(&entry.country)?;
        let source: Source = entry.source.parse()?;
        let sex: Sex = entry.sex.parse()?;
        let age = self.parse_age(&entry.age)?;

        Ok(CustomerQuery::new(&country, source, sex, i64::from(age)))
    }

    fn parse_age(&self, input: &str) -> Result<u32, SegmentError> {
        let ceiling = self.table.age_buckets().ceiling();
        input
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|age| *age <= ceiling)
            .ok_or_else(|| SegmentError::AgeOutOfRange {
                input: input.to_string(),
                ceiling,
            })
    }

    /// Customer key for a query, or an input validation error when the age
    /// is outside `[0, ceiling]`
    pub fn customer_key(&self, query: &CustomerQuery) -> Result<CustomerKey, SegmentError> {
        let buckets = self.table.age_buckets();
        let bucket = u32::try_from(query.age)
            .ok()
            .and_then(|age| buckets.bucket_for(age))
            .ok_or_else(|| SegmentError::AgeOutOfRange {
                input: query.age.to_string(),
                ceiling: buckets.ceiling(),
            })?;

        Ok(CustomerKey::new(&query.country, query.source, query.sex, &bucket))
    }

    /// Look up a query; an unknown key yields `row: None`
    pub fn classify(&self, query: &CustomerQuery) -> Result<LookupOutcome, SegmentError> {
        let key = self.customer_key(query)?;
        let row = self.table.get(&key).copied();
        Ok(LookupOutcome {
            query: query.clone(),
            key,
            row,
        })
    }
}
