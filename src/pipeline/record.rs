//! Record attributes and the composite customer key

use serde::{Deserialize, Serialize};

use super::age::AgeBucket;
use super::error::SegmentError;

/// Spend amount column
pub const PRICE: &str = "PRICE";
/// Device source column
pub const SOURCE: &str = "SOURCE";
/// Customer sex column
pub const SEX: &str = "SEX";
/// Country code column
pub const COUNTRY: &str = "COUNTRY";
/// Customer age column
pub const AGE: &str = "AGE";

/// Columns every purchase table must provide (matched case-insensitively)
pub const REQUIRED_COLUMNS: [&str; 5] = [PRICE, SOURCE, SEX, COUNTRY, AGE];

/// Columns that form a purchase group before age is bucketed
pub const GROUPING_COLUMNS: [&str; 4] = [COUNTRY, SOURCE, SEX, AGE];

/// Device the purchase was made from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Android,
    Ios,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Android, Source::Ios];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Android => "android",
            Source::Ios => "ios",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "android" => Ok(Source::Android),
            "ios" => Ok(Source::Ios),
            "" => Err(SegmentError::EmptyField { field: "source" }),
            _ => Err(SegmentError::UnknownChoice {
                field: "source",
                input: s.to_string(),
                expected: "android | ios".to_string(),
            }),
        }
    }
}

/// Customer sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Sex {
    type Err = SegmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            "" => Err(SegmentError::EmptyField { field: "sex" }),
            _ => Err(SegmentError::UnknownChoice {
                field: "sex",
                input: s.to_string(),
                expected: "male | female".to_string(),
            }),
        }
    }
}

/// Normalise a country code to its lowercase form
pub fn normalize_country(code: &str) -> Result<String, SegmentError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(SegmentError::EmptyField { field: "country" });
    }
    Ok(code.to_lowercase())
}

/// Composite customer identifier: `COUNTRY_SOURCE_SEX_AGEBUCKET`, uppercase.
///
/// Many records share one key once age has been coarsened to a bucket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerKey(String);

impl CustomerKey {
    pub fn new(country: &str, source: Source, sex: Sex, bucket: &AgeBucket) -> Self {
        let key = format!("{}_{}_{}_{}", country.trim(), source, sex, bucket.label());
        Self(key.to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Country code portion of the key, lowercase
    pub fn country(&self) -> String {
        self.0
            .split('_')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

impl std::fmt::Display for CustomerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
