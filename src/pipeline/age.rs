//! Age bucketing
//!
//! Ages are coarsened with the fixed breakpoints `[0, 16, 22, 30, 40]` plus a
//! ceiling taken from the data (the oldest customer). The first bucket is
//! closed on both ends; every later bucket is `(lower edge, upper edge]`.
//! The ceiling travels with the segment table, so aggregation and lookup
//! always bucket ages identically.

use serde::{Deserialize, Serialize};

use super::error::SegmentError;

/// Fixed lower breakpoints; the ceiling completes the edge list
pub const AGE_BREAKPOINTS: [u32; 5] = [0, 16, 22, 30, 40];

/// Number of age buckets
pub const AGE_BUCKET_COUNT: usize = AGE_BREAKPOINTS.len();

/// One age range, labelled `"{lower}_{upper}"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgeBucket {
    lower: u32,
    upper: u32,
}

impl AgeBucket {
    pub fn lower(&self) -> u32 {
        self.lower
    }

    pub fn upper(&self) -> u32 {
        self.upper
    }

    pub fn label(&self) -> String {
        format!("{}_{}", self.lower, self.upper)
    }

    pub fn contains(&self, age: u32) -> bool {
        (self.lower..=self.upper).contains(&age)
    }
}

impl std::fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.lower, self.upper)
    }
}

/// The five age buckets for one dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AgeBucketsRepr", into = "AgeBucketsRepr")]
pub struct AgeBuckets {
    ceiling: u32,
}

#[derive(Serialize, Deserialize)]
struct AgeBucketsRepr {
    ceiling: u32,
}

impl TryFrom<AgeBucketsRepr> for AgeBuckets {
    type Error = SegmentError;

    fn try_from(repr: AgeBucketsRepr) -> Result<Self, Self::Error> {
        AgeBuckets::new(repr.ceiling)
    }
}

impl From<AgeBuckets> for AgeBucketsRepr {
    fn from(buckets: AgeBuckets) -> Self {
        Self {
            ceiling: buckets.ceiling,
        }
    }
}

impl AgeBuckets {
    /// Build buckets whose top range ends at `ceiling`.
    ///
    /// The ceiling must exceed the last fixed breakpoint, otherwise the top
    /// bucket would be empty or inverted.
    pub fn new(ceiling: u32) -> Result<Self, SegmentError> {
        let floor = AGE_BREAKPOINTS[AGE_BUCKET_COUNT - 1];
        if ceiling <= floor {
            return Err(SegmentError::AgeCeilingTooLow {
                max_age: i64::from(ceiling),
                floor,
            });
        }
        Ok(Self { ceiling })
    }

    /// Build buckets from the maximum age observed in the data
    pub fn from_max_age(max_age: i64) -> Result<Self, SegmentError> {
        let floor = AGE_BREAKPOINTS[AGE_BUCKET_COUNT - 1];
        let ceiling = u32::try_from(max_age).map_err(|_| SegmentError::AgeCeilingTooLow {
            max_age,
            floor,
        })?;
        Self::new(ceiling)
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// All buckets in ascending order
    pub fn buckets(&self) -> [AgeBucket; AGE_BUCKET_COUNT] {
        let mut edges = [0u32; AGE_BUCKET_COUNT + 1];
        edges[..AGE_BUCKET_COUNT].copy_from_slice(&AGE_BREAKPOINTS);
        edges[AGE_BUCKET_COUNT] = self.ceiling;

        std::array::from_fn(|i| AgeBucket {
            lower: if i == 0 { edges[0] } else { edges[i] + 1 },
            upper: edges[i + 1],
        })
    }

    /// Whether `age` lies inside `[0, ceiling]`
    pub fn contains(&self, age: u32) -> bool {
        age <= self.ceiling
    }

    /// Bucket for `age`, or `None` above the ceiling
    pub fn bucket_for(&self, age: u32) -> Option<AgeBucket> {
        if !self.contains(age) {
            return None;
        }
        self.buckets().into_iter().find(|b| age <= b.upper)
    }

    /// Bucket labels in ascending order
    pub fn labels(&self) -> Vec<String> {
        self.buckets().iter().map(AgeBucket::label).collect()
    }
}
