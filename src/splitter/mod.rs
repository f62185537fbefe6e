//! Region boundary computation for pre-splitting tables.
//!
//! A closed integer key interval `[start, end]` is cut into `N` contiguous
//! regions by `N - 1` boundary keys. The region size is `(end - start + 1) / N`
//! truncated, so the last region absorbs the remainder. Boundaries are
//! handed to [`Admin::create_table`](crate::store::Admin::create_table).

pub mod algorithm;

pub use algorithm::{RangeSplitter, SplitAlgorithm};

use crate::error::{Error, Result};
use num_bigint::BigUint;
use std::fmt;
use tracing::warn;

/// Closed interval of non-negative integer keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyInterval {
    start: BigUint,
    end: BigUint,
}

impl KeyInterval {
    pub fn new(start: BigUint, end: BigUint) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidArgument(format!(
                "interval start {} is greater than end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both endpoints from decimal text.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_decimal(start)?, parse_decimal(end)?)
    }

    pub fn start(&self) -> &BigUint {
        &self.start
    }

    pub fn end(&self) -> &BigUint {
        &self.end
    }

    /// Number of keys in the interval, both ends inclusive.
    pub fn len(&self) -> BigUint {
        &self.end - &self.start + BigUint::from(1u32)
    }

    /// True when the endpoints render to a different number of decimal digits,
    /// i.e. canonical decimal keys in this interval do not sort numerically.
    pub fn spans_digit_boundary(&self) -> bool {
        self.start.to_string().len() != self.end.to_string().len()
    }

    /// Split into `num_partitions` regions, encoding each boundary with `encoding`.
    pub fn boundaries(
        &self,
        num_partitions: i64,
        encoding: BoundaryEncoding,
    ) -> Result<Vec<BoundaryKey>> {
        if encoding == BoundaryEncoding::Canonical
            && num_partitions > 1
            && self.spans_digit_boundary()
        {
            warn!(
                start = %self.start,
                end = %self.end,
                "Canonical decimal boundaries over an interval spanning a digit-count change do not sort numerically"
            );
        }
        split_points(self, num_partitions)?
            .iter()
            .map(|value| encoding.encode(value))
            .collect()
    }
}

impl fmt::Display for KeyInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Encoded region boundary. Ordered byte-lexicographically, the way the store
/// compares row keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundaryKey(String);

impl BoundaryKey {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BoundaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How integer boundaries are rendered as row keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryEncoding {
    /// Canonical decimal text, no padding.
    #[default]
    Canonical,
    /// Decimal text left-padded with zeros to a fixed width.
    FixedWidth(usize),
}

impl BoundaryEncoding {
    pub fn encode(&self, value: &BigUint) -> Result<BoundaryKey> {
        let digits = value.to_string();
        match *self {
            BoundaryEncoding::Canonical => Ok(BoundaryKey(digits)),
            BoundaryEncoding::FixedWidth(width) => {
                if digits.len() > width {
                    return Err(Error::InvalidArgument(format!(
                        "key {} does not fit in {} digits",
                        digits, width
                    )));
                }
                Ok(BoundaryKey(format!("{:0>width$}", digits, width = width)))
            }
        }
    }
}

/// Half-open region `[start_key, end_key)`. `None` is unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub start_key: Option<BoundaryKey>,
    pub end_key: Option<BoundaryKey>,
}

impl Region {
    pub fn contains(&self, row: &[u8]) -> bool {
        let above_start = self
            .start_key
            .as_ref()
            .map_or(true, |start| row >= start.as_bytes());
        let below_end = self
            .end_key
            .as_ref()
            .map_or(true, |end| row < end.as_bytes());
        above_start && below_end
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start_key.as_ref().map_or("~", BoundaryKey::as_str);
        let end = self.end_key.as_ref().map_or("~", BoundaryKey::as_str);
        write!(f, "[{}, {})", start, end)
    }
}

/// Compute the `num_partitions - 1` canonical decimal boundaries of `[start, end]`.
///
/// Sequences for `end - start + 1 < num_partitions` are returned as computed,
/// duplicates included; see [`is_strictly_increasing`].
pub fn compute_boundaries(
    start: &BigUint,
    end: &BigUint,
    num_partitions: i64,
) -> Result<Vec<BoundaryKey>> {
    let interval = KeyInterval::new(start.clone(), end.clone())?;
    interval.boundaries(num_partitions, BoundaryEncoding::Canonical)
}

/// Regions delimited by `boundaries`, first and last unbounded.
pub fn regions_from_boundaries(boundaries: &[BoundaryKey]) -> Vec<Region> {
    let mut regions = Vec::with_capacity(boundaries.len() + 1);
    let mut previous: Option<BoundaryKey> = None;
    for boundary in boundaries {
        regions.push(Region {
            start_key: previous.take(),
            end_key: Some(boundary.clone()),
        });
        previous = Some(boundary.clone());
    }
    regions.push(Region {
        start_key: previous,
        end_key: None,
    });
    regions
}

/// False for degenerate sequences, where the requested partition count
/// exceeded the granularity of the interval.
pub fn is_strictly_increasing(boundaries: &[BoundaryKey]) -> bool {
    boundaries.windows(2).all(|pair| pair[0] < pair[1])
}

pub(crate) fn parse_decimal(input: &str) -> Result<BigUint> {
    input
        .trim()
        .parse::<BigUint>()
        .map_err(|e| Error::InvalidArgument(format!("'{}' is not a decimal key: {}", input, e)))
}

fn split_points(interval: &KeyInterval, num_partitions: i64) -> Result<Vec<BigUint>> {
    if num_partitions <= 0 {
        return Err(Error::InvalidArgument(format!(
            "partition count must be positive, got {}",
            num_partitions
        )));
    }

    let size_of_each_split = interval.len() / BigUint::from(num_partitions as u64);
    let points = (1..num_partitions as u64)
        .map(|i| &interval.start + &size_of_each_split * BigUint::from(i))
        .collect();
    Ok(points)
}
