use super::{parse_decimal, regions_from_boundaries, BoundaryEncoding, BoundaryKey, KeyInterval, Region};
use crate::error::{Error, Result};
use num_bigint::BigUint;

/// Pluggable split strategy, the seam a store uses when it pre-splits a table
/// or needs a split point for a single region.
pub trait SplitAlgorithm: Send + Sync {
    /// Boundaries dividing the configured key space into `num_regions` regions.
    fn split(&self, num_regions: i64) -> Result<Vec<BoundaryKey>>;

    /// Row that splits the region `[lower, upper)` in two.
    fn split_point(&self, lower: &[u8], upper: &[u8]) -> Result<BoundaryKey>;

    fn first_row(&self) -> BoundaryKey;

    fn last_row(&self) -> BoundaryKey;

    fn set_first_row(&mut self, input: &str) -> Result<()>;

    fn set_last_row(&mut self, input: &str) -> Result<()>;

    fn str_to_row(&self, input: &str) -> Result<BoundaryKey>;

    fn row_to_str(&self, row: &[u8]) -> Result<String>;

    /// Separator used when a list of rows is passed as one string.
    fn separator(&self) -> &str;
}

/// Uniform decimal split over a closed integer interval.
#[derive(Debug, Clone)]
pub struct RangeSplitter {
    interval: KeyInterval,
    encoding: BoundaryEncoding,
}

impl Default for RangeSplitter {
    /// The ten-thousand key space `[0, 9999]`, canonical encoding.
    fn default() -> Self {
        Self {
            interval: KeyInterval {
                start: BigUint::from(0u32),
                end: BigUint::from(9999u32),
            },
            encoding: BoundaryEncoding::Canonical,
        }
    }
}

impl RangeSplitter {
    pub fn new(interval: KeyInterval) -> Self {
        Self {
            interval,
            encoding: BoundaryEncoding::Canonical,
        }
    }

    pub fn with_encoding(mut self, encoding: BoundaryEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn interval(&self) -> &KeyInterval {
        &self.interval
    }

    pub fn encoding(&self) -> BoundaryEncoding {
        self.encoding
    }

    pub fn regions(&self, num_regions: i64) -> Result<Vec<Region>> {
        Ok(regions_from_boundaries(&self.split(num_regions)?))
    }

    fn row_value(row: &[u8]) -> Result<BigUint> {
        let text = std::str::from_utf8(row)
            .map_err(|_| Error::InvalidArgument("row key is not UTF-8".into()))?;
        parse_decimal(text)
    }
}

impl SplitAlgorithm for RangeSplitter {
    fn split(&self, num_regions: i64) -> Result<Vec<BoundaryKey>> {
        self.interval.boundaries(num_regions, self.encoding)
    }

    fn split_point(&self, lower: &[u8], upper: &[u8]) -> Result<BoundaryKey> {
        let lower = if lower.is_empty() {
            self.interval.start.clone()
        } else {
            Self::row_value(lower)?
        };
        let upper = if upper.is_empty() {
            self.interval.end.clone()
        } else {
            Self::row_value(upper)?
        };
        if lower > upper {
            return Err(Error::InvalidArgument(format!(
                "split point requested for inverted region [{}, {})",
                lower, upper
            )));
        }
        let midpoint = (lower + upper) / BigUint::from(2u32);
        self.encoding.encode(&midpoint)
    }

    fn first_row(&self) -> BoundaryKey {
        // canonical text when the endpoint is wider than a fixed width
        self.encoding
            .encode(&self.interval.start)
            .unwrap_or_else(|_| BoundaryKey::new(self.interval.start.to_string()))
    }

    fn last_row(&self) -> BoundaryKey {
        self.encoding
            .encode(&self.interval.end)
            .unwrap_or_else(|_| BoundaryKey::new(self.interval.end.to_string()))
    }

    fn set_first_row(&mut self, input: &str) -> Result<()> {
        self.interval = KeyInterval::new(parse_decimal(input)?, self.interval.end.clone())?;
        Ok(())
    }

    fn set_last_row(&mut self, input: &str) -> Result<()> {
        self.interval = KeyInterval::new(self.interval.start.clone(), parse_decimal(input)?)?;
        Ok(())
    }

    fn str_to_row(&self, input: &str) -> Result<BoundaryKey> {
        self.encoding.encode(&parse_decimal(input)?)
    }

    fn row_to_str(&self, row: &[u8]) -> Result<String> {
        Ok(Self::row_value(row)?.to_string())
    }

    fn separator(&self) -> &str {
        " "
    }
}
