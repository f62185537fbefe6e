use crate::config::RECORD_KEY_WIDTH;
use crate::store::Put;
use bytes::Bytes;
use std::time::{SystemTime, UNIX_EPOCH};

/// Columns written per record.
pub const FIELD_COUNT: usize = 5;

/// Zero-padded row key for record `index`.
pub fn record_key(index: u64) -> String {
    format!("{:0width$}", index, width = RECORD_KEY_WIDTH)
}

/// One benchmark row: four content columns plus a write-time timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticRecord {
    index: u64,
    key: String,
    fields: [(String, Bytes); FIELD_COUNT],
}

impl SyntheticRecord {
    /// Build the record for `index`, stamping it with the current time.
    pub fn new(index: u64) -> Self {
        Self::with_timestamp(index, now_millis())
    }

    pub fn with_timestamp(index: u64, written_at_ms: u64) -> Self {
        let content = |n: usize| {
            (
                format!("field_{}_{}", n, index),
                Bytes::from(format!("field_{}_value_{}", n, index)),
            )
        };
        Self {
            index,
            key: record_key(index),
            fields: [
                content(1),
                content(2),
                content(3),
                content(4),
                (
                    format!("field_5_{}", index),
                    Bytes::copy_from_slice(&written_at_ms.to_be_bytes()),
                ),
            ],
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn fields(&self) -> &[(String, Bytes); FIELD_COUNT] {
        &self.fields
    }

    /// Timestamp column value, milliseconds since the epoch.
    pub fn written_at_ms(&self) -> u64 {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.fields[FIELD_COUNT - 1].1);
        u64::from_be_bytes(raw)
    }

    pub fn into_put(self, family: &Bytes) -> Put {
        let mut put = Put::new(self.key);
        for (qualifier, value) in self.fields {
            put.add_column(family.clone(), qualifier, value);
        }
        put
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
