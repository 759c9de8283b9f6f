//! Data model for collected dstat samples.

use serde::{Deserialize, Serialize};

use crate::collector::dstat::schema::COLUMN_COUNT;

/// One dstat observation.
///
/// Values follow the column order of
/// [`SECTIONS`](crate::collector::dstat::schema::SECTIONS): memory in
/// kilobytes, CPU in percent, disk/network/paging as rates and system
/// interrupts/context switches as counts.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Sample {
    timestamp_ms: i64,
    values: [f64; COLUMN_COUNT],
}

impl Sample {
    pub fn new(timestamp_ms: i64, values: [f64; COLUMN_COUNT]) -> Self {
        Self {
            timestamp_ms,
            values,
        }
    }

    /// Wall-clock time (Unix milliseconds) when the row was decoded.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn values(&self) -> &[f64; COLUMN_COUNT] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_accessors() {
        let mut values = [0.0; COLUMN_COUNT];
        values[0] = 1024.0;
        values[17] = 7.0;
        let sample = Sample::new(1_700_000_000_000, values);

        assert_eq!(sample.timestamp_ms(), 1_700_000_000_000);
        assert_eq!(sample.values().len(), COLUMN_COUNT);
        assert_eq!(sample.values()[0], 1024.0);
        assert_eq!(sample.values()[17], 7.0);
    }
}
