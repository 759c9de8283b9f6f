//! Per-session line handling.

use std::sync::Arc;

use tracing::{debug, trace};

use super::error::ProbeError;
use super::parser::{LineKind, is_banner, is_header, split_row};
use super::row::build_sample;
use crate::collector::sink::DiagnosticSink;
use crate::storage::{Sample, SampleBuffer};

/// Running totals for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub samples: u64,
    pub discarded: u64,
}

/// Owns the line position of one session and turns each line into either a
/// buffered sample or a diagnostic.
///
/// Errors never stop the stream; the position advances for every line.
pub struct LineConsumer {
    position: u64,
    stats: LineStats,
    buffer: Arc<SampleBuffer>,
    sink: Arc<dyn DiagnosticSink>,
}

impl LineConsumer {
    pub fn new(buffer: Arc<SampleBuffer>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            position: 0,
            stats: LineStats::default(),
            buffer,
            sink,
        }
    }

    /// Number of lines consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn stats(&self) -> LineStats {
        self.stats
    }

    pub fn consume(&mut self, line: &str) {
        let kind = LineKind::for_position(self.position);
        self.position += 1;

        match classify(kind, line) {
            Ok(Some(sample)) => {
                trace!("sample at {}", sample.timestamp_ms());
                self.buffer.append(sample);
                self.stats.samples += 1;
            }
            Ok(None) => {}
            Err(e) => {
                if kind == LineKind::Data {
                    self.stats.discarded += 1;
                }
                if e.is_warning() {
                    self.sink.warning(&e.to_string());
                } else {
                    self.sink.error(&e.to_string());
                }
            }
        }
    }
}

impl Drop for LineConsumer {
    fn drop(&mut self) {
        debug!(
            "dstat stream closed after {} lines: {} samples, {} discarded",
            self.position, self.stats.samples, self.stats.discarded
        );
    }
}

/// Validates one line. Banner and header lines never produce a sample.
pub fn classify(kind: LineKind, line: &str) -> Result<Option<Sample>, ProbeError> {
    match kind {
        LineKind::Banner if is_banner(line) => Ok(None),
        LineKind::Header if is_header(line) => Ok(None),
        LineKind::Banner | LineKind::Header => Err(ProbeError::FormatDrift {
            kind,
            line: line.to_string(),
        }),
        LineKind::Data => {
            let tokens = split_row(line).ok_or_else(|| ProbeError::RowParse {
                line: line.to_string(),
            })?;
            build_sample(&tokens)
                .map(Some)
                .map_err(|source| ProbeError::InvalidNumber {
                    line: line.to_string(),
                    source,
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{BANNER, HEADER, ROW, ROW_17_COLUMNS, ROW_BAD_SUFFIX};
    use crate::collector::sink::MemorySink;

    fn consumer() -> (LineConsumer, Arc<SampleBuffer>, Arc<MemorySink>) {
        let buffer = Arc::new(SampleBuffer::new());
        let sink = Arc::new(MemorySink::new());
        let consumer = LineConsumer::new(buffer.clone(), sink.clone());
        (consumer, buffer, sink)
    }

    #[test]
    fn test_well_formed_session() {
        let (mut consumer, buffer, sink) = consumer();
        consumer.consume(BANNER);
        consumer.consume(HEADER);
        consumer.consume(
            "1024k 512k 256k 2048k|  2   1  97   0   0   0|  12k   40k|   0     0 |   0     0 | 512  1024",
        );

        let samples = buffer.drain();
        assert_eq!(samples.len(), 1);
        let values = samples[0].values();
        assert_eq!(&values[..4], &[1024.0, 512.0, 256.0, 2048.0]);
        assert_eq!(
            &values[4..],
            &[2.0, 1.0, 97.0, 0.0, 0.0, 0.0, 12_288.0, 40_960.0, 0.0, 0.0, 0.0, 0.0, 512.0, 1024.0]
        );
        assert!(sink.output_messages().is_empty());
        assert!(sink.error_messages().is_empty());
        assert_eq!(consumer.position(), 3);
        assert_eq!(
            consumer.stats(),
            LineStats {
                samples: 1,
                discarded: 0
            }
        );
    }

    #[test]
    fn test_missing_column_is_discarded() {
        let (mut consumer, buffer, sink) = consumer();
        consumer.consume(BANNER);
        consumer.consume(HEADER);
        consumer.consume(ROW_17_COLUMNS);
        assert!(buffer.is_empty());
        assert_eq!(
            sink.error_messages(),
            vec![format!("Can't parse line: '{}'.", ROW_17_COLUMNS)]
        );

        consumer.consume(ROW);
        assert_eq!(buffer.drain().len(), 1);
        assert_eq!(consumer.position(), 4);
        assert_eq!(consumer.stats().discarded, 1);
    }

    #[test]
    fn test_bad_suffix_is_discarded() {
        let (mut consumer, buffer, sink) = consumer();
        consumer.consume(BANNER);
        consumer.consume(HEADER);
        consumer.consume(ROW_BAD_SUFFIX);
        consumer.consume(ROW);

        assert_eq!(buffer.drain().len(), 1);
        let errors = sink.error_messages();
        assert_eq!(errors.len(), 1);
        let expected = format!("Can't parse line '{}' due to exception:", ROW_BAD_SUFFIX);
        assert!(errors[0].starts_with(&expected));
        assert!(errors[0].contains("40x"));
    }

    #[test]
    fn test_banner_drift_is_a_warning() {
        let (mut consumer, buffer, sink) = consumer();
        consumer.consume("something else entirely");
        consumer.consume(HEADER);
        consumer.consume(ROW);

        assert_eq!(
            sink.output_messages(),
            vec!["WARNING: Unexpected first line: 'something else entirely'."]
        );
        assert!(sink.error_messages().is_empty());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_header_drift_is_an_error_but_rows_still_parse() {
        let (mut consumer, buffer, sink) = consumer();
        consumer.consume(BANNER);
        consumer.consume("used buff cach free | usr sys idl");
        consumer.consume(ROW);

        let errors = sink.error_messages();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Header line does not match expected header"));
        assert!(sink.output_messages().is_empty());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_position_decides_state() {
        // A valid data row in the banner slot is banner drift, not a sample.
        let (mut consumer, buffer, sink) = consumer();
        consumer.consume(ROW);
        consumer.consume(ROW);
        consumer.consume(BANNER);

        assert!(buffer.is_empty());
        assert_eq!(sink.output_messages().len(), 1);
        assert_eq!(sink.error_messages().len(), 2);
    }

    #[test]
    fn test_classify() {
        assert!(matches!(classify(LineKind::Banner, BANNER), Ok(None)));
        assert!(matches!(classify(LineKind::Header, HEADER), Ok(None)));
        assert!(matches!(classify(LineKind::Data, ROW), Ok(Some(_))));
        assert!(matches!(
            classify(LineKind::Data, HEADER),
            Err(ProbeError::RowParse { .. })
        ));
        assert!(matches!(
            classify(LineKind::Header, BANNER),
            Err(ProbeError::FormatDrift {
                kind: LineKind::Header,
                ..
            })
        ));
    }
}
