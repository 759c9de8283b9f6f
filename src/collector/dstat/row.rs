//! Conversion of a tokenized data row into a [`Sample`].

use super::schema::{COLUMN_COUNT, conversions};
use super::units::{InvalidNumberFormat, parse_value_with_unit};
use crate::storage::Sample;

/// Decodes every token and applies the per-column conversion.
///
/// All-or-nothing: the first malformed token fails the whole row.
pub fn decode_row(
    tokens: &[&str; COLUMN_COUNT],
) -> Result<[f64; COLUMN_COUNT], InvalidNumberFormat> {
    let mut values = [0.0; COLUMN_COUNT];
    for ((value, token), conversion) in values.iter_mut().zip(tokens).zip(conversions()) {
        *value = conversion.apply(parse_value_with_unit(token)?);
    }
    Ok(values)
}

/// Builds a sample stamped with the current wall-clock time.
pub fn build_sample(tokens: &[&str; COLUMN_COUNT]) -> Result<Sample, InvalidNumberFormat> {
    let values = decode_row(tokens)?;
    Ok(Sample::new(chrono::Utc::now().timestamp_millis(), values))
}
