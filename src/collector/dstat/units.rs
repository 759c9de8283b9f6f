//! Decoder for dstat numeric tokens.
//!
//! dstat prints values like `12`, `1.5k`, `512M` or `7B`. The trailing letter
//! is a binary magnitude; everything before it is a plain decimal.

/// Error returned when a token cannot be decoded to a number.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidNumberFormat {
    pub value: String,
    pub reason: String,
}

impl InvalidNumberFormat {
    pub fn new(value: &str, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for InvalidNumberFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid number '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for InvalidNumberFormat {}

/// Multiplier for a magnitude suffix, `None` for an unknown letter.
fn suffix_multiplier(suffix: char) -> Option<f64> {
    match suffix {
        'B' => Some(1.0),
        'k' => Some(1024.0),
        'M' => Some(1_048_576.0),
        'G' => Some(1_073_741_824.0),
        _ => None,
    }
}

/// Parses `digits[.digits]` (leading digits optional when a fraction is
/// present). Rejects exponents, signs, `inf` and `nan`, which `f64::from_str`
/// would otherwise accept.
fn parse_decimal(token: &str, digits: &str) -> Result<f64, InvalidNumberFormat> {
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let valid = match frac_part {
        Some(frac) => all_digits(int_part) && !frac.is_empty() && all_digits(frac),
        None => !int_part.is_empty() && all_digits(int_part),
    };
    if !valid {
        return Err(InvalidNumberFormat::new(token, "not a decimal number"));
    }

    digits
        .parse::<f64>()
        .map_err(|e| InvalidNumberFormat::new(token, e.to_string()))
}

/// Decodes a dstat value into base units.
///
/// A token ending in a digit is a plain decimal. Otherwise the last character
/// must be one of `B` (x1), `k` (x2^10), `M` (x2^20) or `G` (x2^30) and the
/// prefix is scaled accordingly.
pub fn parse_value_with_unit(token: &str) -> Result<f64, InvalidNumberFormat> {
    let Some(last) = token.chars().last() else {
        return Err(InvalidNumberFormat::new(token, "value is empty"));
    };

    if last.is_ascii_digit() {
        return parse_decimal(token, token);
    }

    let multiplier = suffix_multiplier(last).ok_or_else(|| {
        InvalidNumberFormat::new(token, format!("unknown '{}' unit of measure", last))
    })?;

    let prefix = &token[..token.len() - last.len_utf8()];
    Ok(parse_decimal(token, prefix)? * multiplier)
}
