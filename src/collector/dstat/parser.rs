//! Line classification for dstat output.
//!
//! These are pure functions over a single line. The caller tracks the line
//! position and picks the [`LineKind`] that applies to it.

use super::schema::{COLUMN_COUNT, SECTIONS};

/// Role of a line, determined only by its position in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// First line: section names.
    Banner,
    /// Second line: column labels.
    Header,
    /// Everything after: one value per column.
    Data,
}

impl LineKind {
    pub fn for_position(position: u64) -> Self {
        match position {
            0 => LineKind::Banner,
            1 => LineKind::Header,
            _ => LineKind::Data,
        }
    }
}

impl std::fmt::Display for LineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineKind::Banner => write!(f, "banner"),
            LineKind::Header => write!(f, "header"),
            LineKind::Data => write!(f, "data"),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Checks the banner line: one dash-padded group per section, groups
/// separated by a single space.
///
/// The first group may carry leading decoration before the dashes
/// (dstat prints a terminal escape or a short tag there on some versions).
/// Surrounding whitespace is ignored.
pub fn is_banner(line: &str) -> bool {
    let groups: Vec<&str> = line.trim().split(' ').collect();
    if groups.len() != SECTIONS.len() {
        return false;
    }

    let Some(lead) = groups[0]
        .trim_end_matches('-')
        .strip_suffix(SECTIONS[0].banner)
    else {
        return false;
    };
    // Leading decoration: non-word characters, then word characters, then dashes.
    let lead = lead
        .trim_end_matches('-')
        .trim_start_matches(|c: char| !is_word_char(c));
    if !lead.chars().all(is_word_char) {
        return false;
    }

    groups[1..]
        .iter()
        .zip(&SECTIONS[1..])
        .all(|(group, section)| group.trim_matches('-') == section.banner)
}

/// Checks the header line: the column labels of each section, sections
/// separated by `|`.
pub fn is_header(line: &str) -> bool {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() != SECTIONS.len() {
        return false;
    }

    parts.iter().zip(&SECTIONS).all(|(part, section)| {
        part.split_ascii_whitespace()
            .eq(section.labels.iter().copied())
    })
}

/// Checks a value token: `digits[.digits]` or `[digits].digits`, optionally
/// followed by one word character. The character is not validated here;
/// unknown suffixes are rejected when the value is decoded.
pub fn is_value_token(token: &str) -> bool {
    let number = match token.chars().last() {
        Some(c) if is_word_char(c) && !c.is_ascii_digit() => &token[..token.len() - 1],
        Some(_) => token,
        None => return false,
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match number.split_once('.') {
        Some((int_part, frac)) => all_digits(int_part) && !frac.is_empty() && all_digits(frac),
        None => !number.is_empty() && all_digits(number),
    }
}

/// Splits a data line into its value tokens.
///
/// Returns `None` unless every section holds exactly as many well-formed
/// tokens as the schema declares.
pub fn split_row(line: &str) -> Option<[&str; COLUMN_COUNT]> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() != SECTIONS.len() {
        return None;
    }

    let mut tokens = [""; COLUMN_COUNT];
    let mut idx = 0;

    for (part, section) in parts.iter().zip(&SECTIONS) {
        let mut count = 0;
        for token in part.split_ascii_whitespace() {
            if count == section.labels.len() || !is_value_token(token) {
                return None;
            }
            tokens[idx] = token;
            idx += 1;
            count += 1;
        }
        if count != section.labels.len() {
            return None;
        }
    }

    Some(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{BANNER, HEADER, ROW};

    #[test]
    fn test_line_kind_for_position() {
        assert_eq!(LineKind::for_position(0), LineKind::Banner);
        assert_eq!(LineKind::for_position(1), LineKind::Header);
        assert_eq!(LineKind::for_position(2), LineKind::Data);
        assert_eq!(LineKind::for_position(10_000), LineKind::Data);
    }

    #[test]
    fn test_banner_accepts_dstat_output() {
        assert!(is_banner(BANNER));
        assert!(is_banner(&format!("{}   ", BANNER)));
        assert!(is_banner(&format!(" {}", BANNER)));
        assert!(is_banner(&format!("\t  {}", BANNER)));
        assert!(is_banner(
            "memory-usage total-cpu-usage dsk/total net/total paging system"
        ));
        assert!(is_banner(
            ">>ab--memory-usage- -total-cpu-usage- -dsk/total- -net/total- -paging- -system-"
        ));
    }

    #[test]
    fn test_banner_rejects_drift() {
        // Section missing.
        assert!(!is_banner(
            "------memory-usage----- ----total-cpu-usage---- -dsk/total- -net/total- ---paging--"
        ));
        // Sections reordered.
        assert!(!is_banner(
            "----total-cpu-usage---- ------memory-usage----- -dsk/total- -net/total- ---paging-- ---system--"
        ));
        // Double space between groups.
        assert!(!is_banner(
            "------memory-usage-----  ----total-cpu-usage---- -dsk/total- -net/total- ---paging-- ---system--"
        ));
        assert!(!is_banner(""));
    }

    #[test]
    fn test_header() {
        assert!(is_header(HEADER));
        assert!(is_header(
            "used buff cach free | usr sys idl wai hiq siq | read writ | recv send | in out | int csw"
        ));
        assert!(!is_header(
            "used buff cach free | usr sys idl wai hiq siq stl | read writ | recv send | in out | int csw"
        ));
        assert!(!is_header(
            "used buff cach free usr sys idl wai hiq siq | read writ | recv send | in out | int csw"
        ));
        assert!(!is_header(BANNER));
    }

    #[test]
    fn test_value_tokens() {
        for token in ["0", "12", "1.5", ".5", "12k", "1.2M", "7B", "5x", "3_"] {
            assert!(is_value_token(token), "{token}");
        }
        for token in ["", "k", "1.", "1.2.3", "12kk", "-1", "1,5"] {
            assert!(!is_value_token(token), "{token}");
        }
    }

    #[test]
    fn test_split_row() {
        let tokens = split_row(ROW).unwrap();
        assert_eq!(tokens[0], "1204M");
        assert_eq!(tokens[3], "12.1G");
        assert_eq!(tokens[4], "2");
        assert_eq!(tokens[6], "97");
        assert_eq!(tokens[10], "12k");
        assert_eq!(tokens[16], "512");
        assert_eq!(tokens[17], "1024");
    }

    #[test]
    fn test_split_row_right_aligned() {
        let row = " 615M 52.2M  478M 6822M|  3   1  96   0   0   0|   0    24k| 132B  234B|   0     0 | 245   402 ";
        let tokens = split_row(row).unwrap();
        assert_eq!(tokens[0], "615M");
        assert_eq!(tokens[1], "52.2M");
        assert_eq!(tokens[11], "24k");
        assert_eq!(tokens[12], "132B");
        assert_eq!(tokens[17], "402");
    }

    #[test]
    fn test_split_row_missing_column() {
        let row = "1204M  180M 2398M|  2   1  97   0   0   0|  12k   40k|   0     0 |   0     0 | 512  1024";
        assert!(split_row(row).is_none());
    }

    #[test]
    fn test_split_row_extra_column() {
        let row = "1204M  180M 2398M 1G 1G|  2   1  97   0   0   0|  12k   40k|   0     0 |   0     0 | 512  1024";
        assert!(split_row(row).is_none());
    }

    #[test]
    fn test_split_row_requires_bars_at_section_ends() {
        let row = "1204M  180M 2398M 12.1G   2   1  97   0   0   0   12k   40k    0     0     0     0   512  1024";
        assert!(split_row(row).is_none());
    }

    #[test]
    fn test_split_row_rejects_malformed_token() {
        let row = "1204M  180M 2398M 12.1G|  2   1  97   0   0   0|  12k   4-0k|   0     0 |   0     0 | 512  1024";
        assert!(split_row(row).is_none());
    }

    #[test]
    fn test_split_row_headers_are_not_values() {
        assert!(split_row(HEADER).is_none());
    }
}
