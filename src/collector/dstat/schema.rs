//! Column layout of `dstat -m --all` output.
//!
//! dstat groups its columns into sections. The banner line names the
//! sections, the header line names the columns, and data lines separate
//! sections with `|`:
//!
//! ```text
//! ------memory-usage----- ----total-cpu-usage---- -dsk/total- -net/total- ---paging-- ---system--
//!  used  buff  cach  free|usr sys idl wai hiq siq| read  writ| recv  send|  in   out | int   csw
//! 1204M  180M 2398M 12.1G|  2   1  97   0   0   0|  12k   40k|   0     0 |   0     0 | 512  1024
//! ```
//!
//! Everything the parser and the sample builder know about the layout comes
//! from [`SECTIONS`].

/// How a raw decoded value is stored in a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Bytes to kilobytes (divide by 1024).
    BytesToKilobytes,
    /// Stored as decoded.
    Raw,
}

impl Conversion {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Conversion::BytesToKilobytes => value / 1024.0,
            Conversion::Raw => value,
        }
    }
}

/// A group of columns delimited by `|` in data lines.
#[derive(Debug)]
pub struct Section {
    /// Name used in the banner line, e.g. `memory-usage`.
    pub banner: &'static str,
    /// Short name used in reported column names, e.g. `memory`.
    pub name: &'static str,
    /// Column labels as printed in the header line.
    pub labels: &'static [&'static str],
    /// Conversion applied to every column of the section.
    pub conversion: Conversion,
}

pub static SECTIONS: [Section; 6] = [
    Section {
        banner: "memory-usage",
        name: "memory",
        labels: &["used", "buff", "cach", "free"],
        conversion: Conversion::BytesToKilobytes,
    },
    Section {
        banner: "total-cpu-usage",
        name: "cpu",
        labels: &["usr", "sys", "idl", "wai", "hiq", "siq"],
        conversion: Conversion::Raw,
    },
    Section {
        banner: "dsk/total",
        name: "dsk",
        labels: &["read", "writ"],
        conversion: Conversion::Raw,
    },
    Section {
        banner: "net/total",
        name: "net",
        labels: &["recv", "send"],
        conversion: Conversion::Raw,
    },
    Section {
        banner: "paging",
        name: "paging",
        labels: &["in", "out"],
        conversion: Conversion::Raw,
    },
    Section {
        banner: "system",
        name: "system",
        labels: &["int", "csw"],
        conversion: Conversion::Raw,
    },
];

/// Number of data columns in a row.
pub const COLUMN_COUNT: usize = 18;

/// Name of the synthetic leading column in [`metadata`].
pub const TIME_COLUMN: &str = "Time, ms";

/// Conversion rule for every column, in row order.
pub fn conversions() -> impl Iterator<Item = Conversion> {
    SECTIONS
        .iter()
        .flat_map(|s| s.labels.iter().map(move |_| s.conversion))
}

/// Column names reported alongside samples: the time column followed by one
/// `"<section> <label>"` entry per data column.
pub fn metadata() -> Vec<String> {
    let mut names = Vec::with_capacity(COLUMN_COUNT + 1);
    names.push(TIME_COLUMN.to_string());
    for section in &SECTIONS {
        for label in section.labels {
            names.push(format!("{} {}", section.name, label));
        }
    }
    names
}

/// Expected header line, used in drift diagnostics.
pub fn expected_header() -> String {
    SECTIONS
        .iter()
        .map(|s| s.labels.join(" "))
        .collect::<Vec<_>>()
        .join(" | ")
}
