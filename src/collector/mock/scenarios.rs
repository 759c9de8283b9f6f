//! Pre-built dstat output scenarios for testing.
//!
//! Lines are taken from `dstat -m --all --noheaders --noupdate 1` on a
//! small Linux host.

use super::launcher::ScriptedLauncher;

/// First line of dstat output.
pub const BANNER: &str =
    "------memory-usage----- ----total-cpu-usage---- -dsk/total- -net/total- ---paging-- ---system--";

/// Second line of dstat output.
pub const HEADER: &str =
    " used  buff  cach  free| usr sys idl wai hiq siq| read  writ| recv  send|  in   out | int   csw ";

/// A well-formed data line.
pub const ROW: &str =
    "1204M  180M 2398M 12.1G|   2   1  97   0   0   0|  12k   40k|1.5k  2M  |   0     0 | 512  1024";

/// Data line with the last memory column missing.
pub const ROW_17_COLUMNS: &str =
    "1204M  180M 2398M|   2   1  97   0   0   0|  12k   40k|1.5k  2M  |   0     0 | 512  1024";

/// Data line of the right shape whose `writ` value has an unknown unit.
pub const ROW_BAD_SUFFIX: &str =
    "1204M  180M 2398M 12.1G|   2   1  97   0   0   0|  12k   40x|1.5k  2M  |   0     0 | 512  1024";

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

impl ScriptedLauncher {
    /// Banner, header and `rows` copies of [`ROW`].
    pub fn typical_session(rows: usize) -> Self {
        let mut lines = owned(&[BANNER, HEADER]);
        lines.extend(std::iter::repeat_n(ROW.to_string(), rows));
        Self::new(lines)
    }

    /// Valid banner and header followed by a mix of good and bad rows.
    pub fn malformed_rows() -> Self {
        Self::new(owned(&[BANNER, HEADER, ROW_17_COLUMNS, ROW, ROW_BAD_SUFFIX, ROW]))
    }

    /// Output of a dstat build with a different column set.
    pub fn drifted_format() -> Self {
        Self::new(owned(&[
            "----system---- ----total-cpu-usage----",
            "     time     |usr sys idl wai stl",
            ROW,
        ]))
    }
}
