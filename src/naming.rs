//! Output file naming, optionally stamped `YYMMDD-HHMMSS` (UTC).

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// `prefix`, or `prefix-YYMMDD-HHMMSS` when `stamp` is set.
pub fn output_name(prefix: &str, stamp: bool, now: SystemTime) -> String {
    if stamp {
        format!("{prefix}-{}", timestamp(now))
    } else {
        prefix.to_string()
    }
}

/// `dir/name`, with `.png` appended when `name` carries no extension.
pub fn output_path(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if path.extension().is_some() {
        path
    } else {
        dir.join(format!("{name}.png"))
    }
}

/// `YYMMDD-HHMMSS` for `now` in UTC; times before the epoch stamp as the epoch.
pub fn timestamp(now: SystemTime) -> String {
    let secs = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    let day_secs = secs % 86_400;
    format!(
        "{:02}{:02}{:02}-{:02}{:02}{:02}",
        year.rem_euclid(100),
        month,
        day,
        day_secs / 3600,
        day_secs % 3600 / 60,
        day_secs % 60
    )
}

// Proleptic Gregorian date for a day count since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
