//! Rendering of the `--stats` block printed at the end of a run.
//!
//! # Example
//!
//! ```
//! use cli::stats_format::{HumanReadable, StatsData, StatsFormatter};
//!
//! let data = StatsData {
//!     num_files: 1234,
//!     num_created_files: 56,
//!     num_deleted_files: 0,
//!     num_transferred_files: 42,
//!     total_file_size: 1_234_567,
//!     total_transferred_size: 123_456,
//!     literal_data: 12_345,
//!     matched_data: 111_111,
//!     file_list_size: 1_234,
//!     total_bytes_sent: 12_345,
//!     total_bytes_received: 67_890,
//!     elapsed_seconds: 2.0,
//!     speedup: 1.54,
//! };
//!
//! let output = StatsFormatter::new(data).format();
//! assert!(output.contains("Number of files: 1,234"));
//! assert!(output.ends_with("speedup is 1.54"));
//!
//! let human = StatsFormatter::new(data)
//!     .human_readable(HumanReadable::DecimalUnits)
//!     .format();
//! assert!(human.contains("Total file size: 1.23M bytes"));
//! assert!(human.contains("Number of files: 1,234"));
//! ```

use std::fmt;

use engine::RunSummary;

/// Numbers shown in the statistics block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsData {
    /// Number of source entries considered.
    pub num_files: u64,
    /// Number of entries created on the destination.
    pub num_created_files: u64,
    /// Number of entries deleted from the destination.
    pub num_deleted_files: u64,
    /// Number of regular files transferred.
    pub num_transferred_files: u64,
    /// Total size of all regular source files.
    pub total_file_size: u64,
    /// Total size of the transferred files.
    pub total_transferred_size: u64,
    /// Bytes sent as literal data.
    pub literal_data: u64,
    /// Bytes reused from destination blocks.
    pub matched_data: u64,
    /// Serialized file-list size.
    pub file_list_size: u64,
    /// Total bytes sent.
    pub total_bytes_sent: u64,
    /// Total bytes received.
    pub total_bytes_received: u64,
    /// Wall-clock duration of the run in seconds.
    pub elapsed_seconds: f64,
    /// Transferred size relative to transport bytes.
    pub speedup: f64,
}

impl StatsData {
    /// Collects the numbers of a finished run.
    #[must_use]
    pub fn from_summary(summary: &RunSummary) -> Self {
        let stats = summary.stats();
        Self {
            num_files: stats.entries_considered,
            num_created_files: stats.entries_created,
            num_deleted_files: stats.entries_deleted,
            num_transferred_files: stats.files_transferred,
            total_file_size: stats.total_file_size,
            total_transferred_size: stats.transferred_file_size,
            literal_data: stats.literal_bytes,
            matched_data: stats.matched_bytes,
            file_list_size: stats.file_list_size,
            total_bytes_sent: stats.bytes_sent,
            total_bytes_received: stats.bytes_received,
            elapsed_seconds: summary.elapsed().as_secs_f64(),
            speedup: stats.speedup(),
        }
    }
}

/// How byte quantities are rendered, chosen by repeating `-h`.
///
/// Entry counts always use [`format_number`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum HumanReadable {
    /// Exact values with thousands separators.
    #[default]
    Separator,
    /// Powers of 1000 with a `K`, `M`, `G`, `T` or `P` suffix.
    DecimalUnits,
    /// Powers of 1024 with the same suffixes.
    BinaryUnits,
}

impl HumanReadable {
    /// Maps the number of `-h` flags to a mode.
    #[must_use]
    pub const fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Separator,
            1 => Self::DecimalUnits,
            _ => Self::BinaryUnits,
        }
    }

    const fn base(self) -> Option<f64> {
        match self {
            Self::Separator => None,
            Self::DecimalUnits => Some(1000.0),
            Self::BinaryUnits => Some(1024.0),
        }
    }
}

/// Formatter for the statistics block.
pub struct StatsFormatter {
    data: StatsData,
    human: HumanReadable,
}

impl StatsFormatter {
    /// Creates a formatter for `data`.
    #[must_use]
    pub const fn new(data: StatsData) -> Self {
        Self {
            data,
            human: HumanReadable::Separator,
        }
    }

    /// Renders byte quantities in `mode`.
    #[must_use]
    pub const fn human_readable(mut self, mode: HumanReadable) -> Self {
        self.human = mode;
        self
    }

    /// Renders the block without a trailing newline.
    #[must_use]
    pub fn format(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StatsFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = &self.data;
        let size = |bytes| format_size(bytes, self.human);
        writeln!(f, "Number of files: {}", format_number(data.num_files))?;
        writeln!(
            f,
            "Number of created files: {}",
            format_number(data.num_created_files)
        )?;
        writeln!(
            f,
            "Number of deleted files: {}",
            format_number(data.num_deleted_files)
        )?;
        writeln!(
            f,
            "Number of regular files transferred: {}",
            format_number(data.num_transferred_files)
        )?;
        writeln!(f, "Total file size: {} bytes", size(data.total_file_size))?;
        writeln!(
            f,
            "Total transferred file size: {} bytes",
            size(data.total_transferred_size)
        )?;
        writeln!(f, "Literal data: {} bytes", size(data.literal_data))?;
        writeln!(f, "Matched data: {} bytes", size(data.matched_data))?;
        writeln!(f, "File list size: {}", size(data.file_list_size))?;
        writeln!(f, "Total bytes sent: {}", size(data.total_bytes_sent))?;
        writeln!(f, "Total bytes received: {}", size(data.total_bytes_received))?;
        writeln!(f)?;

        let speed = calculate_transfer_speed(
            data.total_bytes_sent,
            data.total_bytes_received,
            data.elapsed_seconds,
        );
        writeln!(
            f,
            "sent {} bytes  received {} bytes  {} bytes/sec",
            size(data.total_bytes_sent),
            size(data.total_bytes_received),
            format_rate(speed, self.human)
        )?;
        write!(
            f,
            "total size is {}  speedup is {}",
            size(data.total_file_size),
            format_speedup(data.speedup)
        )
    }
}

/// Formats a number with thousands separators (commas).
///
/// # Examples
///
/// ```
/// use cli::stats_format::format_number;
///
/// assert_eq!(format_number(0), "0");
/// assert_eq!(format_number(999), "999");
/// assert_eq!(format_number(1000), "1,000");
/// assert_eq!(format_number(1234567), "1,234,567");
/// ```
#[must_use]
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

/// Formats a transfer speed with two decimals and thousands separators.
///
/// ```
/// use cli::stats_format::format_speed;
///
/// assert_eq!(format_speed(0.0), "0.00");
/// assert_eq!(format_speed(1234.56), "1,234.56");
/// ```
#[must_use]
pub fn format_speed(bytes_per_sec: f64) -> String {
    if !bytes_per_sec.is_finite() || bytes_per_sec <= 0.0 {
        return "0.00".to_owned();
    }
    let cents = (bytes_per_sec * 100.0).round() as u64;
    format!("{}.{:02}", format_number(cents / 100), cents % 100)
}

/// Formats a byte count in `mode`. Values below one unit keep the exact
/// separated form.
///
/// ```
/// use cli::stats_format::{HumanReadable, format_size};
///
/// assert_eq!(format_size(1_234_567, HumanReadable::Separator), "1,234,567");
/// assert_eq!(format_size(1_024, HumanReadable::DecimalUnits), "1.02K");
/// assert_eq!(format_size(1_048_576, HumanReadable::BinaryUnits), "1.00M");
/// assert_eq!(format_size(999, HumanReadable::DecimalUnits), "999");
/// ```
#[must_use]
pub fn format_size(bytes: u64, mode: HumanReadable) -> String {
    with_units(bytes as f64, mode).unwrap_or_else(|| format_number(bytes))
}

/// Formats a byte rate in `mode`, falling back to [`format_speed`].
#[must_use]
pub fn format_rate(bytes_per_sec: f64, mode: HumanReadable) -> String {
    if !bytes_per_sec.is_finite() {
        return format_speed(bytes_per_sec);
    }
    with_units(bytes_per_sec, mode).unwrap_or_else(|| format_speed(bytes_per_sec))
}

fn with_units(value: f64, mode: HumanReadable) -> Option<String> {
    const UNITS: [char; 5] = ['K', 'M', 'G', 'T', 'P'];

    let base = mode.base()?;
    if value < base {
        return None;
    }
    let mut magnitude = value / base;
    let mut unit = UNITS[0];
    for candidate in UNITS.iter().skip(1) {
        if magnitude < base {
            break;
        }
        magnitude /= base;
        unit = *candidate;
    }
    Some(format!("{magnitude:.2}{unit}"))
}

/// Formats a speedup ratio with two decimals.
///
/// ```
/// use cli::stats_format::format_speedup;
///
/// assert_eq!(format_speedup(1.0), "1.00");
/// assert_eq!(format_speedup(12.345), "12.35");
/// ```
#[must_use]
pub fn format_speedup(speedup: f64) -> String {
    format!("{speedup:.2}")
}

fn calculate_transfer_speed(sent: u64, received: u64, elapsed_seconds: f64) -> f64 {
    let total = sent.saturating_add(received) as f64;
    if elapsed_seconds > 0.0 {
        total / elapsed_seconds
    } else {
        total
    }
}
