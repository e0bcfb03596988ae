use std::fs;
use std::path::Path;

use logging::trace_filter;

use crate::{FilterAction, FilterRule, PatternFileError};

/// Parses the contents of an `--exclude-from` / `--include-from` file.
///
/// One pattern per line. Blank lines and lines starting with `#` are
/// skipped, a trailing `\r` is dropped, and a leading `+ ` or `- ` overrides
/// `default_action` for that line.
///
/// # Examples
///
/// ```
/// use filters::{FilterAction, parse_pattern_lines};
///
/// let rules = parse_pattern_lines("# build output\n*.o\n\n+ keep.o\n", FilterAction::Exclude);
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules[0].action(), FilterAction::Exclude);
/// assert_eq!(rules[1].action(), FilterAction::Include);
/// assert_eq!(rules[1].pattern(), "keep.o");
/// ```
#[must_use]
pub fn parse_pattern_lines(text: &str, default_action: FilterAction) -> Vec<FilterRule> {
    text.lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|line| {
            if let Some(pattern) = line.strip_prefix("+ ") {
                FilterRule::include(pattern)
            } else if let Some(pattern) = line.strip_prefix("- ") {
                FilterRule::exclude(pattern)
            } else {
                FilterRule::new(default_action, line)
            }
        })
        .collect()
}

/// Reads and parses a pattern file with [`parse_pattern_lines`].
pub fn read_pattern_file(
    path: &Path,
    default_action: FilterAction,
) -> Result<Vec<FilterRule>, PatternFileError> {
    let bytes = fs::read(path).map_err(|error| PatternFileError::new(path.to_path_buf(), error))?;
    let text = String::from_utf8_lossy(&bytes);
    let rules = parse_pattern_lines(&text, default_action);
    trace_filter!("loaded {} rules from {}", rules.len(), path.display());
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_carriage_returns() {
        let rules = parse_pattern_lines("a.txt\r\nb.txt\r\n", FilterAction::Include);
        let patterns: Vec<_> = rules.iter().map(FilterRule::pattern).collect();
        assert_eq!(patterns, ["a.txt", "b.txt"]);
    }

    #[test]
    fn whitespace_only_lines_are_blank() {
        assert!(parse_pattern_lines("   \n\t\n", FilterAction::Exclude).is_empty());
    }

    #[test]
    fn comment_marker_must_lead_the_line() {
        let rules = parse_pattern_lines("# comment\nfile#1\n", FilterAction::Exclude);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].pattern(), "file#1");
    }

    #[test]
    fn sign_needs_a_following_space() {
        let rules = parse_pattern_lines("-dash-name\n- real\n", FilterAction::Include);
        assert_eq!(rules[0].action(), FilterAction::Include);
        assert_eq!(rules[0].pattern(), "-dash-name");
        assert_eq!(rules[1].action(), FilterAction::Exclude);
        assert_eq!(rules[1].pattern(), "real");
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("absent");
        let error = read_pattern_file(&path, FilterAction::Exclude).expect_err("missing");
        assert_eq!(error.path(), path);
    }

    #[test]
    fn reads_file_from_disk() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("list");
        fs::write(&path, "*.log\n+ keep.log\n").expect("write");
        let rules = read_pattern_file(&path, FilterAction::Exclude).expect("read");
        assert_eq!(rules, [FilterRule::exclude("*.log"), FilterRule::include("keep.log")]);
    }
}
