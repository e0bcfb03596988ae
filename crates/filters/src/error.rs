use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error produced when a rule cannot be parsed or compiled into a matcher.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The pattern is not a valid glob.
    #[error("failed to compile filter pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying glob error.
        source: globset::Error,
    },
    /// A `--filter` rule did not start with `+ `, `- `, `include ` or
    /// `exclude `.
    #[error("unrecognised filter rule '{rule}'")]
    InvalidRule {
        /// The rule text as supplied.
        rule: String,
    },
}

impl FilterError {
    /// Returns the offending pattern or rule text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::InvalidPattern { pattern, .. } => pattern,
            Self::InvalidRule { rule } => rule,
        }
    }
}

/// Error produced when a pattern file cannot be loaded.
#[derive(Debug, Error)]
#[error("failed to read pattern file '{}': {source}", path.display())]
pub struct PatternFileError {
    path: PathBuf,
    source: io::Error,
}

impl PatternFileError {
    pub(crate) fn new(path: PathBuf, source: io::Error) -> Self {
        Self { path, source }
    }

    /// Returns the path of the unreadable file.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use globset::GlobBuilder;
    use std::error::Error as _;

    #[test]
    fn filter_error_preserves_pattern_and_source() {
        let glob_err = GlobBuilder::new("[").build().unwrap_err();
        let error = FilterError::InvalidPattern {
            pattern: "[".into(),
            source: glob_err.clone(),
        };

        assert_eq!(error.pattern(), "[");
        assert!(error.to_string().contains("failed to compile"));
        assert_eq!(
            error.source().expect("source").to_string(),
            glob_err.to_string()
        );
    }

    #[test]
    fn pattern_file_error_names_path() {
        let error = PatternFileError::new(
            PathBuf::from("/missing/list"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(error.to_string().contains("/missing/list"));
        assert!(error.source().is_some());
    }
}
