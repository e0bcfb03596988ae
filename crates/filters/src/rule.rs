use crate::{FilterAction, FilterError};
use std::str::FromStr;

/// User-visible filter rule consisting of an action and pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilterRule {
    pub(crate) action: FilterAction,
    pub(crate) pattern: String,
}

impl FilterRule {
    /// Creates a rule with an explicit action.
    #[must_use]
    pub fn new(action: FilterAction, pattern: impl Into<String>) -> Self {
        Self {
            action,
            pattern: pattern.into(),
        }
    }

    /// Creates an include rule for `pattern`.
    #[must_use]
    pub fn include(pattern: impl Into<String>) -> Self {
        Self::new(FilterAction::Include, pattern)
    }

    /// Creates an exclude rule for `pattern`.
    #[must_use]
    pub fn exclude(pattern: impl Into<String>) -> Self {
        Self::new(FilterAction::Exclude, pattern)
    }

    /// Returns the rule action.
    #[must_use]
    pub const fn action(&self) -> FilterAction {
        self.action
    }

    /// Returns the pattern text associated with the rule.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Anchors the pattern to the root of the transfer if it is not already.
    #[must_use]
    pub fn anchor_to_root(mut self) -> Self {
        if !self.pattern.starts_with('/') {
            self.pattern.insert(0, '/');
        }
        self
    }
}

/// Parses the `--filter` short form: `+ PATTERN`, `- PATTERN`,
/// `include PATTERN` or `exclude PATTERN`.
///
/// # Examples
///
/// ```
/// use filters::{FilterAction, FilterRule};
///
/// let rule: FilterRule = "- *.o".parse().unwrap();
/// assert_eq!(rule.action(), FilterAction::Exclude);
/// assert_eq!(rule.pattern(), "*.o");
/// ```
impl FromStr for FilterRule {
    type Err = FilterError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || FilterError::InvalidRule {
            rule: text.to_owned(),
        };
        let (keyword, pattern) = text.split_once(' ').ok_or_else(invalid)?;
        let action = match keyword {
            "+" | "include" => FilterAction::Include,
            "-" | "exclude" => FilterAction::Exclude,
            _ => return Err(invalid()),
        };
        if pattern.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(action, pattern))
    }
}
