use std::path::Path;
use std::sync::Arc;

use logging::trace_filter;

use crate::{FilterAction, FilterError, FilterRule, compiled::CompiledRule};

/// Ordered rules compiled once and shared by every file-list walk.
///
/// Clones share the compiled matchers.
///
/// # Examples
///
/// ```
/// use filters::{FilterRule, FilterSet};
/// use std::path::Path;
///
/// let set = FilterSet::from_rules([
///     FilterRule::exclude("*.o"),
///     FilterRule::include("important.o"),
/// ]).unwrap();
///
/// // "*.o" is consulted first and wins.
/// assert!(!set.allows(Path::new("important.o"), false));
/// // Nothing matches, so the file is kept.
/// assert!(set.allows(Path::new("README.md"), false));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FilterSet {
    rules: Arc<[CompiledRule]>,
}

impl FilterSet {
    /// Compiles `rules`, keeping their order.
    ///
    /// Fails with [`FilterError::InvalidPattern`] on the first pattern
    /// globset rejects.
    pub fn from_rules<I>(rules: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = FilterRule>,
    {
        let rules = rules
            .into_iter()
            .map(CompiledRule::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            rules: rules.into(),
        })
    }

    /// True when every path is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of compiled rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// First matching rule decides; no match means the path is kept.
    ///
    /// Rules written with a trailing `/` only match when `is_dir` is set.
    #[must_use]
    pub fn allows(&self, path: &Path, is_dir: bool) -> bool {
        match self.rules.iter().find(|rule| rule.matches(path, is_dir)) {
            Some(rule) => {
                trace_filter!(
                    "{} {} (rule {} {})",
                    rule.action,
                    path.display(),
                    rule.action.sign(),
                    rule.pattern
                );
                rule.action == FilterAction::Include
            }
            None => true,
        }
    }
}
