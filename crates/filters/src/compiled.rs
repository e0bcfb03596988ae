use std::collections::BTreeSet;
use std::path::Path;

use globset::{GlobBuilder, GlobMatcher};

use crate::{FilterAction, FilterError, FilterRule};

/// A [`FilterRule`] expanded into glob matchers.
#[derive(Clone, Debug)]
pub(crate) struct CompiledRule {
    pub(crate) action: FilterAction,
    pub(crate) pattern: String,
    directory_only: bool,
    direct_matchers: Vec<GlobMatcher>,
    descendant_matchers: Vec<GlobMatcher>,
}

impl CompiledRule {
    pub(crate) fn new(rule: FilterRule) -> Result<Self, FilterError> {
        let (anchored, directory_only, core) = normalise_pattern(&rule.pattern);

        let mut direct = BTreeSet::new();
        direct.insert(core.to_owned());
        if !anchored {
            direct.insert(format!("**/{core}"));
        }

        // Excluding a directory prunes everything below it.
        let mut descendant = BTreeSet::new();
        if rule.action == FilterAction::Exclude {
            descendant.insert(format!("{core}/**"));
            if !anchored {
                descendant.insert(format!("**/{core}/**"));
            }
        }

        Ok(Self {
            action: rule.action,
            directory_only,
            direct_matchers: compile_patterns(direct, &rule.pattern)?,
            descendant_matchers: compile_patterns(descendant, &rule.pattern)?,
            pattern: rule.pattern,
        })
    }

    pub(crate) fn matches(&self, path: &Path, is_dir: bool) -> bool {
        let direct = (!self.directory_only || is_dir)
            && self.direct_matchers.iter().any(|m| m.is_match(path));
        direct || self.descendant_matchers.iter().any(|m| m.is_match(path))
    }
}

fn compile_patterns(
    patterns: BTreeSet<String>,
    original: &str,
) -> Result<Vec<GlobMatcher>, FilterError> {
    patterns
        .into_iter()
        .map(|pattern| {
            GlobBuilder::new(&pattern)
                .literal_separator(true)
                .backslash_escape(true)
                .build()
                .map(|glob| glob.compile_matcher())
                .map_err(|source| FilterError::InvalidPattern {
                    pattern: original.to_owned(),
                    source,
                })
        })
        .collect()
}

fn normalise_pattern(pattern: &str) -> (bool, bool, &str) {
    let anchored = pattern.starts_with('/');
    let directory_only = pattern.len() > 1 && pattern.ends_with('/');
    let mut core = pattern;
    if anchored {
        core = &core[1..];
    }
    if directory_only {
        core = &core[..core.len() - 1];
    }
    (anchored, directory_only, core)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalise_strips_anchor_and_trailing_slash() {
        assert_eq!(normalise_pattern("/build/"), (true, true, "build"));
        assert_eq!(normalise_pattern("*.o"), (false, false, "*.o"));
        assert_eq!(normalise_pattern("cache/"), (false, true, "cache"));
    }

    #[test]
    fn directory_only_rule_ignores_files_with_same_name() {
        let rule = CompiledRule::new(FilterRule::exclude("cache/")).expect("compiles");
        assert!(rule.matches(Path::new("cache"), true));
        assert!(!rule.matches(Path::new("cache"), false));
        assert!(rule.matches(Path::new("cache/blob"), false));
    }

    #[test]
    fn include_rule_does_not_cover_children() {
        for pattern in ["docs", "docs/"] {
            let rule = CompiledRule::new(FilterRule::include(pattern)).expect("compiles");
            assert!(rule.matches(Path::new("docs"), true));
            assert!(!rule.matches(Path::new("docs/readme"), false));
        }
    }

    #[test]
    fn invalid_glob_reports_original_pattern() {
        let error = CompiledRule::new(FilterRule::exclude("/[bad")).expect_err("invalid");
        assert_eq!(error.pattern(), "/[bad");
    }
}
