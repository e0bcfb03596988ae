//! Utilities for turning the filter-related CLI arguments into a
//! [`FilterSet`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::ArgMatches;
use engine::{EntryKind, SyncError};
use filters::{
    FilterAction, FilterPredicate, FilterRule, FilterSet, FilterVerdict, PathList,
    read_pattern_file,
};

pub(crate) fn os_string_to_pattern(value: OsString) -> String {
    match value.into_string() {
        Ok(text) => text,
        Err(value) => value.to_string_lossy().into_owned(),
    }
}

/// One filter-related argument, kept in command-line order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum FilterArgument {
    Exclude(String),
    Include(String),
    ExcludeFrom(PathBuf),
    IncludeFrom(PathBuf),
    Rule(String),
}

impl FilterArgument {
    /// Removes every filter argument from `matches` and returns them in the
    /// order they appeared, which is the order rules are evaluated in.
    pub(crate) fn collect_in_order(matches: &mut ArgMatches) -> Vec<Self> {
        let mut positioned = Vec::new();
        take(matches, "exclude", &mut positioned, |value| {
            Self::Exclude(os_string_to_pattern(value))
        });
        take(matches, "include", &mut positioned, |value| {
            Self::Include(os_string_to_pattern(value))
        });
        take(matches, "exclude-from", &mut positioned, |value| {
            Self::ExcludeFrom(PathBuf::from(value))
        });
        take(matches, "include-from", &mut positioned, |value| {
            Self::IncludeFrom(PathBuf::from(value))
        });
        take(matches, "filter", &mut positioned, |value| {
            Self::Rule(os_string_to_pattern(value))
        });
        positioned.sort_by_key(|(index, _)| *index);
        positioned.into_iter().map(|(_, argument)| argument).collect()
    }
}

fn take(
    matches: &mut ArgMatches,
    id: &str,
    into: &mut Vec<(usize, FilterArgument)>,
    build: impl Fn(OsString) -> FilterArgument,
) {
    let indices: Vec<usize> = matches
        .indices_of(id)
        .map(Iterator::collect)
        .unwrap_or_default();
    let values = matches.remove_many::<OsString>(id).into_iter().flatten();
    into.extend(indices.into_iter().zip(values.map(build)));
}

/// Compiles the arguments into a filter set. Unreadable pattern files and
/// malformed rules are configuration errors.
pub(crate) fn build_filter_set(arguments: &[FilterArgument]) -> Result<FilterSet, SyncError> {
    let mut rules = Vec::new();
    for argument in arguments {
        match argument {
            FilterArgument::Exclude(pattern) => rules.push(FilterRule::exclude(pattern.as_str())),
            FilterArgument::Include(pattern) => rules.push(FilterRule::include(pattern.as_str())),
            FilterArgument::ExcludeFrom(path) => rules.extend(
                read_pattern_file(path, FilterAction::Exclude)
                    .map_err(|error| SyncError::configuration(error.to_string()))?,
            ),
            FilterArgument::IncludeFrom(path) => rules.extend(
                read_pattern_file(path, FilterAction::Include)
                    .map_err(|error| SyncError::configuration(error.to_string()))?,
            ),
            FilterArgument::Rule(text) => rules.push(
                text.parse::<FilterRule>()
                    .map_err(|error| SyncError::configuration(error.to_string()))?,
            ),
        }
    }
    FilterSet::from_rules(rules).map_err(|error| SyncError::configuration(error.to_string()))
}

/// Filter rules, optionally narrowed to the paths named by `--files-from`.
#[derive(Debug, Default)]
pub(crate) struct TransferFilter {
    rules: FilterSet,
    files_from: Option<PathList>,
}

impl TransferFilter {
    /// Compiles the filter arguments and loads the `--files-from` list. An
    /// unreadable list is a configuration error.
    pub(crate) fn build(
        arguments: &[FilterArgument],
        files_from: Option<&Path>,
    ) -> Result<Self, SyncError> {
        let rules = build_filter_set(arguments)?;
        let files_from = files_from
            .map(PathList::read)
            .transpose()
            .map_err(|error| SyncError::configuration(error.to_string()))?;
        Ok(Self { rules, files_from })
    }
}

impl FilterPredicate for TransferFilter {
    fn decide(&self, relative: &Path, kind: EntryKind) -> FilterVerdict {
        match &self.files_from {
            Some(list) if !list.admits(relative, kind.is_dir()) => FilterVerdict::Exclude,
            _ => self.rules.decide(relative, kind),
        }
    }
}
