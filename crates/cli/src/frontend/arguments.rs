use std::ffi::OsString;
use std::path::PathBuf;

use clap::ArgMatches;
use engine::DeleteTiming;

use super::command_builder::clap_command;
use super::filter_rules::FilterArgument;

/// Command-line arguments after `clap` has validated their shape.
///
/// Values whose meaning is checked later (algorithm names, the bandwidth
/// limit, pattern files) are kept as given.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct ParsedArgs {
    pub(crate) show_help: bool,
    pub(crate) show_version: bool,
    pub(crate) verbosity: u8,
    pub(crate) quiet: bool,
    pub(crate) human_readable: u8,
    pub(crate) checksum: bool,
    pub(crate) size_only: bool,
    pub(crate) update: bool,
    pub(crate) whole_file: bool,
    pub(crate) ignore_times: bool,
    pub(crate) modify_window: Option<u64>,
    pub(crate) delete: Option<DeleteTiming>,
    pub(crate) dry_run: bool,
    pub(crate) in_place: bool,
    pub(crate) checksum_choice: Option<String>,
    pub(crate) compress_choice: Option<String>,
    pub(crate) block_size: Option<u32>,
    pub(crate) bwlimit: Option<OsString>,
    pub(crate) workers: Option<usize>,
    pub(crate) itemize: bool,
    pub(crate) stats: bool,
    pub(crate) filters: Vec<FilterArgument>,
    pub(crate) files_from: Option<PathBuf>,
    pub(crate) operands: Vec<OsString>,
}

pub(crate) fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let mut matches = clap_command().try_get_matches_from(arguments)?;

    let delete = delete_timing(&matches);
    let filters = FilterArgument::collect_in_order(&mut matches);

    Ok(ParsedArgs {
        show_help: matches.get_flag("help"),
        show_version: matches.get_flag("version"),
        verbosity: matches.get_count("verbose"),
        quiet: matches.get_flag("quiet"),
        human_readable: matches.get_count("human-readable"),
        checksum: matches.get_flag("checksum"),
        size_only: matches.get_flag("size-only"),
        update: matches.get_flag("update"),
        whole_file: matches.get_flag("whole-file"),
        ignore_times: matches.get_flag("ignore-times"),
        modify_window: matches.remove_one::<u64>("modify-window"),
        delete,
        dry_run: matches.get_flag("dry-run"),
        in_place: matches.get_flag("inplace"),
        checksum_choice: matches.remove_one::<String>("checksum-choice"),
        compress_choice: matches.remove_one::<String>("compress-choice"),
        block_size: matches.remove_one::<u32>("block-size"),
        bwlimit: matches.remove_one::<OsString>("bwlimit"),
        workers: matches.remove_one::<usize>("workers"),
        itemize: matches.get_flag("itemize-changes"),
        stats: matches.get_flag("stats"),
        filters,
        files_from: matches.remove_one::<OsString>("files-from").map(PathBuf::from),
        operands: matches
            .remove_many::<OsString>("args")
            .map(Iterator::collect)
            .unwrap_or_default(),
    })
}

/// Any of the timing flags enables deletion on its own.
fn delete_timing(matches: &ArgMatches) -> Option<DeleteTiming> {
    if matches.get_flag("delete-before") {
        Some(DeleteTiming::Before)
    } else if matches.get_flag("delete-during") {
        Some(DeleteTiming::During)
    } else if matches.get_flag("delete-after") || matches.get_flag("delete") {
        Some(DeleteTiming::After)
    } else {
        None
    }
}
