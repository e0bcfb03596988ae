use clap::{Arg, ArgAction, Command as ClapCommand, builder::OsStringValueParser, value_parser};

pub(crate) const PROGRAM_NAME: &str = "dsync";

/// Builds the `clap` command used for parsing.
pub(crate) fn clap_command() -> ClapCommand {
    ClapCommand::new(PROGRAM_NAME)
        .about("Synchronise a destination directory from one or more sources using delta transfer.")
        .override_usage("dsync [OPTION]... SOURCE... DEST")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .long("help")
                .help("Show this help message and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .short('V')
                .help("Output version information and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase verbosity; may be repeated.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Suppress non-error messages.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("human-readable")
                .long("human-readable")
                .short('h')
                .help("Output sizes in units of 1000; repeat for units of 1024.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("checksum")
                .long("checksum")
                .short('c')
                .help("Skip files based on whole-file checksums, not size and modification time.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("size-only")
                .long("size-only")
                .help("Skip files that match in size.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("update")
                .long("update")
                .short('u')
                .help("Skip files that are newer on the receiver.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("whole-file")
                .long("whole-file")
                .short('W')
                .help("Copy files whole, without the delta-transfer algorithm.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ignore-times")
                .long("ignore-times")
                .short('I')
                .help("Don't skip files that match size and time.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("modify-window")
                .long("modify-window")
                .value_name("SECS")
                .help("Treat modification times within SECS seconds as equal.")
                .num_args(1)
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("delete")
                .long("delete")
                .help("Delete extraneous files from the destination.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("delete-before")
                .long("delete-before")
                .help("Receiver deletes before transferring.")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["delete-during", "delete-after"]),
        )
        .arg(
            Arg::new("delete-during")
                .long("delete-during")
                .help("Receiver deletes while transferring.")
                .action(ArgAction::SetTrue)
                .conflicts_with("delete-after"),
        )
        .arg(
            Arg::new("delete-after")
                .long("delete-after")
                .help("Receiver deletes after transferring.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .short('n')
                .help("Perform a trial run with no changes made.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("inplace")
                .long("inplace")
                .help("Update destination files in place.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("checksum-choice")
                .long("checksum-choice")
                .value_name("NAME")
                .help("Choose the strong checksum algorithm (md4, md5, sha256, xxh64, xxh3, xxh128, auto).")
                .num_args(1),
        )
        .arg(
            Arg::new("compress-choice")
                .long("compress-choice")
                .value_name("NAME")
                .help("Choose the compression algorithm (none, zlib, zstd, lz4, auto).")
                .num_args(1),
        )
        .arg(
            Arg::new("block-size")
                .long("block-size")
                .short('B')
                .value_name("SIZE")
                .help("Force a fixed checksum block size.")
                .num_args(1)
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("bwlimit")
                .long("bwlimit")
                .value_name("RATE")
                .help("Limit I/O bandwidth; KiB/s unless a K, M or G suffix is given (0 disables).")
                .num_args(1)
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .value_name("N")
                .help("Number of parallel transfer workers.")
                .num_args(1)
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("itemize-changes")
                .long("itemize-changes")
                .short('i')
                .help("Output a change summary for each entry.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Give some file-transfer stats.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .long("exclude")
                .value_name("PATTERN")
                .help("Exclude files matching PATTERN.")
                .num_args(1)
                .action(ArgAction::Append)
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("include")
                .long("include")
                .value_name("PATTERN")
                .help("Don't exclude files matching PATTERN.")
                .num_args(1)
                .action(ArgAction::Append)
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("exclude-from")
                .long("exclude-from")
                .value_name("FILE")
                .help("Read exclude patterns from FILE.")
                .num_args(1)
                .action(ArgAction::Append)
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("include-from")
                .long("include-from")
                .value_name("FILE")
                .help("Read include patterns from FILE.")
                .num_args(1)
                .action(ArgAction::Append)
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("files-from")
                .long("files-from")
                .value_name("FILE")
                .help("Read the list of source paths to transfer from FILE.")
                .num_args(1)
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("filter")
                .long("filter")
                .short('f')
                .value_name("RULE")
                .help("Add a file-filtering RULE ('+ PATTERN' or '- PATTERN').")
                .num_args(1)
                .action(ArgAction::Append)
                .allow_hyphen_values(true)
                .value_parser(OsStringValueParser::new()),
        )
        .arg(
            Arg::new("args")
                .value_name("PATH")
                .num_args(0..)
                .action(ArgAction::Append)
                .value_parser(OsStringValueParser::new()),
        )
}
