mod arguments;
mod command_builder;
mod filter_rules;
mod itemize;
pub mod stats_format;

#[cfg(test)]
mod tests;

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bandwidth::parse_bandwidth_limit;
use checksums::ChecksumChoice;
use engine::{
    CONFIGURATION_EXIT_CODE, CompressChoice, FILE_IO_EXIT_CODE, StatsAggregator, SyncError,
    SyncOptions, SyncSession,
};
use logging::{VerbosityConfig, init_tracing};

use arguments::{ParsedArgs, parse_args};
use command_builder::{PROGRAM_NAME, clap_command};
use filter_rules::TransferFilter;
use itemize::{ConsoleObserver, OutputMode};
use stats_format::{HumanReadable, StatsData, StatsFormatter};

/// Maximum exit code representable by a Unix process.
const MAX_EXIT_CODE: i32 = u8::MAX as i32;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parses `arguments`, runs the requested synchronisation and returns the
/// process exit code.
///
/// Itemized changes and statistics are written to `stdout`; diagnostics to
/// `stderr`.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    match parse_args(args) {
        Ok(parsed) => execute(parsed, stdout, stderr),
        Err(error) => {
            let _ = write!(stderr, "{}", error.render());
            CONFIGURATION_EXIT_CODE
        }
    }
}

/// Converts a numeric exit code into an [`std::process::ExitCode`].
#[must_use]
pub fn exit_code_from(status: i32) -> std::process::ExitCode {
    let clamped = status.clamp(0, MAX_EXIT_CODE);
    std::process::ExitCode::from(clamped as u8)
}

fn execute<Out, Err>(parsed: ParsedArgs, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    if parsed.show_help {
        return match write!(stdout, "{}", clap_command().render_help()) {
            Ok(()) => 0,
            Err(_) => FILE_IO_EXIT_CODE,
        };
    }
    if parsed.show_version {
        return match writeln!(stdout, "{PROGRAM_NAME} {VERSION}") {
            Ok(()) => 0,
            Err(_) => FILE_IO_EXIT_CODE,
        };
    }

    let verbosity = if parsed.quiet { 0 } else { parsed.verbosity };
    init_tracing(VerbosityConfig::from_verbose_level(verbosity));
    let request = match TransferRequest::from_args(parsed) {
        Ok(request) => request,
        Err(error) => return report_error(stderr, &error),
    };
    tracing::debug!(
        target: "dsync::cli",
        sources = request.sources.len(),
        destination = %request.destination.display(),
        "starting run"
    );

    let session = SyncSession::new(request.options, Arc::new(StatsAggregator::new()), None);
    let mut observer = ConsoleObserver::new(request.output, stdout, stderr);
    let result = session.run(
        &request.sources,
        &request.destination,
        &request.filters,
        &mut observer,
    );
    let write_error = observer.into_write_error();

    let summary = match result {
        Ok(summary) => summary,
        Err(error) => return report_error(stderr, &error),
    };
    if let Some(error) = write_error {
        let _ = writeln!(stderr, "dsync error: cannot write output: {error} (code {FILE_IO_EXIT_CODE})");
        return FILE_IO_EXIT_CODE;
    }
    if request.show_stats {
        let formatter = StatsFormatter::new(StatsData::from_summary(&summary))
            .human_readable(request.human_readable);
        if writeln!(stdout, "\n{formatter}").is_err() {
            return FILE_IO_EXIT_CODE;
        }
    }
    if summary.has_failures() {
        let _ = writeln!(
            stderr,
            "dsync error: some files could not be transferred (code {})",
            summary.exit_code()
        );
    }
    summary.exit_code()
}

fn report_error<Err: Write>(stderr: &mut Err, error: &SyncError) -> i32 {
    let code = error.exit_code();
    let _ = writeln!(stderr, "dsync error: {error} (code {code})");
    code
}

/// Everything one run needs, validated.
struct TransferRequest {
    options: SyncOptions,
    filters: TransferFilter,
    sources: Vec<PathBuf>,
    destination: PathBuf,
    output: OutputMode,
    show_stats: bool,
    human_readable: HumanReadable,
}

impl TransferRequest {
    fn from_args(args: ParsedArgs) -> Result<Self, SyncError> {
        let mut operands: Vec<PathBuf> = args.operands.into_iter().map(PathBuf::from).collect();
        let destination = match operands.pop() {
            Some(destination) if !operands.is_empty() => destination,
            _ => {
                return Err(SyncError::configuration(format!(
                    "a source and a destination are required; usage: {PROGRAM_NAME} [OPTION]... SOURCE... DEST"
                )));
            }
        };

        let checksum_choice = args
            .checksum_choice
            .as_deref()
            .map(str::parse::<ChecksumChoice>)
            .transpose()
            .map_err(|error| SyncError::configuration(format!("--checksum-choice: {error}")))?
            .unwrap_or_default();
        let compress_choice = args
            .compress_choice
            .as_deref()
            .map(str::parse::<CompressChoice>)
            .transpose()
            .map_err(|error| SyncError::configuration(format!("--compress-choice: {error}")))?
            .unwrap_or_default();
        let bandwidth_limit = match &args.bwlimit {
            Some(value) => parse_bandwidth_limit(&value.to_string_lossy()).map_err(|error| {
                SyncError::configuration(format!(
                    "--bwlimit={}: {error}",
                    value.to_string_lossy()
                ))
            })?,
            None => None,
        };

        let mut builder = SyncOptions::builder()
            .checksum(args.checksum)
            .size_only(args.size_only)
            .update(args.update)
            .whole_file(args.whole_file)
            .ignore_times(args.ignore_times)
            .modify_window(Duration::from_secs(args.modify_window.unwrap_or(0)))
            .dry_run(args.dry_run)
            .in_place(args.in_place)
            .checksum_choice(checksum_choice)
            .compress_choice(compress_choice)
            .block_size(args.block_size)
            .bandwidth_limit(bandwidth_limit)
            .workers(args.workers)
            .itemize(args.itemize)
            .stats(args.stats);
        if let Some(timing) = args.delete {
            builder = builder.delete(true).delete_timing(timing);
        }
        let options = builder.build().map_err(SyncError::options)?;
        let filters = TransferFilter::build(&args.filters, args.files_from.as_deref())?;

        Ok(Self {
            options,
            filters,
            sources: operands,
            destination,
            output: OutputMode::select(args.itemize, args.verbosity, args.quiet),
            show_stats: args.stats,
            human_readable: HumanReadable::from_level(args.human_readable),
        })
    }
}
