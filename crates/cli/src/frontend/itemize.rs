use std::io::{self, Write};
use std::path::Path;

use engine::change::itemize::render;
use engine::{ChangeRecord, SyncError, SyncObserver, UpdateKind};

/// What is printed for each entry on standard output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum OutputMode {
    /// `--itemize-changes`: change code and path for every entry.
    Itemize,
    /// `-v` without `-i`: names of changed entries only.
    Names,
    Quiet,
}

impl OutputMode {
    /// `-q` silences per-entry output whatever else was asked for.
    pub(crate) const fn select(itemize: bool, verbosity: u8, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if itemize {
            Self::Itemize
        } else if verbosity > 0 {
            Self::Names
        } else {
            Self::Quiet
        }
    }
}

/// Writes run events to the console as they arrive.
pub(crate) struct ConsoleObserver<'a> {
    mode: OutputMode,
    stdout: &'a mut dyn Write,
    stderr: &'a mut dyn Write,
    write_error: Option<io::Error>,
}

impl<'a> ConsoleObserver<'a> {
    pub(crate) fn new(mode: OutputMode, stdout: &'a mut dyn Write, stderr: &'a mut dyn Write) -> Self {
        Self {
            mode,
            stdout,
            stderr,
            write_error: None,
        }
    }

    /// First error hit while writing to standard output, if any.
    pub(crate) fn into_write_error(self) -> Option<io::Error> {
        self.write_error
    }

    fn line(record: &ChangeRecord, mode: OutputMode) -> Option<String> {
        match mode {
            OutputMode::Itemize => Some(render(record)),
            OutputMode::Names if record.is_deletion() => {
                Some(format!("deleting {}", record.path().display()))
            }
            OutputMode::Names if record.update() != UpdateKind::Unchanged => {
                let suffix = if record.kind().is_dir() { "/" } else { "" };
                Some(format!("{}{suffix}", record.path().display()))
            }
            OutputMode::Names | OutputMode::Quiet => None,
        }
    }
}

impl SyncObserver for ConsoleObserver<'_> {
    fn on_itemize(&mut self, record: &ChangeRecord) {
        if self.write_error.is_some() {
            return;
        }
        if let Some(line) = Self::line(record, self.mode)
            && let Err(error) = writeln!(self.stdout, "{line}")
        {
            self.write_error = Some(error);
        }
    }

    fn on_entry_error(&mut self, _path: &Path, error: &SyncError) {
        let _ = writeln!(self.stderr, "dsync: {error}");
    }
}
