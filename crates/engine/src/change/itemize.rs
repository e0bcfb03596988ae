//! The `--itemize-changes` code: `YXcstpoguax`.
//!
//! - `Y` update kind: `<` sent, `>` received, `c` local change, `.` unchanged,
//!   `*` message.
//! - `X` entry type: `f` file, `d` directory, `L` symlink, `D` device,
//!   `S` special.
//! - `c s t p o g` attribute flags, `.` when unchanged. New entries show `+`
//!   in every attribute position.
//! - `u a x` are reserved and always `.`.
//!
//! Deletions replace the grid with the message `*deleting`.
//!
//! ```
//! use engine::{AttributeChanges, ChangeRecord, EntryKind};
//! use engine::change::itemize::classify;
//!
//! let record = ChangeRecord::updated(
//!     "notes.txt",
//!     EntryKind::File,
//!     AttributeChanges::none().with_size(true).with_time(true),
//! );
//! assert_eq!(classify(&record), ">f.st......");
//! ```

use std::fmt::Write as _;

use super::ChangeRecord;

/// Width of the change code.
pub const ITEMIZE_WIDTH: usize = 11;

const DELETION_MESSAGE: &str = "*deleting";

/// Formats the change code of `record`.
#[must_use]
pub fn classify(record: &ChangeRecord) -> String {
    if record.is_deletion() {
        return format!("{DELETION_MESSAGE:<ITEMIZE_WIDTH$}");
    }

    let mut code = String::with_capacity(ITEMIZE_WIDTH);
    code.push(record.update().glyph());
    code.push(char::from(record.kind().code()));

    if record.is_created() {
        code.push_str("+++++++++");
        return code;
    }

    let changes = record.changes();
    code.push(flag(changes.checksum(), 'c'));
    code.push(flag(changes.size(), 's'));
    code.push(flag(changes.time(), 't'));
    code.push(flag(changes.perms(), 'p'));
    code.push(flag(changes.owner(), 'o'));
    code.push(flag(changes.group(), 'g'));
    code.push_str("...");
    code
}

/// Formats the full output line: the change code, a space and the path.
/// Directories carry a trailing `/`.
#[must_use]
pub fn render(record: &ChangeRecord) -> String {
    let mut line = classify(record);
    line.push(' ');
    let _ = write!(line, "{}", record.path().display());
    if record.kind().is_dir() && !line.ends_with('/') {
        line.push('/');
    }
    line
}

const fn flag(set: bool, glyph: char) -> char {
    if set { glyph } else { '.' }
}
