use thiserror::Error;

/// A window that cannot be slid.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum RollingError {
    /// Rolling needs at least one byte in the window.
    #[error("cannot roll an empty checksum window")]
    EmptyWindow,
    /// The window length does not fit the 32-bit multiplier.
    #[error("checksum window of {len} bytes is too long to roll")]
    WindowTooLarge {
        /// Window length in bytes.
        len: usize,
    },
}
