//! crates/logging/src/config.rs
//! Verbosity configuration derived from the `-v` count.

/// Combined verbosity configuration for the dsync tracing targets.
#[derive(Clone, Copy, Default, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    level: u8,
}

impl VerbosityConfig {
    /// Create a new configuration from a verbose level (0-4).
    ///
    /// Levels above 4 behave like 4.
    #[must_use]
    pub const fn from_verbose_level(level: u8) -> Self {
        Self { level }
    }

    /// Returns the verbose level this configuration was built from.
    #[must_use]
    pub const fn level(self) -> u8 {
        self.level
    }

    /// Returns the `EnvFilter` directive matching the verbose level.
    #[must_use]
    pub fn directive(self) -> &'static str {
        match self.level {
            0 => "warn",
            1 => "info",
            2 => "info,dsync::delta=debug,dsync::flist=debug,dsync::filter=debug",
            3 => "debug",
            _ => "trace",
        }
    }

    /// Reports whether per-file copy and deletion events are visible.
    #[must_use]
    pub const fn shows_copy_events(self) -> bool {
        self.level >= 1
    }
}
