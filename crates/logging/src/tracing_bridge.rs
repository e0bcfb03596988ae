//! crates/logging/src/tracing_bridge.rs
//! Installation of the process-wide tracing subscriber.
//!
//! The verbosity level picks a default filter directive. When the
//! [`LOG_ENV_VAR`] environment variable is set it replaces that directive
//! entirely, which makes it possible to enable a single target such as
//! `dsync::delta=trace` without raising the global level.
//!
//! ```rust,ignore
//! use logging::{VerbosityConfig, init_tracing};
//!
//! init_tracing(VerbosityConfig::from_verbose_level(2));
//! tracing::debug!(target: "dsync::delta", "computing delta");
//! ```

use super::config::VerbosityConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable consulted for an explicit filter directive.
pub const LOG_ENV_VAR: &str = "DSYNC_LOG";

/// Builds the filter used by [`init_tracing`].
///
/// `override_directive` takes precedence over the verbosity-derived directive.
/// An override that fails to parse falls back to the verbosity directive.
#[must_use]
pub fn build_filter(config: VerbosityConfig, override_directive: Option<&str>) -> EnvFilter {
    if let Some(directive) = override_directive.filter(|text| !text.trim().is_empty())
        && let Ok(filter) = EnvFilter::try_new(directive)
    {
        return filter;
    }
    EnvFilter::new(config.directive())
}

/// Initialize tracing for the current process.
///
/// Events are formatted without timestamps and written to stderr. Repeated
/// calls are harmless: once a global subscriber exists the call is a no-op.
pub fn init_tracing(config: VerbosityConfig) {
    let override_directive = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(config, override_directive.as_deref());

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.level() >= 3)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_directive_used_without_override() {
        let filter = build_filter(VerbosityConfig::from_verbose_level(1), None);
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn override_replaces_verbosity_directive() {
        let filter = build_filter(
            VerbosityConfig::from_verbose_level(0),
            Some("dsync::delta=trace"),
        );
        assert_eq!(filter.to_string(), "dsync::delta=trace");
    }

    #[test]
    fn blank_override_is_ignored() {
        let filter = build_filter(VerbosityConfig::from_verbose_level(3), Some("   "));
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn init_is_idempotent() {
        init_tracing(VerbosityConfig::default());
        init_tracing(VerbosityConfig::from_verbose_level(2));
    }
}
