//! The logging macros emit events under fixed `dsync::` targets and levels.

use std::sync::{Arc, Mutex};

use logging::{
    VerbosityConfig, build_filter, trace_copy, trace_del, trace_delta, trace_filter, trace_flist,
    trace_io, trace_stats, warn_entry,
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<(String, Level)>>>,
}

impl<S: Subscriber> Layer<S> for Recorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        self.events
            .lock()
            .expect("recorder lock")
            .push((metadata.target().to_owned(), *metadata.level()));
    }
}

fn record_with(config: VerbosityConfig, emit: impl FnOnce()) -> Vec<(String, Level)> {
    let recorder = Recorder::default();
    let subscriber = tracing_subscriber::registry()
        .with(build_filter(config, None))
        .with(recorder.clone());
    tracing::subscriber::with_default(subscriber, emit);
    let events = recorder.events.lock().expect("recorder lock").clone();
    events
}

fn emit_all() {
    trace_copy!("copy");
    trace_del!("delete");
    trace_stats!("stats");
    trace_flist!("flist");
    trace_delta!("delta");
    trace_filter!("filter");
    trace_io!("io");
    warn_entry!("entry failed");
}

#[test]
fn every_macro_uses_its_target() {
    let events = record_with(VerbosityConfig::from_verbose_level(4), emit_all);
    let targets: Vec<&str> = events.iter().map(|(target, _)| target.as_str()).collect();
    assert_eq!(
        targets,
        [
            "dsync::copy",
            "dsync::delete",
            "dsync::stats",
            "dsync::flist",
            "dsync::delta",
            "dsync::filter",
            "dsync::io",
            "dsync::entry",
        ]
    );
}

#[test]
fn quiet_level_keeps_only_warnings() {
    let events = record_with(VerbosityConfig::default(), emit_all);
    assert_eq!(events, [("dsync::entry".to_owned(), Level::WARN)]);
}

#[test]
fn level_one_shows_copy_and_delete_events() {
    let events = record_with(VerbosityConfig::from_verbose_level(1), emit_all);
    let targets: Vec<&str> = events.iter().map(|(target, _)| target.as_str()).collect();
    assert_eq!(
        targets,
        ["dsync::copy", "dsync::delete", "dsync::stats", "dsync::entry"]
    );
}

#[test]
fn level_two_adds_delta_and_file_list_debugging() {
    let events = record_with(VerbosityConfig::from_verbose_level(2), emit_all);
    assert!(events.iter().any(|(target, _)| target == "dsync::delta"));
    assert!(events.iter().any(|(target, _)| target == "dsync::flist"));
    assert!(!events.iter().any(|(target, _)| target == "dsync::io"));
}
