//! End-to-end runs of the engine against temporary directory trees.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use engine::{
    CancellationToken, CollectingObserver, DeleteTiming, FILE_IO_EXIT_CODE, RunSummary,
    StatsAggregator, SyncError, SyncErrorKind, SyncOptions, SyncOptionsBuilder, SyncSession,
};
use filters::{FilterRule, FilterSet};
use test_support::{SyncFixture, assert_trees_match, patterned_bytes, set_mtime, write_file};

fn run(
    fixture: &SyncFixture,
    options: SyncOptions,
    filters: &FilterSet,
) -> Result<(RunSummary, CollectingObserver), SyncError> {
    run_roots(&[fixture.source().to_path_buf()], fixture.destination(), options, filters)
}

fn run_roots(
    roots: &[PathBuf],
    destination: &Path,
    options: SyncOptions,
    filters: &FilterSet,
) -> Result<(RunSummary, CollectingObserver), SyncError> {
    let session = SyncSession::new(options, Arc::new(StatsAggregator::new()), None);
    let mut observer = CollectingObserver::new();
    let summary = session.run(roots, destination, filters, &mut observer)?;
    Ok((summary, observer))
}

fn options() -> SyncOptionsBuilder {
    SyncOptions::builder().itemize(true).workers(Some(2))
}

/// Source holds A (unchanged), B (one byte appended) and C (new); the
/// destination additionally holds D.
fn scenario(fixture: &SyncFixture) {
    let a = patterned_bytes(100, 1);
    let b = patterned_bytes(100, 2);
    let mut b_appended = b.clone();
    b_appended.push(b'!');

    set_mtime(&write_file(fixture.source(), "A", &a), 1_000_000);
    set_mtime(&write_file(fixture.destination(), "A", &a), 1_000_000);
    set_mtime(&write_file(fixture.source(), "B", &b_appended), 2_000_000);
    set_mtime(&write_file(fixture.destination(), "B", &b), 1_000_000);
    set_mtime(&write_file(fixture.source(), "C", &patterned_bytes(50, 3)), 1_000_000);
    write_file(fixture.destination(), "D", b"stale");
}

#[test]
fn mixed_tree_reports_every_change() {
    let fixture = SyncFixture::new();
    scenario(&fixture);
    let options = options().delete(true).block_size(Some(100)).build().expect("options");

    let (summary, observer) = run(&fixture, options, &FilterSet::default()).expect("run");

    assert_eq!(
        observer.itemized_lines(),
        [
            ".f......... A",
            ">f.st...... B",
            ">f+++++++++ C",
            "*deleting   D",
        ]
    );
    assert_eq!(observer.deletions, [PathBuf::from("D")]);
    assert!(!fixture.destination().join("D").exists());
    assert_trees_match(fixture.source(), fixture.destination());

    let stats = summary.stats();
    assert_eq!(stats.files_transferred, 2);
    assert_eq!(stats.matched_bytes, 100);
    assert_eq!(stats.literal_bytes, 51);
    assert_eq!(stats.entries_deleted, 1);
    assert_eq!(stats.entries_created, 1);
    assert_eq!(stats.transferred_file_size, 151);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn second_run_transfers_nothing() {
    let fixture = SyncFixture::new();
    scenario(&fixture);
    write_file(fixture.source(), "nested/deep/file.bin", &patterned_bytes(4096, 9));

    run(&fixture, options().delete(true).build().expect("options"), &FilterSet::default())
        .expect("first run");
    let (summary, observer) =
        run(&fixture, options().delete(true).build().expect("options"), &FilterSet::default())
            .expect("second run");

    assert_eq!(summary.stats().files_transferred, 0);
    assert_eq!(summary.stats().literal_bytes, 0);
    assert_eq!(summary.stats().entries_deleted, 0);
    assert!(
        observer
            .itemized_lines()
            .iter()
            .all(|line| line.starts_with('.')),
        "{:?}",
        observer.itemized_lines()
    );
}

#[test]
fn dry_run_matches_real_run_without_touching_destination() {
    let dry = SyncFixture::new();
    scenario(&dry);
    let real = SyncFixture::new();
    scenario(&real);
    let before = test_support::tree_snapshot(dry.destination());

    let build = |dry_run| {
        options()
            .delete(true)
            .dry_run(dry_run)
            .block_size(Some(100))
            .build()
            .expect("options")
    };
    let (dry_summary, dry_observer) = run(&dry, build(true), &FilterSet::default()).expect("dry");
    let (real_summary, real_observer) =
        run(&real, build(false), &FilterSet::default()).expect("real");

    assert_eq!(dry_observer.itemized_lines(), real_observer.itemized_lines());
    assert_eq!(dry_summary.stats(), real_summary.stats());
    assert_eq!(test_support::tree_snapshot(dry.destination()), before);
}

#[test]
fn newer_destination_is_kept_with_update() {
    let fixture = SyncFixture::new();
    set_mtime(&write_file(fixture.source(), "notes", b"old words"), 1_000);
    set_mtime(&write_file(fixture.destination(), "notes", b"newer words!"), 2_000);

    let options = options().update(true).build().expect("options");
    let (summary, _) = run(&fixture, options, &FilterSet::default()).expect("run");

    assert_eq!(summary.stats().files_transferred, 0);
    assert_eq!(
        fs::read(fixture.destination().join("notes")).expect("read"),
        b"newer words!"
    );
}

#[test]
fn nested_deletions_remove_children_first() {
    for timing in [DeleteTiming::Before, DeleteTiming::During, DeleteTiming::After] {
        let fixture = SyncFixture::new();
        write_file(fixture.source(), "keep", b"k");
        write_file(fixture.destination(), "gone/inner/leaf", b"x");
        write_file(fixture.destination(), "gone/top", b"y");

        let options = options().delete(true).delete_timing(timing).build().expect("options");
        let (summary, observer) = run(&fixture, options, &FilterSet::default()).expect("run");

        assert_eq!(
            observer.deletions,
            [
                PathBuf::from("gone/top"),
                PathBuf::from("gone/inner/leaf"),
                PathBuf::from("gone/inner"),
                PathBuf::from("gone"),
            ],
            "{timing}"
        );
        assert_eq!(summary.stats().entries_deleted, 4);
        assert!(!fixture.destination().join("gone").exists());
    }
}

#[test]
fn deletion_disabled_leaves_extra_entries() {
    let fixture = SyncFixture::new();
    write_file(fixture.source(), "a", b"a");
    write_file(fixture.destination(), "extra", b"e");

    let (summary, observer) =
        run(&fixture, options().build().expect("options"), &FilterSet::default()).expect("run");

    assert_eq!(summary.stats().entries_deleted, 0);
    assert!(observer.deletions.is_empty());
    assert!(fixture.destination().join("extra").exists());
}

#[test]
fn excluded_entries_are_neither_copied_nor_deleted() {
    let fixture = SyncFixture::new();
    write_file(fixture.source(), "main.rs", b"fn main() {}");
    write_file(fixture.source(), "target/app", b"binary");
    write_file(fixture.destination(), "scratch.tmp", b"keep me");
    let filters = FilterSet::from_rules([
        FilterRule::exclude("target/"),
        FilterRule::exclude("*.tmp"),
    ])
    .expect("filters");

    run(&fixture, options().delete(true).build().expect("options"), &filters).expect("run");

    assert!(fixture.destination().join("main.rs").exists());
    assert!(!fixture.destination().join("target").exists());
    assert!(fixture.destination().join("scratch.tmp").exists());
}

#[test]
fn later_roots_override_earlier_ones() {
    let fixture = SyncFixture::new();
    let second = fixture.scratch("second");
    write_file(fixture.source(), "shared", b"from first");
    write_file(fixture.source(), "only-first", b"1");
    write_file(&second, "shared", b"from second");

    let roots = [fixture.source().to_path_buf(), second];
    run_roots(
        &roots,
        fixture.destination(),
        options().build().expect("options"),
        &FilterSet::default(),
    )
    .expect("run");

    assert_eq!(
        fs::read(fixture.destination().join("shared")).expect("read"),
        b"from second"
    );
    assert!(fixture.destination().join("only-first").exists());
}

#[test]
fn missing_destination_root_is_created() {
    let fixture = SyncFixture::new();
    write_file(fixture.source(), "dir/file", b"contents");
    let destination = fixture.scratch("fresh/target");

    run_roots(
        &[fixture.source().to_path_buf()],
        &destination,
        options().build().expect("options"),
        &FilterSet::default(),
    )
    .expect("run");

    assert_trees_match(fixture.source(), &destination);
}

#[test]
fn missing_source_root_is_fatal() {
    let fixture = SyncFixture::new();
    let missing = fixture.scratch("does-not-exist");

    let error = run_roots(
        &[missing],
        fixture.destination(),
        options().build().expect("options"),
        &FilterSet::default(),
    )
    .expect_err("missing root");

    assert!(error.is_fatal());
    assert_eq!(error.exit_code(), FILE_IO_EXIT_CODE);
}

#[test]
fn cancelled_token_stops_the_run() {
    let fixture = SyncFixture::new();
    write_file(fixture.source(), "file", b"data");
    let token = CancellationToken::new();
    token.cancel();

    let session = SyncSession::new(
        options().build().expect("options"),
        Arc::new(StatsAggregator::new()),
        None,
    )
    .with_cancellation(token);
    let error = session
        .run(
            &[fixture.source().to_path_buf()],
            fixture.destination(),
            &FilterSet::default(),
            &mut CollectingObserver::new(),
        )
        .expect_err("cancelled");

    assert!(matches!(error.kind(), SyncErrorKind::Cancelled));
    assert!(!fixture.destination().join("file").exists());
}

#[test]
fn whole_file_mode_sends_only_literals() {
    let fixture = SyncFixture::new();
    let content = patterned_bytes(8192, 4);
    let mut changed = content.clone();
    changed[4000] ^= 0xFF;
    set_mtime(&write_file(fixture.source(), "big", &changed), 10);
    set_mtime(&write_file(fixture.destination(), "big", &content), 20);

    let options = options().whole_file(true).build().expect("options");
    let (summary, _) = run(&fixture, options, &FilterSet::default()).expect("run");

    assert_eq!(summary.stats().matched_bytes, 0);
    assert_eq!(summary.stats().literal_bytes, 8192);
    assert_trees_match(fixture.source(), fixture.destination());
}

#[test]
fn checksum_mode_finds_same_size_changes() {
    let fixture = SyncFixture::new();
    set_mtime(&write_file(fixture.source(), "f", b"aaaa"), 500);
    set_mtime(&write_file(fixture.destination(), "f", b"bbbb"), 500);

    let quick = run(&fixture, options().build().expect("options"), &FilterSet::default())
        .expect("quick check");
    assert_eq!(quick.0.stats().files_transferred, 0);

    let options = options().checksum(true).build().expect("options");
    let (summary, observer) = run(&fixture, options, &FilterSet::default()).expect("checksum");
    assert_eq!(summary.stats().files_transferred, 1);
    assert_eq!(observer.itemized_lines(), [">fc........ f"]);
    assert_eq!(fs::read(fixture.destination().join("f")).expect("read"), b"aaaa");
}

#[test]
fn directories_report_with_trailing_slash() {
    let fixture = SyncFixture::new();
    write_file(fixture.source(), "sub/file", b"1");

    let (summary, observer) =
        run(&fixture, options().build().expect("options"), &FilterSet::default()).expect("run");

    assert_eq!(observer.itemized_lines(), ["cd+++++++++ sub/", ">f+++++++++ sub/file"]);
    assert_eq!(summary.stats().entries_created, 2);
}

#[cfg(unix)]
#[test]
fn symlinks_are_recreated_and_retargeted() {
    use std::os::unix::fs::symlink;

    let fixture = SyncFixture::new();
    symlink("target-one", fixture.source().join("link")).expect("source link");

    let (_, first) =
        run(&fixture, options().build().expect("options"), &FilterSet::default()).expect("create");
    assert_eq!(first.itemized_lines(), ["cL+++++++++ link"]);
    assert_eq!(
        fs::read_link(fixture.destination().join("link")).expect("link"),
        Path::new("target-one")
    );

    fs::remove_file(fixture.source().join("link")).expect("remove");
    symlink("target-two", fixture.source().join("link")).expect("retarget");
    let (_, second) =
        run(&fixture, options().build().expect("options"), &FilterSet::default()).expect("update");
    assert_eq!(second.itemized_lines(), ["cLc........ link"]);
    assert_eq!(
        fs::read_link(fixture.destination().join("link")).expect("link"),
        Path::new("target-two")
    );
}

#[test]
fn file_replaces_directory_of_same_name() {
    let fixture = SyncFixture::new();
    write_file(fixture.source(), "slot", b"now a file");
    write_file(fixture.destination(), "slot/inner", b"old");

    let (summary, _) =
        run(&fixture, options().delete(true).build().expect("options"), &FilterSet::default())
            .expect("run");

    assert_eq!(summary.exit_code(), 0);
    assert_eq!(
        fs::read(fixture.destination().join("slot")).expect("read"),
        b"now a file"
    );
}

#[test]
fn transport_accounting_includes_file_list_and_signatures() {
    let fixture = SyncFixture::new();
    let content = patterned_bytes(4096, 11);
    let mut changed = content.clone();
    changed.extend_from_slice(b"tail");
    set_mtime(&write_file(fixture.source(), "grow", &changed), 50);
    set_mtime(&write_file(fixture.destination(), "grow", &content), 40);

    let (summary, _) =
        run(&fixture, options().build().expect("options"), &FilterSet::default()).expect("run");
    let stats = summary.stats();

    assert!(stats.file_list_size > 0);
    assert!(stats.bytes_sent >= stats.literal_bytes + stats.file_list_size);
    assert!(stats.bytes_received > 0);
    assert!(stats.speedup() > 1.0, "speedup {}", stats.speedup());
}

#[test]
fn in_place_updates_existing_file() {
    let fixture = SyncFixture::new();
    let content = patterned_bytes(2048, 5);
    let mut changed = content.clone();
    changed.truncate(1500);
    set_mtime(&write_file(fixture.source(), "f", &changed), 70);
    set_mtime(&write_file(fixture.destination(), "f", &content), 60);

    let options = options().in_place(true).build().expect("options");
    run(&fixture, options, &FilterSet::default()).expect("run");

    assert_trees_match(fixture.source(), fixture.destination());
}

/// Makes `dir` unlistable. Returns `false`, restoring the mode, when the
/// process can read it regardless, as it can when running as root.
#[cfg(unix)]
fn lock_directory(dir: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(dir, fs::Permissions::from_mode(0o000)).expect("chmod 000");
    if fs::read_dir(dir).is_ok() {
        unlock_directory(dir);
        return false;
    }
    true
}

#[cfg(unix)]
fn unlock_directory(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).expect("chmod 755");
}

#[cfg(unix)]
#[test]
fn unreadable_subdirectory_is_a_partial_failure() {
    let fixture = SyncFixture::new();
    write_file(fixture.source(), "a_ok.txt", b"fine");
    write_file(fixture.source(), "locked/secret.txt", b"hidden");
    write_file(fixture.destination(), "locked/kept.txt", b"old");
    let locked = fixture.source().join("locked");
    if !lock_directory(&locked) {
        return;
    }

    let result = run(
        &fixture,
        options().delete(true).build().expect("options"),
        &FilterSet::default(),
    );
    unlock_directory(&locked);
    let (summary, observer) = result.expect("run completes");

    assert_eq!(summary.exit_code(), engine::PARTIAL_TRANSFER_EXIT_CODE);
    assert_eq!(summary.stats().entries_failed, 1);
    assert_eq!(observer.errors.len(), 1);
    assert_eq!(observer.errors[0].0, Path::new("locked"));
    assert_eq!(
        fs::read(fixture.destination().join("a_ok.txt")).expect("copied"),
        b"fine"
    );
    assert!(fixture.destination().join("locked/kept.txt").exists());
    assert!(observer.deletions.is_empty());
}

#[cfg(unix)]
#[test]
fn excluded_unreadable_subdirectory_is_never_read() {
    let fixture = SyncFixture::new();
    write_file(fixture.source(), "a_ok.txt", b"fine");
    write_file(fixture.source(), "locked/secret.txt", b"hidden");
    let locked = fixture.source().join("locked");
    if !lock_directory(&locked) {
        return;
    }

    let filters = FilterSet::from_rules([FilterRule::exclude("/locked/")]).expect("filters");
    let result = run(&fixture, options().build().expect("options"), &filters);
    unlock_directory(&locked);
    let (summary, observer) = result.expect("run");

    assert_eq!(summary.exit_code(), 0);
    assert!(observer.errors.is_empty());
    assert!(fixture.destination().join("a_ok.txt").exists());
    assert!(!fixture.destination().join("locked").exists());
}
