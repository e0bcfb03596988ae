//! Directory-tree fixtures shared by the workspace's integration tests.
//!
//! Helpers panic on I/O failure; they only run inside tests.

#![allow(clippy::missing_panics_doc)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use tempfile::TempDir;

/// A source and destination directory pair below one temporary root.
pub struct SyncFixture {
    _temp: TempDir,
    source: PathBuf,
    destination: PathBuf,
}

impl SyncFixture {
    /// Creates empty `src/` and `dst/` directories.
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("create temporary directory");
        let source = temp.path().join("src");
        let destination = temp.path().join("dst");
        fs::create_dir(&source).expect("create source directory");
        fs::create_dir(&destination).expect("create destination directory");
        Self {
            _temp: temp,
            source,
            destination,
        }
    }

    /// Source root.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Destination root.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Path below the temporary root that is neither source nor destination.
    pub fn scratch(&self, name: &str) -> PathBuf {
        self.source
            .parent()
            .expect("fixture root")
            .join(name)
    }
}

impl Default for SyncFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes `contents` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(&path, contents).expect("write fixture file");
    path
}

/// Sets the modification time of `path` to `seconds` after the epoch.
pub fn set_mtime(path: &Path, seconds: i64) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(seconds, 0))
        .expect("set modification time");
}

/// Modification time `seconds` after the epoch.
pub fn epoch_plus(seconds: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(seconds)
}

/// Deterministic pseudo-random bytes for content fixtures.
pub fn patterned_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect()
}

/// One entry of a [`tree_snapshot`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    /// Directory.
    Directory,
    /// Regular file with its contents.
    File(Vec<u8>),
    /// Symbolic link with its target.
    Symlink(PathBuf),
}

/// Captures every entry below `root`, keyed by relative path. Modification
/// times are not part of the snapshot.
pub fn tree_snapshot(root: &Path) -> BTreeMap<PathBuf, Node> {
    let mut nodes = BTreeMap::new();
    collect(root, Path::new(""), &mut nodes);
    nodes
}

fn collect(root: &Path, relative: &Path, nodes: &mut BTreeMap<PathBuf, Node>) {
    let directory = root.join(relative);
    let mut children: Vec<_> = fs::read_dir(&directory)
        .expect("read fixture directory")
        .map(|entry| entry.expect("directory entry").file_name())
        .collect();
    children.sort();

    for name in children {
        let child = relative.join(&name);
        let path = root.join(&child);
        let metadata = fs::symlink_metadata(&path).expect("fixture metadata");
        if metadata.file_type().is_symlink() {
            let target = fs::read_link(&path).expect("read fixture link");
            nodes.insert(child, Node::Symlink(target));
        } else if metadata.is_dir() {
            nodes.insert(child.clone(), Node::Directory);
            collect(root, &child, nodes);
        } else {
            let contents = fs::read(&path).expect("read fixture file");
            nodes.insert(child, Node::File(contents));
        }
    }
}

/// Asserts that both trees hold the same entries with the same contents.
pub fn assert_trees_match(expected: &Path, actual: &Path) {
    let expected = tree_snapshot(expected);
    let actual = tree_snapshot(actual);
    assert_eq!(
        expected.keys().collect::<Vec<_>>(),
        actual.keys().collect::<Vec<_>>(),
        "entry sets differ"
    );
    for (path, node) in &expected {
        assert_eq!(Some(node), actual.get(path), "{} differs", path.display());
    }
}
