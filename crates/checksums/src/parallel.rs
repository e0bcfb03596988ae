//! Parallel whole-file digests.
//!
//! `--checksum` runs hash every regular file on both sides before the
//! comparator runs. With the `parallel` feature the work is spread over the
//! rayon global pool; results keep the order of the input paths.

use std::io;
use std::path::PathBuf;

use rayon::prelude::*;

use crate::{ChecksumChoice, digest_file};

/// Hashes every path in `paths`, returning results in input order.
pub fn digest_files(choice: ChecksumChoice, paths: &[PathBuf]) -> Vec<io::Result<Vec<u8>>> {
    paths
        .par_iter()
        .map(|path| digest_file(choice, path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_preserve_input_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut paths = Vec::new();
        for i in 0..16u8 {
            let path = dir.path().join(format!("f{i}"));
            std::fs::write(&path, vec![i; usize::from(i) * 100]).expect("write");
            paths.push(path);
        }

        let digests = digest_files(ChecksumChoice::Xxh3, &paths);
        for (i, digest) in digests.into_iter().enumerate() {
            let expected = ChecksumChoice::Xxh3.digest(&vec![i as u8; i * 100]);
            assert_eq!(digest.expect("readable"), expected);
        }
    }
}
