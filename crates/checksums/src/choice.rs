//! crates/checksums/src/choice.rs
//!
//! Runtime selection of the strong checksum algorithm.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::strong::{Md4, Md5, Sha256, Xxh3, Xxh3_128, Xxh64};

/// Strong checksum algorithm selected with `--checksum-choice`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ChecksumChoice {
    /// MD4, the legacy fast tier.
    Md4,
    /// MD5, widely supported.
    Md5,
    /// SHA-256, modern and secure.
    Sha256,
    /// XXH64.
    Xxh64,
    /// XXH3 with 64-bit output.
    Xxh3,
    /// XXH3 with 128-bit output. Chosen by `auto`.
    #[default]
    Xxh128,
}

/// Error returned when a checksum name is not recognised.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unknown checksum algorithm '{name}' (expected md4, md5, sha256, xxh64, xxh3, xxh128 or auto)")]
pub struct ChecksumChoiceError {
    name: String,
}

impl ChecksumChoiceError {
    /// Name the caller supplied.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ChecksumChoice {
    /// All selectable algorithms, in the order they are listed in help output.
    pub const ALL: [Self; 6] = [
        Self::Md4,
        Self::Md5,
        Self::Sha256,
        Self::Xxh64,
        Self::Xxh3,
        Self::Xxh128,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md4 => "md4",
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
            Self::Xxh64 => "xxh64",
            Self::Xxh3 => "xxh3",
            Self::Xxh128 => "xxh128",
        }
    }

    /// Length in bytes of a digest produced by this algorithm.
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Md4 | Self::Md5 | Self::Xxh128 => 16,
            Self::Sha256 => 32,
            Self::Xxh64 | Self::Xxh3 => 8,
        }
    }

    /// Creates a streaming hasher for this algorithm.
    #[must_use]
    pub fn hasher(self) -> StrongHasher {
        match self {
            Self::Md4 => StrongHasher::Md4(Md4::new()),
            Self::Md5 => StrongHasher::Md5(Md5::new()),
            Self::Sha256 => StrongHasher::Sha256(Sha256::new()),
            Self::Xxh64 => StrongHasher::Xxh64(Xxh64::new(0)),
            Self::Xxh3 => StrongHasher::Xxh3(Xxh3::new(0)),
            Self::Xxh128 => StrongHasher::Xxh128(Xxh3_128::new(0)),
        }
    }

    /// One-shot digest of `data`.
    #[must_use]
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Md4 => Md4::digest(data).to_vec(),
            Self::Md5 => Md5::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Xxh64 => Xxh64::digest(0, data).to_vec(),
            Self::Xxh3 => Xxh3::digest(0, data).to_vec(),
            Self::Xxh128 => Xxh3_128::digest(0, data).to_vec(),
        }
    }
}

impl fmt::Display for ChecksumChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChecksumChoice {
    type Err = ChecksumChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if lowered == "auto" {
            return Ok(Self::default());
        }
        Self::ALL
            .into_iter()
            .find(|choice| choice.name() == lowered)
            .ok_or_else(|| ChecksumChoiceError { name: s.to_owned() })
    }
}

/// Streaming hasher for an algorithm chosen at runtime.
#[derive(Clone)]
pub enum StrongHasher {
    /// MD4 state.
    Md4(Md4),
    /// MD5 state.
    Md5(Md5),
    /// SHA-256 state.
    Sha256(Sha256),
    /// XXH64 state.
    Xxh64(Xxh64),
    /// XXH3-64 state.
    Xxh3(Xxh3),
    /// XXH3-128 state.
    Xxh128(Xxh3_128),
}

impl StrongHasher {
    /// Feeds additional bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md4(h) => h.update(data),
            Self::Md5(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Xxh64(h) => h.update(data),
            Self::Xxh3(h) => h.update(data),
            Self::Xxh128(h) => h.update(data),
        }
    }

    /// Finalises the digest.
    #[must_use]
    pub fn finalize(self) -> Vec<u8> {
        match self {
            Self::Md4(h) => h.finalize().to_vec(),
            Self::Md5(h) => h.finalize().to_vec(),
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Xxh64(h) => h.finalize().to_vec(),
            Self::Xxh3(h) => h.finalize().to_vec(),
            Self::Xxh128(h) => h.finalize().to_vec(),
        }
    }
}

impl fmt::Debug for StrongHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Md4(_) => "md4",
            Self::Md5(_) => "md5",
            Self::Sha256(_) => "sha256",
            Self::Xxh64(_) => "xxh64",
            Self::Xxh3(_) => "xxh3",
            Self::Xxh128(_) => "xxh128",
        };
        f.debug_tuple("StrongHasher").field(&name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_name() {
        for choice in ChecksumChoice::ALL {
            assert_eq!(choice.name().parse::<ChecksumChoice>(), Ok(choice));
        }
    }

    #[test]
    fn auto_selects_xxh128() {
        assert_eq!("auto".parse::<ChecksumChoice>(), Ok(ChecksumChoice::Xxh128));
        assert_eq!("AUTO".parse::<ChecksumChoice>(), Ok(ChecksumChoice::Xxh128));
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "crc32".parse::<ChecksumChoice>().unwrap_err();
        assert_eq!(err.name(), "crc32");
        assert!(err.to_string().contains("crc32"));
    }

    #[test]
    fn digest_lengths_match_output() {
        for choice in ChecksumChoice::ALL {
            assert_eq!(choice.digest(b"abc").len(), choice.digest_len(), "{choice}");
        }
    }

    #[test]
    fn streaming_hasher_matches_one_shot() {
        for choice in ChecksumChoice::ALL {
            let mut hasher = choice.hasher();
            hasher.update(b"split ");
            hasher.update(b"input");
            assert_eq!(hasher.finalize(), choice.digest(b"split input"), "{choice}");
        }
    }
}
