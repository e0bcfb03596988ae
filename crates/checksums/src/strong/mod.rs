//! Strong checksums used to confirm weak matches and verify whole files.
//!
//! Every algorithm implements [`StrongDigest`], which gives the matcher and
//! the signature builder a uniform streaming interface. Runtime selection by
//! name goes through [`ChecksumChoice`](crate::ChecksumChoice) instead.

mod crypto;
mod xxhash;

pub use crypto::{Md4, Md5, Sha256};
pub use xxhash::{Xxh3, Xxh3_128, Xxh64};

/// Streaming strong checksum.
pub trait StrongDigest: Sized {
    /// Seed type accepted by [`with_seed`](Self::with_seed). Unseeded
    /// algorithms use `()`.
    type Seed: Default;
    /// Fixed-size digest output.
    type Digest: AsRef<[u8]> + Copy + Eq;
    /// Length of [`Digest`](Self::Digest) in bytes.
    const DIGEST_LEN: usize;

    /// Creates a hasher with the supplied seed.
    fn with_seed(seed: Self::Seed) -> Self;

    /// Creates a hasher with the default seed.
    fn new_default() -> Self {
        Self::with_seed(Self::Seed::default())
    }

    /// Feeds additional bytes into the digest state.
    fn update(&mut self, data: &[u8]);

    /// Finalises the digest.
    fn finalize(self) -> Self::Digest;

    /// One-shot digest of `data` with the default seed.
    fn digest_default(data: &[u8]) -> Self::Digest {
        let mut hasher = Self::new_default();
        hasher.update(data);
        hasher.finalize()
    }
}
