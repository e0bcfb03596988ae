//! XXHash family, the fastest non-cryptographic tier.
//!
//! Output bytes are little-endian on every platform.

use xxhash_rust::{xxh3, xxh64};

use super::StrongDigest;

macro_rules! xxhash_hasher {
    (
        $(#[$meta:meta])*
        $name:ident {
            state: $state:ty = $construct:path,
            finish: $finish:ident,
            one_shot: $one_shot:path,
            len: $len:literal $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            state: $state,
        }

        impl $name {
            /// Hasher seeded with `seed`; dsync always uses 0.
            #[must_use]
            pub fn new(seed: u64) -> Self {
                Self {
                    state: $construct(seed),
                }
            }

            /// Appends `data`.
            pub fn update(&mut self, data: &[u8]) {
                self.state.update(data);
            }

            /// Consumes the hasher.
            #[must_use]
            pub fn finalize(self) -> [u8; $len] {
                self.state.$finish().to_le_bytes()
            }

            /// Digest of `data` in one call.
            #[must_use]
            pub fn digest(seed: u64, data: &[u8]) -> [u8; $len] {
                $one_shot(data, seed).to_le_bytes()
            }
        }

        impl StrongDigest for $name {
            type Seed = u64;
            type Digest = [u8; $len];
            const DIGEST_LEN: usize = $len;

            fn with_seed(seed: Self::Seed) -> Self {
                Self::new(seed)
            }

            fn update(&mut self, data: &[u8]) {
                $name::update(self, data);
            }

            fn finalize(self) -> Self::Digest {
                $name::finalize(self)
            }
        }
    };
}

xxhash_hasher!(
    /// XXH64.
    ///
    /// ```
    /// use checksums::strong::Xxh64;
    ///
    /// let mut hasher = Xxh64::new(0);
    /// hasher.update(b"chunk 1");
    /// hasher.update(b"chunk 2");
    /// assert_eq!(hasher.finalize(), Xxh64::digest(0, b"chunk 1chunk 2"));
    /// ```
    Xxh64 {
        state: xxh64::Xxh64 = xxh64::Xxh64::new,
        finish: digest,
        one_shot: xxh64::xxh64,
        len: 8,
    }
);

xxhash_hasher!(
    /// XXH3 with a 64-bit result.
    Xxh3 {
        state: xxh3::Xxh3 = xxh3::Xxh3::with_seed,
        finish: digest,
        one_shot: xxh3::xxh3_64_with_seed,
        len: 8,
    }
);

xxhash_hasher!(
    /// XXH3 with a 128-bit result; the `auto` checksum choice.
    #[allow(non_camel_case_types)]
    Xxh3_128 {
        state: xxh3::Xxh3 = xxh3::Xxh3::with_seed,
        finish: digest128,
        one_shot: xxh3::xxh3_128_with_seed,
        len: 16,
    }
);
