//! RustCrypto-backed tiers: MD4 (legacy), MD5 (widely supported) and
//! SHA-256 (modern secure).

use std::fmt;

use digest::Digest;

use super::StrongDigest;

macro_rules! rustcrypto_hasher {
    ($(#[$meta:meta])* $name:ident, $inner:ty, $len:literal) => {
        $(#[$meta])*
        #[derive(Clone, Default)]
        pub struct $name {
            inner: $inner,
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name)).finish_non_exhaustive()
            }
        }

        impl $name {
            /// Empty hasher.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Appends `data`.
            pub fn update(&mut self, data: &[u8]) {
                Digest::update(&mut self.inner, data);
            }

            /// Consumes the hasher.
            #[must_use]
            pub fn finalize(self) -> [u8; $len] {
                self.inner.finalize().into()
            }

            /// Digest of `data` in one call.
            #[must_use]
            pub fn digest(data: &[u8]) -> [u8; $len] {
                <$inner>::digest(data).into()
            }
        }

        impl StrongDigest for $name {
            type Seed = ();
            type Digest = [u8; $len];
            const DIGEST_LEN: usize = $len;

            fn with_seed((): Self::Seed) -> Self {
                Self::new()
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

rustcrypto_hasher!(
    /// MD4, the legacy block checksum.
    Md4,
    md4::Md4,
    16
);
rustcrypto_hasher!(
    /// MD5.
    ///
    /// ```
    /// use checksums::strong::Md5;
    ///
    /// assert_eq!(Md5::digest(b"abc")[0], 0x90);
    /// ```
    Md5,
    md5::Md5,
    16
);
rustcrypto_hasher!(
    /// SHA-256.
    Sha256,
    sha2::Sha256,
    32
);

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn published_vectors() {
        assert_eq!(hex(&Md4::digest(b"abc")), "a448017aaf21d8525fc10ae87aa6729d");
        assert_eq!(hex(&Md4::digest(b"")), "31d6cfe0d16ae931b73c59d7e0c089c0");
        assert_eq!(hex(&Md5::digest(b"")), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            hex(&Md5::digest(b"message digest")),
            "f96b697d7cb7938d525a2f31aaf161d0"
        );
        assert_eq!(
            hex(&Sha256::digest(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn split_updates_equal_one_shot() {
        let mut md4 = Md4::new();
        md4.update(b"message ");
        md4.update(b"digest");
        assert_eq!(md4.finalize(), Md4::digest(b"message digest"));

        let mut sha = Sha256::new();
        sha.update(b"ab");
        sha.update(b"c");
        assert_eq!(sha.finalize(), Sha256::digest(b"abc"));
    }

    #[test]
    fn trait_and_inherent_paths_agree() {
        assert_eq!(<Md5 as StrongDigest>::digest_default(b"abc"), Md5::digest(b"abc"));
        assert_eq!(Sha256::DIGEST_LEN, 32);
    }
}
