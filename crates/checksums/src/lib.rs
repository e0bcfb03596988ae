#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the weak and strong hash functions used by the delta
//! engine. The weak checksum is an Adler-style rolling sum that can slide
//! across a buffer in constant time per byte. Strong checksums confirm weak
//! hits and verify reconstructed files.
//!
//! # Design
//!
//! - [`RollingChecksum`] accumulates bytes into the two 16-bit sums and
//!   [`RollingDigest`] is the immutable value the matcher carries through its
//!   scan loop. [`RollingDigest::rolled`] is a pure function of the previous
//!   digest and the bytes leaving and entering the window.
//! - [`strong`] exposes streaming hashers behind the
//!   [`StrongDigest`](strong::StrongDigest) trait.
//! - [`ChecksumChoice`] is the runtime selector parsed from
//!   `--checksum-choice`. It dispatches one-shot digests and creates
//!   [`StrongHasher`] instances without the caller naming a concrete type.
//!
//! # Examples
//!
//! ```
//! use checksums::{ChecksumChoice, RollingChecksum};
//!
//! let mut rolling = RollingChecksum::new();
//! rolling.update(b"block");
//! assert_eq!(rolling.len(), 5);
//!
//! let choice: ChecksumChoice = "md5".parse().unwrap();
//! assert_eq!(choice.digest(b"block").len(), 16);
//! ```

mod choice;
mod file;
mod rolling;
pub mod strong;

#[cfg(feature = "parallel")]
#[cfg_attr(docsrs, doc(cfg(feature = "parallel")))]
pub mod parallel;

pub use choice::{ChecksumChoice, ChecksumChoiceError, StrongHasher};
pub use file::{digest_file, digest_reader};
pub use rolling::{RollingChecksum, RollingDigest, RollingError};
