#![deny(unsafe_code)]

//! Block matching, delta encoding and delta application.
//!
//! This crate provides the delta algorithm:
//! - [`DeltaSignatureIndex`] indexes a [`signature::FileSignature`] by weak digest
//! - [`DeltaGenerator`] slides a window over the source and emits [`DeltaToken`]s
//! - [`apply_delta`] and [`apply_delta_to_writer`] replay a [`DeltaScript`]
//!   against the pre-transfer destination content
//!
//! # Design
//!
//! The generator keeps two rolling digests while it scans: one over a full
//! block-length window and one over a window the length of the signature's
//! short final block. The second window lets a source that begins with the
//! destination's tail block (for example a small file with bytes appended)
//! still match it.
//!
//! Every script satisfies `literal_bytes + matched_bytes == source length`
//! and applying it to the destination content it was computed against
//! reproduces the source byte for byte.

mod apply;
mod error;
mod generator;
mod index;
mod script;

pub use apply::{apply_delta, apply_delta_to_writer};
pub use error::DeltaError;
pub use generator::{DeltaGenerator, generate_delta, whole_file_script};
pub use index::DeltaSignatureIndex;
pub use script::{DeltaScript, DeltaToken};
