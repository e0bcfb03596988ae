#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `signature` splits existing destination content into fixed-size blocks
//! and records a weak rolling digest plus a strong digest for each one. The
//! matcher uses the resulting [`FileSignature`] to find runs of source bytes
//! the destination already holds.
//!
//! # Design
//!
//! - [`calculate_signature_layout`] derives the block length from the file
//!   size: 700 bytes up to 490,000 bytes, then roughly the square root of the
//!   file size, capped at 128 KiB. The receiver computes the layout and the
//!   sender reads it from the [`FileSignature`], so the two sides never need
//!   to agree on the heuristic independently.
//! - [`generate_file_signature`] streams an [`std::io::Read`] block by block.
//! - [`signature_from_bytes`] works on an in-memory buffer and hashes blocks
//!   in parallel once the block count is large enough to pay for it.
//!
//! # Invariants
//!
//! The block lengths of a signature always sum to the file length and only
//! the final block may be shorter than the layout's block length.
//!
//! # Examples
//!
//! ```
//! use checksums::ChecksumChoice;
//! use signature::{SignatureLayoutParams, calculate_signature_layout, signature_from_bytes};
//!
//! let data = vec![7u8; 1500];
//! let params = SignatureLayoutParams::new(data.len() as u64, None, ChecksumChoice::Md5);
//! let layout = calculate_signature_layout(params).unwrap();
//! let signature = signature_from_bytes(&data, layout, ChecksumChoice::Md5).unwrap();
//! assert_eq!(signature.blocks().len(), 3);
//! assert_eq!(signature.total_bytes(), 1500);
//! ```

mod block;
mod file;
mod generation;
mod layout;

pub use block::SignatureBlock;
pub use file::FileSignature;
pub use generation::{SignatureError, generate_file_signature, signature_from_bytes};
pub use layout::{
    DEFAULT_BLOCK_LENGTH, MAX_BLOCK_LENGTH, SignatureLayout, SignatureLayoutError,
    SignatureLayoutParams, calculate_signature_layout,
};
