//! Rolling checksum used to propose block matches.
//!
//! The checksum keeps two 16-bit components: `s1`, the sum of the bytes in
//! the window, and `s2`, the sum of the running `s1` values. Sliding the
//! window by one byte is O(1):
//!
//! ```text
//! s1' = s1 - out + in
//! s2' = s2 - len * out + s1'
//! ```
//!
//! Both components are truncated to 16 bits after every step and the packed
//! value is `(s2 << 16) | s1`.
//!
//! # Example
//!
//! ```rust
//! use checksums::RollingChecksum;
//!
//! let mut rolling = RollingChecksum::new();
//! rolling.update(b"hello");
//!
//! // Slide window: remove 'h', add '!'
//! rolling.roll(b'h', b'!').unwrap();
//!
//! let mut fresh = RollingChecksum::new();
//! fresh.update(b"ello!");
//! assert_eq!(rolling.value(), fresh.value());
//! ```

mod checksum;
mod digest;
mod error;

pub use checksum::RollingChecksum;
pub use digest::RollingDigest;
pub use error::RollingError;
