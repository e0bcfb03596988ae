#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `bandwidth` parses `--bwlimit` values and paces writers so the whole run
//! stays under a byte-per-second ceiling.
//!
//! # Design
//!
//! [`BandwidthLimiter`] is a virtual-clock token bucket: every registered
//! write pushes a "next free" instant forward by `bytes / rate`, and the
//! writer sleeps once it runs more than a short slack ahead of real time.
//! [`SharedLimiter`] wraps one limiter behind an `Arc<Mutex<_>>` so every
//! worker draws from the same budget; the sleep itself happens outside the
//! lock.
//!
//! # Examples
//!
//! ```
//! use bandwidth::{SharedLimiter, parse_bandwidth_limit};
//!
//! let rate = parse_bandwidth_limit("1M").unwrap().unwrap();
//! assert_eq!(rate.get(), 1024 * 1024);
//!
//! let limiter = SharedLimiter::new(rate);
//! let sleep = limiter.consume(1024);
//! assert!(sleep.is_noop());
//! ```

mod limiter;
mod parse;

pub use crate::limiter::{BandwidthLimiter, LimiterSleep, SharedLimiter};
pub use crate::parse::{BandwidthParseError, MINIMUM_RATE, parse_bandwidth_limit};
