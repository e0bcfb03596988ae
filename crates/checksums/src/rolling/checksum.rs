use super::digest::RollingDigest;
use super::error::RollingError;

/// Accumulator that builds a [`RollingDigest`] from streamed bytes.
///
/// Signature generation feeds whole blocks through [`update`](Self::update);
/// the matcher switches to [`roll`](Self::roll) once the window is full.
#[doc(alias = "rsum")]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RollingChecksum {
    state: RollingDigest,
}

impl RollingChecksum {
    /// Empty window.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: RollingDigest::ZERO,
        }
    }

    /// Bytes folded in so far.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.state.len()
    }

    /// True before any byte has been seen.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Appends `chunk` to the window.
    #[inline]
    pub fn update(&mut self, chunk: &[u8]) {
        let mut s1 = u32::from(self.state.sum1());
        let mut s2 = u32::from(self.state.sum2());
        for &byte in chunk {
            s1 += u32::from(byte);
            s2 += s1;
            // Both sums stay below 2^17 between bytes.
            s1 &= 0xffff;
            s2 &= 0xffff;
        }
        self.state = RollingDigest::new(
            s1 as u16,
            s2 as u16,
            self.state.len().saturating_add(chunk.len()),
        );
    }

    /// Slides the window one byte: `outgoing` leaves, `incoming` enters.
    #[inline]
    pub fn roll(&mut self, outgoing: u8, incoming: u8) -> Result<(), RollingError> {
        self.state = self.state.rolled(outgoing, incoming)?;
        Ok(())
    }

    /// Packed `(s2 << 16) | s1`.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.state.value()
    }

    /// Current window as a plain value.
    #[must_use]
    pub const fn digest(&self) -> RollingDigest {
        self.state
    }
}

impl From<RollingDigest> for RollingChecksum {
    fn from(state: RollingDigest) -> Self {
        Self { state }
    }
}
