use super::checksum::RollingChecksum;
use super::error::RollingError;

/// Snapshot of a rolling checksum over a fixed-length window.
///
/// The digest is a plain value. The matcher carries it through its scan loop
/// and replaces it with [`rolled`](Self::rolled) on every slide, so the
/// incremental update can be tested without any I/O.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct RollingDigest {
    sum1: u16,
    sum2: u16,
    len: usize,
}

impl RollingDigest {
    /// Digest of an empty window.
    pub const ZERO: Self = Self {
        sum1: 0,
        sum2: 0,
        len: 0,
    };

    /// Builds a digest from its components.
    #[must_use]
    pub const fn new(sum1: u16, sum2: u16, len: usize) -> Self {
        Self { sum1, sum2, len }
    }

    /// Computes the digest of `data` in a single pass.
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut checksum = RollingChecksum::new();
        checksum.update(data);
        checksum.digest()
    }

    /// Returns the byte-sum component.
    #[must_use]
    pub const fn sum1(&self) -> u16 {
        self.sum1
    }

    /// Returns the weighted-sum component.
    #[must_use]
    pub const fn sum2(&self) -> u16 {
        self.sum2
    }

    /// Number of bytes in the window this digest describes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Reports whether the digest covers zero bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed 32-bit value, `(s2 << 16) | s1`.
    #[must_use]
    pub const fn value(&self) -> u32 {
        ((self.sum2 as u32) << 16) | self.sum1 as u32
    }

    /// Little-endian encoding of [`value`](Self::value).
    #[must_use]
    pub const fn to_le_bytes(&self) -> [u8; 4] {
        self.value().to_le_bytes()
    }

    /// Returns the digest of the window shifted by one byte.
    ///
    /// `outgoing` leaves the front of the window and `incoming` enters at the
    /// back; the window length is unchanged.
    pub fn rolled(self, outgoing: u8, incoming: u8) -> Result<Self, RollingError> {
        if self.len == 0 {
            return Err(RollingError::EmptyWindow);
        }
        let window =
            u32::try_from(self.len).map_err(|_| RollingError::WindowTooLarge { len: self.len })?;

        let out = u32::from(outgoing);
        let inn = u32::from(incoming);

        let s1 = u32::from(self.sum1).wrapping_sub(out).wrapping_add(inn) & 0xffff;
        let s2 = u32::from(self.sum2)
            .wrapping_sub(window.wrapping_mul(out))
            .wrapping_add(s1)
            & 0xffff;

        Ok(Self {
            sum1: s1 as u16,
            sum2: s2 as u16,
            len: self.len,
        })
    }
}

impl From<RollingDigest> for u32 {
    fn from(digest: RollingDigest) -> Self {
        digest.value()
    }
}
