use std::fmt;
use std::str::FromStr;

use crc::{Crc, CRC_32_CKSUM};

use crate::app::FeedbellError;

const CKSUM: Crc<u32> = Crc::<u32>::new(&CRC_32_CKSUM);

/// Deterministic digest of one or more strings.
///
/// Values are computed in 64-bit signed arithmetic regardless of the host
/// word size, so records written on one machine stay valid on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(i64);

impl Fingerprint {
    pub fn of(parts: &[&str]) -> Self {
        let mut digest = CKSUM.digest();
        let mut len: u64 = 0;
        for part in parts {
            digest.update(part.as_bytes());
            len += part.len() as u64;
        }

        // POSIX cksum folds the byte count into the CRC, least significant
        // octet first, stopping once the remaining count is zero.
        let mut remaining = len;
        while remaining > 0 {
            digest.update(&[(remaining & 0xff) as u8]);
            remaining >>= 8;
        }
        let check = digest.finalize();

        let h = i64::from(check).wrapping_add(len as i64);
        Self(mix(h))
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

fn mix(h: i64) -> i64 {
    h.wrapping_add(h.wrapping_shl(6))
        .wrapping_add(h.wrapping_shl(16))
        .wrapping_sub(h)
}

/// Shorthand for [`Fingerprint::of`].
pub fn fingerprint(parts: &[&str]) -> Fingerprint {
    Fingerprint::of(parts)
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = FeedbellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| FeedbellError::Compute(format!("{:?} is not a fingerprint: {}", s, e)))
    }
}

impl From<i64> for Fingerprint {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
