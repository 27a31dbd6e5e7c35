//! Snapshot of one interpolator's registers
//!
//! Covers the writable registers plus the derived PEEK/PEEKRAW outputs, in the
//! same order the hardware dump command reports them. XOR of two snapshots is
//! the usual way to compare them: a zero result means full agreement.

use bincode::{Decode, Encode};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::BitXor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode)]
pub struct InterpState {
    pub accum: [u32; 2],
    pub base: [u32; 3],
    pub ctrl: [u32; 2],
    pub peek: [u32; 3],
    pub peekraw: [u32; 2],
}

impl InterpState {
    #[must_use]
    pub fn is_zero(self) -> bool {
        self == Self::default()
    }

    /// Generate a snapshot with every register fully random, including the
    /// derived outputs. Mainly useful for exercising `restore`, which ignores
    /// the derived fields.
    #[cfg(feature = "rand")]
    #[must_use]
    pub fn random() -> Self {
        Self {
            accum: rand::random(),
            base: rand::random(),
            ctrl: rand::random(),
            peek: rand::random(),
            peekraw: rand::random(),
        }
    }
}

impl BitXor for InterpState {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        let mut diff = self;
        for (a, b) in diff.accum.iter_mut().zip(rhs.accum) {
            *a ^= b;
        }
        for (a, b) in diff.base.iter_mut().zip(rhs.base) {
            *a ^= b;
        }
        for (a, b) in diff.ctrl.iter_mut().zip(rhs.ctrl) {
            *a ^= b;
        }
        for (a, b) in diff.peek.iter_mut().zip(rhs.peek) {
            *a ^= b;
        }
        for (a, b) in diff.peekraw.iter_mut().zip(rhs.peekraw) {
            *a ^= b;
        }
        diff
    }
}

impl Display for InterpState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accum=[{:#x}, {:#x}] base=[{:#x}, {:#x}, {:#x}] ctrl=[{:#x}, {:#x}] \
             peek=[{:#x}, {:#x}, {:#x}] peekraw=[{:#x}, {:#x}]",
            self.accum[0],
            self.accum[1],
            self.base[0],
            self.base[1],
            self.base[2],
            self.ctrl[0],
            self.ctrl[1],
            self.peek[0],
            self.peek[1],
            self.peek[2],
            self.peekraw[0],
            self.peekraw[1],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InterpState {
        InterpState {
            accum: [0x1234_5678, 0x9ABC_DEF0],
            base: [1, 2, 3],
            ctrl: [0x0000_3C00, 0],
            peek: [4, 5, 6],
            peekraw: [7, 8],
        }
    }

    #[test]
    fn xor_with_self_is_zero() {
        let state = sample();
        assert!((state ^ state).is_zero());
        assert!(!(state ^ InterpState::default()).is_zero());
    }

    #[test]
    fn xor_is_componentwise() {
        let diff = sample() ^ InterpState { accum: [0xFFFF_FFFF, 0], ..sample() };
        assert_eq!(diff.accum, [0xEDCB_A987, 0]);
        assert_eq!(diff.base, [0, 0, 0]);
    }

    #[test]
    fn display_is_lowercase_hex() {
        let rendered = sample().to_string();
        assert!(rendered.starts_with("accum=[0x12345678, 0x9abcdef0]"));
        assert!(rendered.contains("ctrl=[0x3c00, 0x0]"));
    }
}
