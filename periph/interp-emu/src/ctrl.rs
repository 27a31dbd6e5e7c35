//! Decoded view of a lane's CTRL register
//!
//! The hardware packs each lane's configuration and status into a single
//! 32-bit register; this module converts between the packed form and a plain
//! record. Bits 26-31 are reserved and always read back as zero.

use bincode::{Decode, Encode};
use interp_common::num::GetBit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct InterpCtrl {
    pub shift: u8,
    pub mask_lsb: u8,
    pub mask_msb: u8,
    pub is_signed: bool,
    pub cross_input: bool,
    pub cross_result: bool,
    pub add_raw: bool,
    pub force_msb: u8,
    pub blend: bool,
    pub clamp: bool,
    pub overf0: bool,
    pub overf1: bool,
    pub overf: bool,
}

impl InterpCtrl {
    #[must_use]
    pub fn from_reg(value: u32) -> Self {
        Self {
            shift: value.bits(0..=4) as u8,
            mask_lsb: value.bits(5..=9) as u8,
            mask_msb: value.bits(10..=14) as u8,
            is_signed: value.bit(15),
            cross_input: value.bit(16),
            cross_result: value.bit(17),
            add_raw: value.bit(18),
            force_msb: value.bits(19..=20) as u8,
            blend: value.bit(21),
            clamp: value.bit(22),
            overf0: value.bit(23),
            overf1: value.bit(24),
            overf: value.bit(25),
        }
    }

    #[must_use]
    pub fn to_reg(self) -> u32 {
        u32::from(self.shift & 0x1F)
            | (u32::from(self.mask_lsb & 0x1F) << 5)
            | (u32::from(self.mask_msb & 0x1F) << 10)
            | (u32::from(self.is_signed) << 15)
            | (u32::from(self.cross_input) << 16)
            | (u32::from(self.cross_result) << 17)
            | (u32::from(self.add_raw) << 18)
            | (u32::from(self.force_msb & 0x03) << 19)
            | (u32::from(self.blend) << 21)
            | (u32::from(self.clamp) << 22)
            | (u32::from(self.overf0) << 23)
            | (u32::from(self.overf1) << 24)
            | (u32::from(self.overf) << 25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_positions() {
        let ctrl = InterpCtrl::from_reg(1 << 15);
        assert!(ctrl.is_signed);
        assert_eq!(ctrl.to_reg(), 1 << 15);

        let ctrl = InterpCtrl::from_reg(0b11 << 19);
        assert_eq!(ctrl.force_msb, 0b11);
        assert_eq!(ctrl.to_reg(), 0b11 << 19);

        let ctrl = InterpCtrl::from_reg((21 << 10) | (3 << 5) | 17);
        assert_eq!(ctrl.shift, 17);
        assert_eq!(ctrl.mask_lsb, 3);
        assert_eq!(ctrl.mask_msb, 21);
    }

    #[test]
    fn round_trip_masks_reserved_bits() {
        for _ in 0..100 {
            let value: u32 = rand::random();
            let ctrl = InterpCtrl::from_reg(value);
            assert_eq!(ctrl.to_reg(), value & 0x03FF_FFFF);
            assert_eq!(InterpCtrl::from_reg(ctrl.to_reg()), ctrl);
        }
    }

    #[test]
    fn status_flag_bits() {
        let ctrl =
            InterpCtrl { overf0: true, overf1: true, overf: true, ..InterpCtrl::from_reg(0) };
        assert_eq!(ctrl.to_reg(), 0b111 << 23);
    }
}
