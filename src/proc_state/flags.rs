/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const CARRY_BIT: u8 = 1;
const PARITY_BIT: u8 = 1 << 2;
const AUX_CARRY_BIT: u8 = 1 << 4;
const ZERO_BIT: u8 = 1 << 6;
const SIGN_BIT: u8 = 1 << 7;
/// Bit 1 of the flag byte always reads as 1, bits 3 and 5 as 0.
const PADDING: u8 = 1 << 1;

/// The five condition flags.
///
/// Each instruction only touches the flags it documents; everything else is left as is.
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Flags {
    pub z: bool,
    pub s: bool,
    pub p: bool,
    pub cy: bool,
    pub ac: bool,
}

impl Flags {
    /// Unpacks the flag byte pushed by `PUSH PSW`. Padding bits are ignored.
    pub fn from_processor_status_word(psw: u8) -> Flags {
        Flags {
            z: (psw & ZERO_BIT) != 0,
            s: (psw & SIGN_BIT) != 0,
            p: (psw & PARITY_BIT) != 0,
            cy: (psw & CARRY_BIT) != 0,
            ac: (psw & AUX_CARRY_BIT) != 0,
        }
    }

    /// Packs the flags as `S Z 0 AC 0 P 1 CY`, from bit 7 down to bit 0.
    pub fn to_processor_status_word(&self) -> u8 {
        let mut psw = PADDING;
        if self.cy {
            psw |= CARRY_BIT;
        }
        if self.p {
            psw |= PARITY_BIT;
        }
        if self.ac {
            psw |= AUX_CARRY_BIT;
        }
        if self.z {
            psw |= ZERO_BIT;
        }
        if self.s {
            psw |= SIGN_BIT;
        }
        psw
    }

    /// Sets zero, sign and parity from a result byte.
    pub fn set_zsp(&mut self, result: u8) {
        self.z = result == 0;
        self.s = (result & 0x80) != 0;
        self.p = parity(result);
    }

    /// `operand1 + operand2 + carry_in`, setting all five flags.
    pub fn add(&mut self, operand1: u8, operand2: u8, carry_in: bool) -> u8 {
        let (result, carry, aux_carry) = add_with_carry(operand1, operand2, carry_in);
        self.set_zsp(result);
        self.cy = carry;
        self.ac = aux_carry;
        result
    }

    /// `operand1 - operand2 - borrow_in`, setting all five flags.
    ///
    /// Computed as the addition of the complemented subtrahend. The carry out of that addition is
    /// inverted so that `cy` means a borrow happened; the auxiliary carry is kept as is.
    pub fn sub(&mut self, operand1: u8, operand2: u8, borrow_in: bool) -> u8 {
        let (result, carry, aux_carry) = add_with_carry(operand1, !operand2, !borrow_in);
        self.set_zsp(result);
        self.cy = !carry;
        self.ac = aux_carry;
        result
    }

    /// `INR`: every flag but the carry.
    pub fn increment(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_zsp(result);
        self.ac = (result & 0x0f) == 0;
        result
    }

    /// `DCR`: every flag but the carry.
    pub fn decrement(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_zsp(result);
        self.ac = (result & 0x0f) != 0x0f;
        result
    }

    pub fn and(&mut self, operand1: u8, operand2: u8) -> u8 {
        let result = operand1 & operand2;
        self.set_zsp(result);
        self.cy = false;
        self.ac = ((operand1 | operand2) & 0x08) != 0;
        result
    }

    pub fn xor(&mut self, operand1: u8, operand2: u8) -> u8 {
        let result = operand1 ^ operand2;
        self.set_logical(result);
        result
    }

    pub fn or(&mut self, operand1: u8, operand2: u8) -> u8 {
        let result = operand1 | operand2;
        self.set_logical(result);
        result
    }

    fn set_logical(&mut self, result: u8) {
        self.set_zsp(result);
        self.cy = false;
        self.ac = false;
    }
}

/// True when the number of set bits is even.
pub fn parity(mut value: u8) -> bool {
    value ^= value >> 4;
    value ^= value >> 2;
    value ^= value >> 1;
    (value & 1) == 0
}

/// Returns the sum and the carries out of bit 7 and bit 3.
pub fn add_with_carry(operand1: u8, operand2: u8, carry_in: bool) -> (u8, bool, bool) {
    let carry_in = carry_in as u16;
    let sum = operand1 as u16 + operand2 as u16 + carry_in;
    let low_nibbles = (operand1 & 0x0f) as u16 + (operand2 & 0x0f) as u16 + carry_in;
    (sum as u8, sum > 0xff, low_nibbles > 0x0f)
}

/// Returns the 16 bit sum and the carry out of bit 15, as used by `DAD`.
pub fn add_words(operand1: u16, operand2: u16) -> (u16, bool) {
    operand1.overflowing_add(operand2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_non_zero_sign_parity_ac() {
        let mut flags: Flags = Default::default();

        let result = flags.add(0x0f, 0x87, false);
        assert_eq!(result, 0x96);
        assert_eq!(flags.z, false);
        assert_eq!(flags.s, true);
        assert_eq!(flags.p, true);
        assert_eq!(flags.cy, false);
        assert_eq!(flags.ac, true);
    }

    #[test]
    fn flags_zero() {
        let mut flags: Flags = Default::default();

        flags.add(0, 0, false);
        assert_eq!(flags.z, true);
        assert_eq!(flags.s, false);
        assert_eq!(flags.p, true);
        assert_eq!(flags.cy, false);
        assert_eq!(flags.ac, false);
    }

    #[test]
    fn flags_carry() {
        let mut flags: Flags = Default::default();

        let result = flags.add(0xff, 0x02, false);
        assert_eq!(result, 0x01);
        assert_eq!(flags.z, false);
        assert_eq!(flags.s, false);
        assert_eq!(flags.p, false);
        assert_eq!(flags.cy, true);
        assert_eq!(flags.ac, true);
    }

    #[test]
    fn flags_borrow() {
        let mut flags: Flags = Default::default();

        let result = flags.sub(0x00, 0x12, false);
        assert_eq!(result, 0xee);
        assert_eq!(flags.z, false);
        assert_eq!(flags.s, true);
        assert_eq!(flags.p, true);
        assert_eq!(flags.cy, true);
        assert_eq!(flags.ac, false);
    }

    #[test]
    fn subtraction_keeps_the_adder_aux_carry() {
        let mut flags: Flags = Default::default();

        // 0x3e + !0x3e + 1 carries out of bit 3 even though nothing is borrowed
        flags.sub(0x3e, 0x3e, false);
        assert!(flags.z);
        assert!(!flags.cy);
        assert!(flags.ac);

        flags.sub(0x10, 0x01, false);
        assert!(!flags.ac);
    }

    #[test]
    fn subtraction_with_borrow_in() {
        let mut flags: Flags = Default::default();

        assert_eq!(flags.sub(0x05, 0x04, true), 0x00);
        assert!(flags.z);
        assert!(!flags.cy);

        assert_eq!(flags.sub(0x00, 0xff, true), 0x00);
        assert!(flags.z);
        assert!(flags.cy);
    }

    #[test]
    fn increment_and_decrement_leave_carry() {
        let mut flags = Flags { cy: true, ..Default::default() };

        assert_eq!(flags.increment(0x0f), 0x10);
        assert!(flags.ac);
        assert!(flags.cy);

        assert_eq!(flags.decrement(0x10), 0x0f);
        assert!(!flags.ac);
        assert_eq!(flags.decrement(0x01), 0x00);
        assert!(flags.z);
        assert!(flags.ac);
        assert!(flags.cy);
    }

    #[test]
    fn logical_operations_reset_carry() {
        let mut flags = Flags { cy: true, ac: true, ..Default::default() };
        assert_eq!(flags.and(0xfc, 0x0f), 0x0c);
        assert!(!flags.cy);
        assert!(flags.ac);

        flags.cy = true;
        assert_eq!(flags.or(0x30, 0x03), 0x33);
        assert!(!flags.cy);
        assert!(!flags.ac);
        assert!(flags.p);

        flags.ac = true;
        assert_eq!(flags.xor(0x5a, 0x5a), 0x00);
        assert!(flags.z);
        assert!(!flags.ac);
    }

    #[test]
    fn processor_status_word_layout() {
        assert_eq!(Flags::default().to_processor_status_word(), 0b0000_0010);
        let all = Flags { z: true, s: true, p: true, cy: true, ac: true };
        assert_eq!(all.to_processor_status_word(), 0b1101_0111);
        assert_eq!(Flags::from_processor_status_word(0xff), all);
        assert_eq!(Flags::from_processor_status_word(0b0010_1010), Flags::default());
    }

    #[test]
    fn word_addition_carries_out_of_bit_15() {
        assert_eq!(add_words(0xffff, 0x0001), (0x0000, true));
        assert_eq!(add_words(0x7fff, 0x0001), (0x8000, false));
    }
}
