/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::opcode::{Register, RegisterPair};

/// The register file. Everything starts at zero.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    pub fn reg_val(&self, reg: Register) -> u8 {
        match reg {
            Register::A => self.a,
            Register::B => self.b,
            Register::C => self.c,
            Register::D => self.d,
            Register::E => self.e,
            Register::H => self.h,
            Register::L => self.l,
        }
    }

    pub fn set_reg_val(&mut self, reg: Register, value: u8) {
        match reg {
            Register::A => self.a = value,
            Register::B => self.b = value,
            Register::C => self.c = value,
            Register::D => self.d = value,
            Register::E => self.e = value,
            Register::H => self.h = value,
            Register::L => self.l = value,
        }
    }

    /// Reads a pair, the first register of the pair being the high byte.
    pub fn pair_val(&self, pair: RegisterPair) -> u16 {
        match pair {
            RegisterPair::BC => u16::from_be_bytes([self.b, self.c]),
            RegisterPair::DE => u16::from_be_bytes([self.d, self.e]),
            RegisterPair::HL => u16::from_be_bytes([self.h, self.l]),
            RegisterPair::SP => self.sp,
        }
    }

    pub fn set_pair_val(&mut self, pair: RegisterPair, value: u16) {
        let [high, low] = value.to_be_bytes();
        match pair {
            RegisterPair::BC => {
                self.b = high;
                self.c = low;
            }
            RegisterPair::DE => {
                self.d = high;
                self.e = low;
            }
            RegisterPair::HL => {
                self.h = high;
                self.l = low;
            }
            RegisterPair::SP => self.sp = value,
        }
    }

    /// Address of the `M` pseudo register.
    pub fn hl(&self) -> u16 {
        self.pair_val(RegisterPair::HL)
    }
}
