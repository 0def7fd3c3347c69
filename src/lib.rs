/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! # Intel 8080 instruction core
//!
//! This crate decodes and executes the documented Intel 8080 instruction set, one instruction at
//! a time. It is meant to be embedded in a larger emulator which owns the memory, the devices
//! and the timing.
//!
//! The main struct is [`Proc8080`](proc_state/struct.Proc8080.html) which holds the state of a
//! 8080 processor (flags, registers, interrupt enable and halt). Memory stays with the caller and
//! is lent to every [`step`](proc_state/struct.Proc8080.html#method.step).
//!
//! The [`opcode`](opcode/index.html) module exposes the decoding table on its own, so that a
//! disassembler can be built with [`disassemble`](opcode/fn.disassemble.html).
//!
//! ```
//! use i8080_core::proc_state::Proc8080;
//!
//! let mut memory = vec![0u8; 0x10000];
//! // MVI A,$3c ; ADI $c2 ; HLT
//! memory[..5].copy_from_slice(&[0x3e, 0x3c, 0xc6, 0xc2, 0x76]);
//!
//! let mut cpu = Proc8080::reset();
//! while !cpu.is_halted() {
//!     cpu.step(&mut memory).unwrap();
//! }
//! assert_eq!(cpu.registers().a, 0xfe);
//! assert!(cpu.flags().s);
//! ```

pub mod error;
pub mod opcode;
pub mod proc_state;

pub use crate::error::{Error, Result};
