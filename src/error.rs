/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use thiserror::Error;

use crate::proc_state::MEMORY_SIZE;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong when driving the processor.
///
/// None of these can be produced by a program running on the emulated 8080: they all come from
/// the host handing the core something it cannot work with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The memory slice given to `step` or `interrupt` does not cover the whole address space.
    #[error("memory image is {len} bytes but the 8080 address space needs {}", MEMORY_SIZE)]
    MemoryTooSmall { len: usize },

    /// A buffer ended in the middle of an instruction.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("RST vector {0} is out of range, only 0 to 7 exist")]
    InvalidRestartVector(u8),

    /// The opcode table does not agree with the 8080 encoding.
    #[error("opcode table entry {opcode:#04x} is invalid: {reason}")]
    InvalidTableEntry { opcode: u8, reason: &'static str },
}
