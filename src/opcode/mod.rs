/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

mod opcodes;
mod table;

pub use self::opcodes::{AluOp, Condition, Instruction, OpCode, Operand, Register, RegisterPair};
pub use self::table::{is_undocumented, validate_table, TableEntry, OPCODE_TABLE};

use crate::error::{Error, Result};

/// A parser which takes a slice of 3 bytes and cannot fail.
///
/// Bytes past the instruction length are ignored.
pub fn read_opcode_safe(bytes: &[u8; 3]) -> OpCode {
    let entry = OPCODE_TABLE[bytes[0] as usize];
    let data = match entry.operand_bytes {
        0 => [0, 0],
        1 => [bytes[1], 0],
        _ => [bytes[1], bytes[2]],
    };
    OpCode::new(entry.instruction, data)
}

/// Read a slice of bytes and returns an opcode, possibly with its data.
///
/// The parsing fails if the slice is empty or too short to hold the operands.
pub fn read_opcode(bytes: &[u8]) -> Result<OpCode> {
    let first = *bytes.first().ok_or(Error::UnexpectedEndOfInput)?;
    let entry = OPCODE_TABLE[first as usize];
    let size = entry.operand_bytes as usize + 1;
    if bytes.len() < size {
        return Err(Error::UnexpectedEndOfInput);
    }
    let mut padded = [first, 0, 0];
    padded[1..size].copy_from_slice(&bytes[1..size]);
    Ok(read_opcode_safe(&padded))
}

/// Disassembles the instruction at `pc` in `buffer`.
///
/// Returns the assembler text and the instruction length in bytes, so that a listing can be
/// produced by adding the length to `pc`.
pub fn disassemble(buffer: &[u8], pc: u16) -> Result<(String, u16)> {
    let bytes = buffer.get(pc as usize..).ok_or(Error::UnexpectedEndOfInput)?;
    let op = read_opcode(bytes)?;
    Ok((op.to_string(), op.size()))
}

#[cfg(test)]
mod tests {
    use super::Instruction::*;
    use super::*;

    #[test]
    fn read_opcodes() {
        let bytes = [0x13, 0xf3, 0x04, 0x87];
        assert_eq!(read_opcode(&bytes[0..]), Ok(OpCode::bare(Inx(RegisterPair::DE))));
        assert_eq!(read_opcode(&bytes[1..]), Ok(OpCode::bare(Di)));
        assert_eq!(read_opcode(&bytes[2..]), Ok(OpCode::bare(Inr(Operand::Reg(Register::B)))));
        assert_eq!(
            read_opcode(&bytes[3..]),
            Ok(OpCode::bare(Alu(AluOp::Add, Operand::Reg(Register::A))))
        );
    }

    #[test]
    fn read_complex_opcodes() {
        assert_eq!(read_opcode(&[0xd6, 0xf3]), Ok(OpCode::with_byte(AluImmediate(AluOp::Sub), 0xf3)));
        assert_eq!(
            read_opcode(&[0xd4, 0x87, 0x97]),
            Ok(OpCode::with_word(Ccc(Condition::NoCarry), 0x9787))
        );
    }

    #[test]
    fn truncated_input_is_an_error() {
        assert_eq!(read_opcode(&[]), Err(Error::UnexpectedEndOfInput));
        assert_eq!(read_opcode(&[0xc3, 0x00]), Err(Error::UnexpectedEndOfInput));
        assert_eq!(read_opcode(&[0x3e]), Err(Error::UnexpectedEndOfInput));
    }

    #[test]
    fn safe_reader_ignores_trailing_bytes() {
        assert_eq!(read_opcode_safe(&[0x00, 0xff, 0xff]), OpCode::bare(Nop));
        assert_eq!(
            read_opcode_safe(&[0x06, 0x42, 0xff]),
            OpCode::with_byte(Mvi(Operand::Reg(Register::B)), 0x42)
        );
    }

    #[test]
    fn disassemble_a_listing() {
        let program = [0x31, 0x00, 0x24, 0x3e, 0x3c, 0xc6, 0xc2, 0x76];
        let mut pc = 0;
        let mut listing = Vec::new();
        while (pc as usize) < program.len() {
            let (text, size) = disassemble(&program, pc).unwrap();
            listing.push(text);
            pc += size;
        }
        assert_eq!(listing, vec!["LXI SP,$2400", "MVI A,$3c", "ADI $c2", "HLT"]);
    }

    #[test]
    fn disassemble_out_of_buffer() {
        assert_eq!(disassemble(&[0x00], 4), Err(Error::UnexpectedEndOfInput));
    }
}
