/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The opcode table: one entry per byte value, each naming an instruction and the number of
//! operand bytes following the opcode.
//!
//! The 8080 has no illegal opcodes. The twelve byte values Intel left undocumented behave like a
//! documented instruction and are listed as such: `0x08`..`0x38` step 8 are `NOP`, `0xcb` is
//! `JMP`, `0xd9` is `RET` and `0xdd`, `0xed`, `0xfd` are `CALL`.

use super::opcodes::AluOp::*;
use super::opcodes::Condition::*;
use super::opcodes::Instruction::{self, *};
use super::opcodes::Operand::{self, Reg as R, M};
use super::opcodes::Register::*;
use super::opcodes::RegisterPair::{self, *};
use super::opcodes::{AluOp, Condition};
use crate::error::{Error, Result};

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct TableEntry {
    pub instruction: Instruction,
    pub operand_bytes: u8,
}

const fn entry(instruction: Instruction, operand_bytes: u8) -> TableEntry {
    TableEntry { instruction, operand_bytes }
}

pub static OPCODE_TABLE: [TableEntry; 256] = [
    /* 0x00 */ entry(Nop, 0),
    /* 0x01 */ entry(Lxi(BC), 2),
    /* 0x02 */ entry(Stax(BC), 0),
    /* 0x03 */ entry(Inx(BC), 0),
    /* 0x04 */ entry(Inr(R(B)), 0),
    /* 0x05 */ entry(Dcr(R(B)), 0),
    /* 0x06 */ entry(Mvi(R(B)), 1),
    /* 0x07 */ entry(Rlc, 0),
    /* 0x08 */ entry(Nop, 0),
    /* 0x09 */ entry(Dad(BC), 0),
    /* 0x0a */ entry(Ldax(BC), 0),
    /* 0x0b */ entry(Dcx(BC), 0),
    /* 0x0c */ entry(Inr(R(C)), 0),
    /* 0x0d */ entry(Dcr(R(C)), 0),
    /* 0x0e */ entry(Mvi(R(C)), 1),
    /* 0x0f */ entry(Rrc, 0),
    /* 0x10 */ entry(Nop, 0),
    /* 0x11 */ entry(Lxi(DE), 2),
    /* 0x12 */ entry(Stax(DE), 0),
    /* 0x13 */ entry(Inx(DE), 0),
    /* 0x14 */ entry(Inr(R(D)), 0),
    /* 0x15 */ entry(Dcr(R(D)), 0),
    /* 0x16 */ entry(Mvi(R(D)), 1),
    /* 0x17 */ entry(Ral, 0),
    /* 0x18 */ entry(Nop, 0),
    /* 0x19 */ entry(Dad(DE), 0),
    /* 0x1a */ entry(Ldax(DE), 0),
    /* 0x1b */ entry(Dcx(DE), 0),
    /* 0x1c */ entry(Inr(R(E)), 0),
    /* 0x1d */ entry(Dcr(R(E)), 0),
    /* 0x1e */ entry(Mvi(R(E)), 1),
    /* 0x1f */ entry(Rar, 0),
    /* 0x20 */ entry(Nop, 0),
    /* 0x21 */ entry(Lxi(HL), 2),
    /* 0x22 */ entry(Shld, 2),
    /* 0x23 */ entry(Inx(HL), 0),
    /* 0x24 */ entry(Inr(R(H)), 0),
    /* 0x25 */ entry(Dcr(R(H)), 0),
    /* 0x26 */ entry(Mvi(R(H)), 1),
    /* 0x27 */ entry(Daa, 0),
    /* 0x28 */ entry(Nop, 0),
    /* 0x29 */ entry(Dad(HL), 0),
    /* 0x2a */ entry(Lhld, 2),
    /* 0x2b */ entry(Dcx(HL), 0),
    /* 0x2c */ entry(Inr(R(L)), 0),
    /* 0x2d */ entry(Dcr(R(L)), 0),
    /* 0x2e */ entry(Mvi(R(L)), 1),
    /* 0x2f */ entry(Cma, 0),
    /* 0x30 */ entry(Nop, 0),
    /* 0x31 */ entry(Lxi(SP), 2),
    /* 0x32 */ entry(Sta, 2),
    /* 0x33 */ entry(Inx(SP), 0),
    /* 0x34 */ entry(Inr(M), 0),
    /* 0x35 */ entry(Dcr(M), 0),
    /* 0x36 */ entry(Mvi(M), 1),
    /* 0x37 */ entry(Stc, 0),
    /* 0x38 */ entry(Nop, 0),
    /* 0x39 */ entry(Dad(SP), 0),
    /* 0x3a */ entry(Lda, 2),
    /* 0x3b */ entry(Dcx(SP), 0),
    /* 0x3c */ entry(Inr(R(A)), 0),
    /* 0x3d */ entry(Dcr(R(A)), 0),
    /* 0x3e */ entry(Mvi(R(A)), 1),
    /* 0x3f */ entry(Cmc, 0),
    /* 0x40 */ entry(Mov(R(B), R(B)), 0),
    /* 0x41 */ entry(Mov(R(B), R(C)), 0),
    /* 0x42 */ entry(Mov(R(B), R(D)), 0),
    /* 0x43 */ entry(Mov(R(B), R(E)), 0),
    /* 0x44 */ entry(Mov(R(B), R(H)), 0),
    /* 0x45 */ entry(Mov(R(B), R(L)), 0),
    /* 0x46 */ entry(Mov(R(B), M), 0),
    /* 0x47 */ entry(Mov(R(B), R(A)), 0),
    /* 0x48 */ entry(Mov(R(C), R(B)), 0),
    /* 0x49 */ entry(Mov(R(C), R(C)), 0),
    /* 0x4a */ entry(Mov(R(C), R(D)), 0),
    /* 0x4b */ entry(Mov(R(C), R(E)), 0),
    /* 0x4c */ entry(Mov(R(C), R(H)), 0),
    /* 0x4d */ entry(Mov(R(C), R(L)), 0),
    /* 0x4e */ entry(Mov(R(C), M), 0),
    /* 0x4f */ entry(Mov(R(C), R(A)), 0),
    /* 0x50 */ entry(Mov(R(D), R(B)), 0),
    /* 0x51 */ entry(Mov(R(D), R(C)), 0),
    /* 0x52 */ entry(Mov(R(D), R(D)), 0),
    /* 0x53 */ entry(Mov(R(D), R(E)), 0),
    /* 0x54 */ entry(Mov(R(D), R(H)), 0),
    /* 0x55 */ entry(Mov(R(D), R(L)), 0),
    /* 0x56 */ entry(Mov(R(D), M), 0),
    /* 0x57 */ entry(Mov(R(D), R(A)), 0),
    /* 0x58 */ entry(Mov(R(E), R(B)), 0),
    /* 0x59 */ entry(Mov(R(E), R(C)), 0),
    /* 0x5a */ entry(Mov(R(E), R(D)), 0),
    /* 0x5b */ entry(Mov(R(E), R(E)), 0),
    /* 0x5c */ entry(Mov(R(E), R(H)), 0),
    /* 0x5d */ entry(Mov(R(E), R(L)), 0),
    /* 0x5e */ entry(Mov(R(E), M), 0),
    /* 0x5f */ entry(Mov(R(E), R(A)), 0),
    /* 0x60 */ entry(Mov(R(H), R(B)), 0),
    /* 0x61 */ entry(Mov(R(H), R(C)), 0),
    /* 0x62 */ entry(Mov(R(H), R(D)), 0),
    /* 0x63 */ entry(Mov(R(H), R(E)), 0),
    /* 0x64 */ entry(Mov(R(H), R(H)), 0),
    /* 0x65 */ entry(Mov(R(H), R(L)), 0),
    /* 0x66 */ entry(Mov(R(H), M), 0),
    /* 0x67 */ entry(Mov(R(H), R(A)), 0),
    /* 0x68 */ entry(Mov(R(L), R(B)), 0),
    /* 0x69 */ entry(Mov(R(L), R(C)), 0),
    /* 0x6a */ entry(Mov(R(L), R(D)), 0),
    /* 0x6b */ entry(Mov(R(L), R(E)), 0),
    /* 0x6c */ entry(Mov(R(L), R(H)), 0),
    /* 0x6d */ entry(Mov(R(L), R(L)), 0),
    /* 0x6e */ entry(Mov(R(L), M), 0),
    /* 0x6f */ entry(Mov(R(L), R(A)), 0),
    /* 0x70 */ entry(Mov(M, R(B)), 0),
    /* 0x71 */ entry(Mov(M, R(C)), 0),
    /* 0x72 */ entry(Mov(M, R(D)), 0),
    /* 0x73 */ entry(Mov(M, R(E)), 0),
    /* 0x74 */ entry(Mov(M, R(H)), 0),
    /* 0x75 */ entry(Mov(M, R(L)), 0),
    /* 0x76 */ entry(Hlt, 0),
    /* 0x77 */ entry(Mov(M, R(A)), 0),
    /* 0x78 */ entry(Mov(R(A), R(B)), 0),
    /* 0x79 */ entry(Mov(R(A), R(C)), 0),
    /* 0x7a */ entry(Mov(R(A), R(D)), 0),
    /* 0x7b */ entry(Mov(R(A), R(E)), 0),
    /* 0x7c */ entry(Mov(R(A), R(H)), 0),
    /* 0x7d */ entry(Mov(R(A), R(L)), 0),
    /* 0x7e */ entry(Mov(R(A), M), 0),
    /* 0x7f */ entry(Mov(R(A), R(A)), 0),
    /* 0x80 */ entry(Alu(Add, R(B)), 0),
    /* 0x81 */ entry(Alu(Add, R(C)), 0),
    /* 0x82 */ entry(Alu(Add, R(D)), 0),
    /* 0x83 */ entry(Alu(Add, R(E)), 0),
    /* 0x84 */ entry(Alu(Add, R(H)), 0),
    /* 0x85 */ entry(Alu(Add, R(L)), 0),
    /* 0x86 */ entry(Alu(Add, M), 0),
    /* 0x87 */ entry(Alu(Add, R(A)), 0),
    /* 0x88 */ entry(Alu(Adc, R(B)), 0),
    /* 0x89 */ entry(Alu(Adc, R(C)), 0),
    /* 0x8a */ entry(Alu(Adc, R(D)), 0),
    /* 0x8b */ entry(Alu(Adc, R(E)), 0),
    /* 0x8c */ entry(Alu(Adc, R(H)), 0),
    /* 0x8d */ entry(Alu(Adc, R(L)), 0),
    /* 0x8e */ entry(Alu(Adc, M), 0),
    /* 0x8f */ entry(Alu(Adc, R(A)), 0),
    /* 0x90 */ entry(Alu(Sub, R(B)), 0),
    /* 0x91 */ entry(Alu(Sub, R(C)), 0),
    /* 0x92 */ entry(Alu(Sub, R(D)), 0),
    /* 0x93 */ entry(Alu(Sub, R(E)), 0),
    /* 0x94 */ entry(Alu(Sub, R(H)), 0),
    /* 0x95 */ entry(Alu(Sub, R(L)), 0),
    /* 0x96 */ entry(Alu(Sub, M), 0),
    /* 0x97 */ entry(Alu(Sub, R(A)), 0),
    /* 0x98 */ entry(Alu(Sbb, R(B)), 0),
    /* 0x99 */ entry(Alu(Sbb, R(C)), 0),
    /* 0x9a */ entry(Alu(Sbb, R(D)), 0),
    /* 0x9b */ entry(Alu(Sbb, R(E)), 0),
    /* 0x9c */ entry(Alu(Sbb, R(H)), 0),
    /* 0x9d */ entry(Alu(Sbb, R(L)), 0),
    /* 0x9e */ entry(Alu(Sbb, M), 0),
    /* 0x9f */ entry(Alu(Sbb, R(A)), 0),
    /* 0xa0 */ entry(Alu(Ana, R(B)), 0),
    /* 0xa1 */ entry(Alu(Ana, R(C)), 0),
    /* 0xa2 */ entry(Alu(Ana, R(D)), 0),
    /* 0xa3 */ entry(Alu(Ana, R(E)), 0),
    /* 0xa4 */ entry(Alu(Ana, R(H)), 0),
    /* 0xa5 */ entry(Alu(Ana, R(L)), 0),
    /* 0xa6 */ entry(Alu(Ana, M), 0),
    /* 0xa7 */ entry(Alu(Ana, R(A)), 0),
    /* 0xa8 */ entry(Alu(Xra, R(B)), 0),
    /* 0xa9 */ entry(Alu(Xra, R(C)), 0),
    /* 0xaa */ entry(Alu(Xra, R(D)), 0),
    /* 0xab */ entry(Alu(Xra, R(E)), 0),
    /* 0xac */ entry(Alu(Xra, R(H)), 0),
    /* 0xad */ entry(Alu(Xra, R(L)), 0),
    /* 0xae */ entry(Alu(Xra, M), 0),
    /* 0xaf */ entry(Alu(Xra, R(A)), 0),
    /* 0xb0 */ entry(Alu(Ora, R(B)), 0),
    /* 0xb1 */ entry(Alu(Ora, R(C)), 0),
    /* 0xb2 */ entry(Alu(Ora, R(D)), 0),
    /* 0xb3 */ entry(Alu(Ora, R(E)), 0),
    /* 0xb4 */ entry(Alu(Ora, R(H)), 0),
    /* 0xb5 */ entry(Alu(Ora, R(L)), 0),
    /* 0xb6 */ entry(Alu(Ora, M), 0),
    /* 0xb7 */ entry(Alu(Ora, R(A)), 0),
    /* 0xb8 */ entry(Alu(Cmp, R(B)), 0),
    /* 0xb9 */ entry(Alu(Cmp, R(C)), 0),
    /* 0xba */ entry(Alu(Cmp, R(D)), 0),
    /* 0xbb */ entry(Alu(Cmp, R(E)), 0),
    /* 0xbc */ entry(Alu(Cmp, R(H)), 0),
    /* 0xbd */ entry(Alu(Cmp, R(L)), 0),
    /* 0xbe */ entry(Alu(Cmp, M), 0),
    /* 0xbf */ entry(Alu(Cmp, R(A)), 0),
    /* 0xc0 */ entry(Rcc(NotZero), 0),
    /* 0xc1 */ entry(Pop(BC), 0),
    /* 0xc2 */ entry(Jcc(NotZero), 2),
    /* 0xc3 */ entry(Jmp, 2),
    /* 0xc4 */ entry(Ccc(NotZero), 2),
    /* 0xc5 */ entry(Push(BC), 0),
    /* 0xc6 */ entry(AluImmediate(Add), 1),
    /* 0xc7 */ entry(Rst(0), 0),
    /* 0xc8 */ entry(Rcc(Zero), 0),
    /* 0xc9 */ entry(Ret, 0),
    /* 0xca */ entry(Jcc(Zero), 2),
    /* 0xcb */ entry(Jmp, 2),
    /* 0xcc */ entry(Ccc(Zero), 2),
    /* 0xcd */ entry(Call, 2),
    /* 0xce */ entry(AluImmediate(Adc), 1),
    /* 0xcf */ entry(Rst(1), 0),
    /* 0xd0 */ entry(Rcc(NoCarry), 0),
    /* 0xd1 */ entry(Pop(DE), 0),
    /* 0xd2 */ entry(Jcc(NoCarry), 2),
    /* 0xd3 */ entry(Out, 1),
    /* 0xd4 */ entry(Ccc(NoCarry), 2),
    /* 0xd5 */ entry(Push(DE), 0),
    /* 0xd6 */ entry(AluImmediate(Sub), 1),
    /* 0xd7 */ entry(Rst(2), 0),
    /* 0xd8 */ entry(Rcc(Carry), 0),
    /* 0xd9 */ entry(Ret, 0),
    /* 0xda */ entry(Jcc(Carry), 2),
    /* 0xdb */ entry(In, 1),
    /* 0xdc */ entry(Ccc(Carry), 2),
    /* 0xdd */ entry(Call, 2),
    /* 0xde */ entry(AluImmediate(Sbb), 1),
    /* 0xdf */ entry(Rst(3), 0),
    /* 0xe0 */ entry(Rcc(ParityOdd), 0),
    /* 0xe1 */ entry(Pop(HL), 0),
    /* 0xe2 */ entry(Jcc(ParityOdd), 2),
    /* 0xe3 */ entry(Xthl, 0),
    /* 0xe4 */ entry(Ccc(ParityOdd), 2),
    /* 0xe5 */ entry(Push(HL), 0),
    /* 0xe6 */ entry(AluImmediate(Ana), 1),
    /* 0xe7 */ entry(Rst(4), 0),
    /* 0xe8 */ entry(Rcc(ParityEven), 0),
    /* 0xe9 */ entry(Pchl, 0),
    /* 0xea */ entry(Jcc(ParityEven), 2),
    /* 0xeb */ entry(Xchg, 0),
    /* 0xec */ entry(Ccc(ParityEven), 2),
    /* 0xed */ entry(Call, 2),
    /* 0xee */ entry(AluImmediate(Xra), 1),
    /* 0xef */ entry(Rst(5), 0),
    /* 0xf0 */ entry(Rcc(Plus), 0),
    /* 0xf1 */ entry(PopPsw, 0),
    /* 0xf2 */ entry(Jcc(Plus), 2),
    /* 0xf3 */ entry(Di, 0),
    /* 0xf4 */ entry(Ccc(Plus), 2),
    /* 0xf5 */ entry(PushPsw, 0),
    /* 0xf6 */ entry(AluImmediate(Ora), 1),
    /* 0xf7 */ entry(Rst(6), 0),
    /* 0xf8 */ entry(Rcc(Minus), 0),
    /* 0xf9 */ entry(Sphl, 0),
    /* 0xfa */ entry(Jcc(Minus), 2),
    /* 0xfb */ entry(Ei, 0),
    /* 0xfc */ entry(Ccc(Minus), 2),
    /* 0xfd */ entry(Call, 2),
    /* 0xfe */ entry(AluImmediate(Cmp), 1),
    /* 0xff */ entry(Rst(7), 0),
];

/// Checks every entry of [`OPCODE_TABLE`](static.OPCODE_TABLE.html) against the bit fields of
/// the 8080 encoding.
pub fn validate_table() -> Result<()> {
    validate_entries(&OPCODE_TABLE)
}

fn validate_entries(table: &[TableEntry; 256]) -> Result<()> {
    for (index, entry) in table.iter().enumerate() {
        let opcode = index as u8;
        if entry.operand_bytes > 2 || u16::from(entry.operand_bytes) + 1 != entry.instruction.size() {
            return Err(Error::InvalidTableEntry {
                opcode,
                reason: "operand byte count disagrees with the instruction length",
            });
        }
        if entry.instruction != from_fields(opcode) {
            return Err(Error::InvalidTableEntry {
                opcode,
                reason: "instruction disagrees with the opcode bit fields",
            });
        }
    }
    Ok(())
}

/// True for the byte values Intel left out of the documentation.
pub fn is_undocumented(opcode: u8) -> bool {
    matches!(
        opcode,
        0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 | 0xcb | 0xd9 | 0xdd | 0xed | 0xfd
    )
}

fn operand(field: u8) -> Operand {
    match field & 0x07 {
        0 => R(B),
        1 => R(C),
        2 => R(D),
        3 => R(E),
        4 => R(H),
        5 => R(L),
        6 => M,
        _ => R(A),
    }
}

fn pair(field: u8) -> RegisterPair {
    match field & 0x03 {
        0 => BC,
        1 => DE,
        2 => HL,
        _ => SP,
    }
}

fn condition(field: u8) -> Condition {
    match field & 0x07 {
        0 => NotZero,
        1 => Zero,
        2 => NoCarry,
        3 => Carry,
        4 => ParityOdd,
        5 => ParityEven,
        6 => Plus,
        _ => Minus,
    }
}

fn alu(field: u8) -> AluOp {
    match field & 0x07 {
        0 => Add,
        1 => Adc,
        2 => Sub,
        3 => Sbb,
        4 => Ana,
        5 => Xra,
        6 => Ora,
        _ => Cmp,
    }
}

// Decodes `xx yyy zzz` field by field. `validate_entries` compares the result with the table.
fn from_fields(opcode: u8) -> Instruction {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;
    let p = y >> 1;
    let odd = y & 1 == 1;
    match (x, z) {
        (0, 0) => Nop,
        (0, 1) if odd => Dad(pair(p)),
        (0, 1) => Lxi(pair(p)),
        (0, 2) => match y {
            0 => Stax(BC),
            1 => Ldax(BC),
            2 => Stax(DE),
            3 => Ldax(DE),
            4 => Shld,
            5 => Lhld,
            6 => Sta,
            _ => Lda,
        },
        (0, 3) if odd => Dcx(pair(p)),
        (0, 3) => Inx(pair(p)),
        (0, 4) => Inr(operand(y)),
        (0, 5) => Dcr(operand(y)),
        (0, 6) => Mvi(operand(y)),
        (0, _) => [Rlc, Rrc, Ral, Rar, Daa, Cma, Stc, Cmc][y as usize],
        (1, _) if opcode == 0x76 => Hlt,
        (1, _) => Mov(operand(y), operand(z)),
        (2, _) => Alu(alu(y), operand(z)),
        (_, 0) => Rcc(condition(y)),
        (_, 1) => match y {
            1 | 3 => Ret,
            5 => Pchl,
            6 => PopPsw,
            7 => Sphl,
            _ => Pop(pair(p)),
        },
        (_, 2) => Jcc(condition(y)),
        (_, 3) => [Jmp, Jmp, Out, In, Xthl, Xchg, Di, Ei][y as usize],
        (_, 4) => Ccc(condition(y)),
        (_, 5) if odd => Call,
        (_, 5) if p == 3 => PushPsw,
        (_, 5) => Push(pair(p)),
        (_, 6) => AluImmediate(alu(y)),
        _ => Rst(y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_consistent_with_the_encoding() {
        assert_eq!(validate_table(), Ok(()));
    }

    #[test]
    fn wrong_length_is_reported() {
        let mut table = OPCODE_TABLE;
        table[0x3e] = entry(Mvi(R(A)), 2);
        assert_eq!(
            validate_entries(&table),
            Err(Error::InvalidTableEntry {
                opcode: 0x3e,
                reason: "operand byte count disagrees with the instruction length",
            })
        );
    }

    #[test]
    fn wrong_instruction_is_reported() {
        let mut table = OPCODE_TABLE;
        table[0xc9] = entry(Nop, 0);
        match validate_entries(&table) {
            Err(Error::InvalidTableEntry { opcode, .. }) => assert_eq!(opcode, 0xc9),
            other => panic!("unexpected validation result {:?}", other),
        }
    }

    #[test]
    fn twelve_opcodes_are_undocumented() {
        assert_eq!((0..=255u8).filter(|op| is_undocumented(*op)).count(), 12);
        assert!(!is_undocumented(0x00));
        assert!(!is_undocumented(0xcd));
    }

    #[test]
    fn undocumented_opcodes_alias_documented_ones() {
        for opcode in [0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38] {
            assert_eq!(OPCODE_TABLE[opcode].instruction, Nop);
        }
        assert_eq!(OPCODE_TABLE[0xcb].instruction, Jmp);
        assert_eq!(OPCODE_TABLE[0xd9].instruction, Ret);
        for opcode in [0xdd, 0xed, 0xfd] {
            assert_eq!(OPCODE_TABLE[opcode].instruction, Call);
        }
    }
}
