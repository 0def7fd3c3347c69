/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::fmt::{self, Display, Formatter};

use self::Instruction::*;

/// One of the seven 8 bit registers.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Register {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl Display for Register {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Selects a 16 bit view over the register file.
///
/// `BC`, `DE` and `HL` combine two byte registers, high byte first. `SP` addresses the stack
/// pointer directly.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum RegisterPair {
    BC,
    DE,
    HL,
    SP,
}

impl Display for RegisterPair {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        // assembler syntax names a pair by its high register
        match *self {
            RegisterPair::BC => write!(f, "B"),
            RegisterPair::DE => write!(f, "D"),
            RegisterPair::HL => write!(f, "H"),
            RegisterPair::SP => write!(f, "SP"),
        }
    }
}

/// An 8 bit operand: a register, or the memory byte addressed by HL (`M`).
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Operand {
    Reg(Register),
    M,
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Operand::Reg(reg) => write!(f, "{}", reg),
            Operand::M => write!(f, "M"),
        }
    }
}

/// The eight accumulator operations sharing the `10 aaa sss` and `11 aaa 110` encodings.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
}

impl AluOp {
    fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Adc => "ADC",
            AluOp::Sub => "SUB",
            AluOp::Sbb => "SBB",
            AluOp::Ana => "ANA",
            AluOp::Xra => "XRA",
            AluOp::Ora => "ORA",
            AluOp::Cmp => "CMP",
        }
    }

    fn immediate_mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADI",
            AluOp::Adc => "ACI",
            AluOp::Sub => "SUI",
            AluOp::Sbb => "SBI",
            AluOp::Ana => "ANI",
            AluOp::Xra => "XRI",
            AluOp::Ora => "ORI",
            AluOp::Cmp => "CPI",
        }
    }
}

/// Branch conditions, in encoding order (`ccc` field of the conditional jumps, calls and returns).
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Condition {
    NotZero,
    Zero,
    NoCarry,
    Carry,
    ParityOdd,
    ParityEven,
    Plus,
    Minus,
}

impl Condition {
    fn suffix(self) -> &'static str {
        match self {
            Condition::NotZero => "NZ",
            Condition::Zero => "Z",
            Condition::NoCarry => "NC",
            Condition::Carry => "C",
            Condition::ParityOdd => "PO",
            Condition::ParityEven => "PE",
            Condition::Plus => "P",
            Condition::Minus => "M",
        }
    }
}

/// What an opcode does, without its operand bytes.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Instruction {
    Nop,

    // Data transfer
    Mov(Operand, Operand),
    Mvi(Operand),
    Lxi(RegisterPair),
    Lda,
    Sta,
    Lhld,
    Shld,
    Ldax(RegisterPair),
    Stax(RegisterPair),
    Xchg,

    // Arithmetic and logical
    Alu(AluOp, Operand),
    AluImmediate(AluOp),
    Inr(Operand),
    Dcr(Operand),
    Inx(RegisterPair),
    Dcx(RegisterPair),
    Dad(RegisterPair),
    Daa,
    Rlc,
    Rrc,
    Ral,
    Rar,
    Cma,
    Cmc,
    Stc,

    // Branch
    Jmp,
    Jcc(Condition),
    Call,
    Ccc(Condition),
    Ret,
    Rcc(Condition),
    Rst(u8),
    Pchl,

    // Stack, I/O, and Machine Control
    Push(RegisterPair),
    PushPsw,
    Pop(RegisterPair),
    PopPsw,
    Xthl,
    Sphl,
    In,
    Out,
    Ei,
    Di,
    Hlt,
}

impl Instruction {
    /// Length in bytes of the encoded instruction, opcode included.
    pub fn size(&self) -> u16 {
        match *self {
            Lxi(_) | Lda | Sta | Lhld | Shld | Jmp | Jcc(_) | Call | Ccc(_) => 3,
            Mvi(_) | AluImmediate(_) | In | Out => 2,
            _ => 1,
        }
    }
}

/// A decoded instruction together with its operand bytes.
///
/// `data` holds the operand bytes in memory order: for a one byte operand only `data[0]` is
/// meaningful, a 16 bit operand is stored low byte first.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct OpCode {
    pub instruction: Instruction,
    pub data: [u8; 2],
}

impl OpCode {
    pub fn new(instruction: Instruction, data: [u8; 2]) -> OpCode {
        OpCode { instruction, data }
    }

    /// An opcode without operand bytes.
    pub fn bare(instruction: Instruction) -> OpCode {
        OpCode { instruction, data: [0, 0] }
    }

    pub fn with_byte(instruction: Instruction, value: u8) -> OpCode {
        OpCode { instruction, data: [value, 0] }
    }

    pub fn with_word(instruction: Instruction, value: u16) -> OpCode {
        OpCode { instruction, data: value.to_le_bytes() }
    }

    pub fn size(&self) -> u16 {
        self.instruction.size()
    }

    pub fn byte(&self) -> u8 {
        self.data[0]
    }

    pub fn word(&self) -> u16 {
        u16::from_le_bytes(self.data)
    }
}

impl From<Instruction> for OpCode {
    fn from(instruction: Instruction) -> OpCode {
        OpCode::bare(instruction)
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let byte = self.byte();
        let word = self.word();
        match self.instruction {
            Nop => write!(f, "NOP"),

            Mov(dst, src) => write!(f, "MOV {},{}", dst, src),
            Mvi(dst) => write!(f, "MVI {},${:02x}", dst, byte),
            Lxi(rp) => write!(f, "LXI {},${:04x}", rp, word),
            Lda => write!(f, "LDA ${:04x}", word),
            Sta => write!(f, "STA ${:04x}", word),
            Lhld => write!(f, "LHLD ${:04x}", word),
            Shld => write!(f, "SHLD ${:04x}", word),
            Ldax(rp) => write!(f, "LDAX {}", rp),
            Stax(rp) => write!(f, "STAX {}", rp),
            Xchg => write!(f, "XCHG"),

            Alu(op, src) => write!(f, "{} {}", op.mnemonic(), src),
            AluImmediate(op) => write!(f, "{} ${:02x}", op.immediate_mnemonic(), byte),
            Inr(dst) => write!(f, "INR {}", dst),
            Dcr(dst) => write!(f, "DCR {}", dst),
            Inx(rp) => write!(f, "INX {}", rp),
            Dcx(rp) => write!(f, "DCX {}", rp),
            Dad(rp) => write!(f, "DAD {}", rp),
            Daa => write!(f, "DAA"),
            Rlc => write!(f, "RLC"),
            Rrc => write!(f, "RRC"),
            Ral => write!(f, "RAL"),
            Rar => write!(f, "RAR"),
            Cma => write!(f, "CMA"),
            Cmc => write!(f, "CMC"),
            Stc => write!(f, "STC"),

            Jmp => write!(f, "JMP ${:04x}", word),
            Jcc(cond) => write!(f, "J{} ${:04x}", cond.suffix(), word),
            Call => write!(f, "CALL ${:04x}", word),
            Ccc(cond) => write!(f, "C{} ${:04x}", cond.suffix(), word),
            Ret => write!(f, "RET"),
            Rcc(cond) => write!(f, "R{}", cond.suffix()),
            Rst(n) => write!(f, "RST {}", n),
            Pchl => write!(f, "PCHL"),

            Push(rp) => write!(f, "PUSH {}", rp),
            PushPsw => write!(f, "PUSH PSW"),
            Pop(rp) => write!(f, "POP {}", rp),
            PopPsw => write!(f, "POP PSW"),
            Xthl => write!(f, "XTHL"),
            Sphl => write!(f, "SPHL"),
            In => write!(f, "IN ${:02x}", byte),
            Out => write!(f, "OUT ${:02x}", byte),
            Ei => write!(f, "EI"),
            Di => write!(f, "DI"),
            Hlt => write!(f, "HLT"),
        }
    }
}
