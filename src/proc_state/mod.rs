/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

mod flags;
mod memory;
mod registers;

use std::sync::Once;

use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::opcode::Instruction::*;
use crate::opcode::{self, AluOp, Condition, OpCode, Operand, RegisterPair};
pub use self::flags::{add_with_carry, add_words, parity, Flags};
use self::memory::{check_size, fetch, Memory};
pub use self::memory::MEMORY_SIZE;
pub use self::registers::Registers;

/// Interface used by `Proc8080` for `IN` and `OUT` instructions.
///
/// The 8080 communicates with external devices via the instructions `IN` (the CPU reads from the
/// databus on a given port) and `OUT` (the CPU writes to a given port). Reading and writing to
/// the bus can do anything depending on the hardware (playing a sound, asking specialized
/// hardware to perform a computation, reading user keypresses...).
///
/// This trait is intended to be implemented by the user of the library in order to plug devices
/// into the emulator.
pub trait DataBus {
    /// Called by `Proc8080` when it applies a `IN` instruction
    fn read_port(&mut self, port: u8) -> u8;

    /// Called by `Proc8080` when it applies a `OUT` instruction
    fn write_port(&mut self, port: u8, value: u8);
}

/// A bus with nothing attached: every port reads as `0x00` and writes are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedBus;

impl DataBus for DisconnectedBus {
    fn read_port(&mut self, _port: u8) -> u8 {
        0x00
    }

    fn write_port(&mut self, _port: u8, _value: u8) {}
}

enum Flow {
    Next,
    Jump(u16),
}

static TABLE_CHECK: Once = Once::new();

fn check_opcode_table() {
    TABLE_CHECK.call_once(|| match opcode::validate_table() {
        Ok(()) => debug!("opcode table validated, {} entries", opcode::OPCODE_TABLE.len()),
        Err(err) => panic!("{}", err),
    });
}

/// The processor state: flags, registers, interrupt enable and halt.
///
/// Memory is not part of the state. It belongs to the caller, who lends it to every call of
/// [`step`](#method.step), so several processors can be driven independently and a state can be
/// copied or compared freely.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Proc8080 {
    flags: Flags,
    registers: Registers,
    interrupts_enabled: bool,
    halted: bool,
}

impl Proc8080 {
    /// Power-on state: every register and flag cleared, `PC` and `SP` at 0, interrupts disabled.
    ///
    /// # Panics
    /// The opcode table is checked the first time a processor is reset, stepped or asked for its
    /// next opcode, whichever comes first. An inconsistent table panics, which can only come from
    /// a defect in this crate.
    pub fn reset() -> Proc8080 {
        check_opcode_table();
        Proc8080::default()
    }

    /// Borrows the processor flags immutably.
    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    pub fn flags_mut(&mut self) -> &mut Flags {
        &mut self.flags
    }

    /// Borrows the processor registers immutably.
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    /// State of the interrupt enable flip-flop, set by `EI` and cleared by `DI`.
    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    /// True after a `HLT`, until an interrupt is accepted.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Executes one instruction with nothing attached to the I/O ports.
    ///
    /// See [`step_with_bus`](#method.step_with_bus).
    pub fn step(&mut self, memory: &mut [u8]) -> Result<OpCode> {
        self.step_with_bus(memory, &mut DisconnectedBus)
    }

    /// Reads the opcode at the program counter and executes it.
    ///
    /// `memory` must cover the whole 64 KiB address space, otherwise `Error::MemoryTooSmall` is
    /// returned and the state is left untouched. On success the executed opcode is returned. A
    /// halted processor executes nothing and reports `HLT`.
    pub fn step_with_bus<Bus: DataBus>(&mut self, memory: &mut [u8], bus: &mut Bus) -> Result<OpCode> {
        check_opcode_table();
        let mut memory = Memory::new(memory)?;
        if self.halted {
            return Ok(OpCode::bare(Hlt));
        }

        let pc = self.registers.pc;
        let bytes = memory.fetch(pc);
        let op = opcode::read_opcode_safe(&bytes);
        trace!("{:04x} {}", pc, op);
        if opcode::is_undocumented(bytes[0]) {
            debug!("{:04x} undocumented opcode {:02x} executed as {}", pc, bytes[0], op);
        }
        self.execute(op, &mut memory, bus);
        Ok(op)
    }

    /// Decodes the instruction at the program counter without executing it.
    pub fn next_opcode(&self, memory: &[u8]) -> Result<OpCode> {
        check_opcode_table();
        check_size(memory)?;
        Ok(opcode::read_opcode_safe(&fetch(memory, self.registers.pc)))
    }

    /// Requests an interrupt which makes the processor run `RST rst_value`.
    ///
    /// Must be called between two steps. The request is accepted only when interrupts are
    /// enabled: the return address is pushed, the program counter jumps to `8 * rst_value`,
    /// interrupts are disabled and a halted processor resumes. Returns whether the interrupt was
    /// accepted.
    pub fn interrupt(&mut self, memory: &mut [u8], rst_value: u8) -> Result<bool> {
        if rst_value > 7 {
            return Err(Error::InvalidRestartVector(rst_value));
        }
        let mut memory = Memory::new(memory)?;
        if !self.interrupts_enabled {
            debug!("RST {} ignored, interrupts are disabled", rst_value);
            return Ok(false);
        }
        self.interrupts_enabled = false;
        self.halted = false;
        let pc = self.registers.pc;
        self.push_stack(pc, &mut memory);
        self.registers.pc = restart_address(rst_value);
        debug!("interrupt RST {} accepted, return address {:04x}", rst_value, pc);
        Ok(true)
    }

    fn execute<Bus: DataBus>(&mut self, op: OpCode, memory: &mut Memory, bus: &mut Bus) {
        let next = self.registers.pc.wrapping_add(op.size());
        let flow = match op.instruction {
            Nop => Flow::Next,

            // Data transfer
            Mov(dst, src) => {
                let value = self.load(src, memory);
                self.store(dst, value, memory);
                Flow::Next
            }
            Mvi(dst) => {
                self.store(dst, op.byte(), memory);
                Flow::Next
            }
            Lxi(pair) => {
                self.registers.set_pair_val(pair, op.word());
                Flow::Next
            }
            Lda => {
                self.registers.a = memory.read(op.word());
                Flow::Next
            }
            Sta => {
                memory.write(op.word(), self.registers.a);
                Flow::Next
            }
            Lhld => {
                let value = memory.read_word(op.word());
                self.registers.set_pair_val(RegisterPair::HL, value);
                Flow::Next
            }
            Shld => {
                memory.write_word(op.word(), self.registers.hl());
                Flow::Next
            }
            Ldax(pair) => {
                self.registers.a = memory.read(self.registers.pair_val(pair));
                Flow::Next
            }
            Stax(pair) => {
                memory.write(self.registers.pair_val(pair), self.registers.a);
                Flow::Next
            }
            Xchg => {
                self.xchg();
                Flow::Next
            }

            // Arithmetic and logical
            Alu(alu_op, src) => {
                let value = self.load(src, memory);
                self.apply_alu(alu_op, value);
                Flow::Next
            }
            AluImmediate(alu_op) => {
                self.apply_alu(alu_op, op.byte());
                Flow::Next
            }
            Inr(dst) => {
                let value = self.load(dst, memory);
                let result = self.flags.increment(value);
                self.store(dst, result, memory);
                Flow::Next
            }
            Dcr(dst) => {
                let value = self.load(dst, memory);
                let result = self.flags.decrement(value);
                self.store(dst, result, memory);
                Flow::Next
            }
            Inx(pair) => {
                let value = self.registers.pair_val(pair).wrapping_add(1);
                self.registers.set_pair_val(pair, value);
                Flow::Next
            }
            Dcx(pair) => {
                let value = self.registers.pair_val(pair).wrapping_sub(1);
                self.registers.set_pair_val(pair, value);
                Flow::Next
            }
            Dad(pair) => {
                self.add_register_pair_to_hl(pair);
                Flow::Next
            }
            Daa => {
                self.decimal_adjust_accumulator();
                Flow::Next
            }
            Rlc => {
                let a = self.registers.a;
                self.registers.a = a.rotate_left(1);
                self.flags.cy = (a & 0x80) != 0;
                Flow::Next
            }
            Rrc => {
                let a = self.registers.a;
                self.registers.a = a.rotate_right(1);
                self.flags.cy = (a & 0x01) != 0;
                Flow::Next
            }
            Ral => {
                let a = self.registers.a;
                self.registers.a = (a << 1) | self.flags.cy as u8;
                self.flags.cy = (a & 0x80) != 0;
                Flow::Next
            }
            Rar => {
                let a = self.registers.a;
                self.registers.a = (a >> 1) | ((self.flags.cy as u8) << 7);
                self.flags.cy = (a & 0x01) != 0;
                Flow::Next
            }
            Cma => {
                self.registers.a = !self.registers.a;
                Flow::Next
            }
            Cmc => {
                self.flags.cy = !self.flags.cy;
                Flow::Next
            }
            Stc => {
                self.flags.cy = true;
                Flow::Next
            }

            // Branch
            Jmp => Flow::Jump(op.word()),
            Jcc(cond) => {
                if self.condition_holds(cond) {
                    Flow::Jump(op.word())
                } else {
                    Flow::Next
                }
            }
            Call => self.apply_call(op.word(), next, memory),
            Ccc(cond) => {
                if self.condition_holds(cond) {
                    self.apply_call(op.word(), next, memory)
                } else {
                    Flow::Next
                }
            }
            Ret => self.apply_return(memory),
            Rcc(cond) => {
                if self.condition_holds(cond) {
                    self.apply_return(memory)
                } else {
                    Flow::Next
                }
            }
            Rst(value) => self.apply_call(restart_address(value), next, memory),
            Pchl => Flow::Jump(self.registers.hl()),

            // Stack, I/O, and Machine Control
            Push(pair) => {
                let value = self.registers.pair_val(pair);
                self.push_stack(value, memory);
                Flow::Next
            }
            PushPsw => {
                let value = u16::from_be_bytes([self.registers.a, self.flags.to_processor_status_word()]);
                self.push_stack(value, memory);
                Flow::Next
            }
            Pop(pair) => {
                let value = self.pop_stack(memory);
                self.registers.set_pair_val(pair, value);
                Flow::Next
            }
            PopPsw => {
                let [a, psw] = self.pop_stack(memory).to_be_bytes();
                self.registers.a = a;
                self.flags = Flags::from_processor_status_word(psw);
                Flow::Next
            }
            Xthl => {
                let sp = self.registers.sp;
                let top = memory.read_word(sp);
                memory.write_word(sp, self.registers.hl());
                self.registers.set_pair_val(RegisterPair::HL, top);
                Flow::Next
            }
            Sphl => {
                self.registers.sp = self.registers.hl();
                Flow::Next
            }
            In => {
                self.registers.a = bus.read_port(op.byte());
                Flow::Next
            }
            Out => {
                bus.write_port(op.byte(), self.registers.a);
                Flow::Next
            }
            Ei => {
                debug!("interrupts enabled at {:04x}", self.registers.pc);
                self.interrupts_enabled = true;
                Flow::Next
            }
            Di => {
                debug!("interrupts disabled at {:04x}", self.registers.pc);
                self.interrupts_enabled = false;
                Flow::Next
            }
            Hlt => {
                debug!("halted at {:04x}", self.registers.pc);
                self.halted = true;
                Flow::Next
            }
        };
        self.registers.pc = match flow {
            Flow::Next => next,
            Flow::Jump(addr) => addr,
        };
    }

    fn load(&self, operand: Operand, memory: &Memory) -> u8 {
        match operand {
            Operand::Reg(reg) => self.registers.reg_val(reg),
            Operand::M => memory.read(self.registers.hl()),
        }
    }

    fn store(&mut self, operand: Operand, value: u8, memory: &mut Memory) {
        match operand {
            Operand::Reg(reg) => self.registers.set_reg_val(reg, value),
            Operand::M => memory.write(self.registers.hl(), value),
        }
    }

    fn xchg(&mut self) {
        let de = self.registers.pair_val(RegisterPair::DE);
        let hl = self.registers.hl();

        self.registers.set_pair_val(RegisterPair::DE, hl);
        self.registers.set_pair_val(RegisterPair::HL, de);
    }

    fn apply_alu(&mut self, op: AluOp, value: u8) {
        let a = self.registers.a;
        let carry = self.flags.cy;
        match op {
            AluOp::Add => self.registers.a = self.flags.add(a, value, false),
            AluOp::Adc => self.registers.a = self.flags.add(a, value, carry),
            AluOp::Sub => self.registers.a = self.flags.sub(a, value, false),
            AluOp::Sbb => self.registers.a = self.flags.sub(a, value, carry),
            AluOp::Ana => self.registers.a = self.flags.and(a, value),
            AluOp::Xra => self.registers.a = self.flags.xor(a, value),
            AluOp::Ora => self.registers.a = self.flags.or(a, value),
            AluOp::Cmp => {
                self.flags.sub(a, value, false);
            }
        }
    }

    fn add_register_pair_to_hl(&mut self, pair: RegisterPair) {
        let (result, carry) = add_words(self.registers.hl(), self.registers.pair_val(pair));
        self.registers.set_pair_val(RegisterPair::HL, result);
        self.flags.cy = carry;
    }

    // A carry out of bit 7 from the low correction counts as a carry for the high one.
    fn decimal_adjust_accumulator(&mut self) {
        let a = self.registers.a;
        let low_correction = if self.flags.ac || (a & 0x0f) > 9 { 0x06 } else { 0x00 };
        let (a, low_carry, aux_carry) = add_with_carry(a, low_correction, false);

        let carry = self.flags.cy || low_carry;
        let high_correction = if carry || (a >> 4) > 9 { 0x60 } else { 0x00 };
        let (a, high_carry, _) = add_with_carry(a, high_correction, false);

        self.registers.a = a;
        self.flags.ac = aux_carry;
        self.flags.cy = carry || high_carry;
        self.flags.set_zsp(a);
    }

    fn condition_holds(&self, cond: Condition) -> bool {
        match cond {
            Condition::NotZero => !self.flags.z,
            Condition::Zero => self.flags.z,
            Condition::NoCarry => !self.flags.cy,
            Condition::Carry => self.flags.cy,
            Condition::ParityOdd => !self.flags.p,
            Condition::ParityEven => self.flags.p,
            Condition::Plus => !self.flags.s,
            Condition::Minus => self.flags.s,
        }
    }

    fn apply_call(&mut self, addr: u16, return_addr: u16, memory: &mut Memory) -> Flow {
        self.push_stack(return_addr, memory);
        Flow::Jump(addr)
    }

    fn apply_return(&mut self, memory: &Memory) -> Flow {
        Flow::Jump(self.pop_stack(memory))
    }

    fn push_stack(&mut self, value: u16, memory: &mut Memory) {
        let sp = self.registers.sp.wrapping_sub(2);
        memory.write_word(sp, value);
        self.registers.sp = sp;
    }

    fn pop_stack(&mut self, memory: &Memory) -> u16 {
        let sp = self.registers.sp;
        self.registers.sp = sp.wrapping_add(2);
        memory.read_word(sp)
    }
}

fn restart_address(rst_value: u8) -> u16 {
    u16::from(rst_value & 0x07) * 8
}
