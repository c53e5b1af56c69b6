//! Instruction decoder.
//!
//! Every instruction is three bytes: an opcode followed by two operand
//! bytes. Unused operand bytes are encoded as zero and ignored on decode.

use crate::machine::registers::REGISTER_COUNT;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Encoded length of every instruction in bytes.
pub const INSTRUCTION_LEN: u8 = 3;

/// Decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// No operation
    Nop,

    // ==================== Data Transfer ====================

    /// Load immediate: rd := imm
    Ldi { rd: u8, imm: u8 },

    /// Copy register: rd := rs
    Mov { rd: u8, rs: u8 },

    /// Load from memory: rd := [addr]
    Ld { rd: u8, addr: u8 },

    /// Store to memory: [addr] := rs
    St { rs: u8, addr: u8 },

    // ==================== Arithmetic ====================

    /// Wrapping add: rd := rd + rs
    Add { rd: u8, rs: u8 },

    /// Wrapping subtract: rd := rd - rs
    Sub { rd: u8, rs: u8 },

    /// Wrapping add immediate: rd := rd + imm
    Addi { rd: u8, imm: u8 },

    // ==================== Control Flow ====================

    /// Unconditional jump: pc := addr
    Jmp { addr: u8 },

    /// Jump if zero: if rs = 0 then pc := addr
    Jz { rs: u8, addr: u8 },

    /// Jump if not zero: if rs != 0 then pc := addr
    Jnz { rs: u8, addr: u8 },

    /// Stop fetching instructions
    Hlt,
}

struct Opcode;

impl Opcode {
    const NOP: u8 = 0x00;
    const LDI: u8 = 0x01;
    const MOV: u8 = 0x02;
    const ADD: u8 = 0x03;
    const SUB: u8 = 0x04;
    const ADDI: u8 = 0x05;
    const LD: u8 = 0x06;
    const ST: u8 = 0x07;
    const JMP: u8 = 0x08;
    const JZ: u8 = 0x09;
    const JNZ: u8 = 0x0A;
    const HLT: u8 = 0x0B;
}

fn reg(index: u8) -> Result<u8, DecodeError> {
    if (index as usize) < REGISTER_COUNT {
        Ok(index)
    } else {
        Err(DecodeError::InvalidRegister(index))
    }
}

/// Decode one instruction from its three bytes.
pub fn decode(bytes: [u8; 3]) -> Result<Instruction, DecodeError> {
    let [op, a, b] = bytes;

    let instruction = match op {
        Opcode::NOP => Instruction::Nop,
        Opcode::LDI => Instruction::Ldi { rd: reg(a)?, imm: b },
        Opcode::MOV => Instruction::Mov { rd: reg(a)?, rs: reg(b)? },
        Opcode::ADD => Instruction::Add { rd: reg(a)?, rs: reg(b)? },
        Opcode::SUB => Instruction::Sub { rd: reg(a)?, rs: reg(b)? },
        Opcode::ADDI => Instruction::Addi { rd: reg(a)?, imm: b },
        Opcode::LD => Instruction::Ld { rd: reg(a)?, addr: b },
        Opcode::ST => Instruction::St { rs: reg(a)?, addr: b },
        Opcode::JMP => Instruction::Jmp { addr: a },
        Opcode::JZ => Instruction::Jz { rs: reg(a)?, addr: b },
        Opcode::JNZ => Instruction::Jnz { rs: reg(a)?, addr: b },
        Opcode::HLT => Instruction::Hlt,
        _ => return Err(DecodeError::InvalidOpcode(op)),
    };

    Ok(instruction)
}

/// Encode an instruction back to its three bytes.
pub fn encode(instr: &Instruction) -> [u8; 3] {
    match *instr {
        Instruction::Nop => [Opcode::NOP, 0, 0],
        Instruction::Ldi { rd, imm } => [Opcode::LDI, rd, imm],
        Instruction::Mov { rd, rs } => [Opcode::MOV, rd, rs],
        Instruction::Add { rd, rs } => [Opcode::ADD, rd, rs],
        Instruction::Sub { rd, rs } => [Opcode::SUB, rd, rs],
        Instruction::Addi { rd, imm } => [Opcode::ADDI, rd, imm],
        Instruction::Ld { rd, addr } => [Opcode::LD, rd, addr],
        Instruction::St { rs, addr } => [Opcode::ST, rs, addr],
        Instruction::Jmp { addr } => [Opcode::JMP, addr, 0],
        Instruction::Jz { rs, addr } => [Opcode::JZ, rs, addr],
        Instruction::Jnz { rs, addr } => [Opcode::JNZ, rs, addr],
        Instruction::Hlt => [Opcode::HLT, 0, 0],
    }
}

/// Encode a whole program into a flat byte image.
pub fn assemble(program: &[Instruction]) -> Vec<u8> {
    program.iter().flat_map(encode).collect()
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DecodeError {
    #[error("invalid opcode: {0:#04x}")]
    InvalidOpcode(u8),

    #[error("invalid register operand: r{0}")]
    InvalidRegister(u8),
}
