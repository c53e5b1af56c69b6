//! Machine registers.
//!
//! 32 general-purpose 8-bit registers (`r0`..`r31`) and an 8-bit program
//! counter. Only the general registers are exposed to fault injection.

use serde::{Serialize, Deserialize};

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 32;

/// Width of a general-purpose register in bits.
pub const REGISTER_WIDTH: u32 = 8;

/// The register file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// General-purpose registers.
    pub gpr: [u8; REGISTER_COUNT],

    /// Program counter (byte address of the next instruction).
    pub pc: u8,
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self {
            gpr: [0; REGISTER_COUNT],
            pc: 0,
        }
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        self.gpr = [0; REGISTER_COUNT];
        self.pc = 0;
    }

    #[inline]
    pub fn get(&self, index: u8) -> u8 {
        self.gpr[index as usize]
    }

    #[inline]
    pub fn set(&mut self, index: u8, value: u8) {
        self.gpr[index as usize] = value;
    }

    /// Advance the program counter past one instruction.
    /// Returns the old value.
    pub fn advance_pc(&mut self, len: u8) -> u8 {
        let old = self.pc;
        self.pc = self.pc.wrapping_add(len);
        old
    }

    /// Set the program counter to an absolute address.
    pub fn jump(&mut self, addr: u8) {
        self.pc = addr;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
