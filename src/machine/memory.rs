//! Machine memory subsystem.
//!
//! 256 byte cells addressed by a single byte. The top two cells are
//! reserved for the completion protocol.

use crate::unit::ProgramLoadError;
use serde::{Serialize, Deserialize};

/// The number of memory cells.
pub const MEMORY_SIZE: usize = 256;

/// Cell the program clears to signal completion.
pub const FINISH_LOCATION: u8 = 0xFE;

/// Cell holding the program's answer.
pub const RESULT_LOCATION: u8 = 0xFF;

/// Value written to the finish cell when a program is loaded.
pub const FINISH_ARMED: u8 = 1;

/// Machine memory: 256 byte cells.
#[derive(Clone, Serialize, Deserialize)]
pub struct Memory {
    cells: Vec<u8>,
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    #[inline]
    pub fn read(&self, addr: u8) -> u8 {
        self.cells[addr as usize]
    }

    #[inline]
    pub fn write(&mut self, addr: u8, value: u8) {
        self.cells[addr as usize] = value;
    }

    /// Read a little-endian 16-bit word. The high byte wraps to 0x00.
    pub fn read_word(&self, addr: u8) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        lo | (hi << 8)
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Copy a program to address 0x00 and arm the `finish` cell.
    ///
    /// The program area ends where the lower of the two protocol cells begins.
    pub fn load_program(&mut self, program: &[u8], finish: u8, result: u8) -> Result<(), ProgramLoadError> {
        let available = finish.min(result) as usize;
        if program.len() > available {
            return Err(ProgramLoadError::TooLarge {
                size: program.len(),
                available,
            });
        }

        self.cells[..program.len()].copy_from_slice(program);
        self.write(finish, FINISH_ARMED);

        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.cells.iter().filter(|cell| **cell != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}
