//! Reference execution unit: a small 8-bit register machine.
//!
//! This module implements a complete target for fault-injection campaigns:
//! - 256 bytes of byte-addressed memory
//! - 32 eight-bit general registers plus an 8-bit program counter
//! - 12 three-byte instructions (`opcode, a, b`)
//!
//! Programs signal completion by storing `0` into [`FINISH_LOCATION`] and
//! leave their answer in [`RESULT_LOCATION`].

pub mod memory;
pub mod registers;
pub mod decode;
pub mod execute;

pub use memory::{Memory, FINISH_LOCATION, RESULT_LOCATION};
pub use registers::{Registers, REGISTER_COUNT, REGISTER_WIDTH};
pub use decode::{Instruction, DecodeError};
pub use execute::{Machine, MachineError, MachineState};
