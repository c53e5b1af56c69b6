//! The execution-unit contract the campaign engine drives.
//!
//! Anything that can be reset, loaded with a program image and stepped one
//! cycle at a time can be the target of a fault-injection campaign. The
//! engine only ever touches a unit through this trait.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Shape of a unit's register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterGeometry {
    /// Number of addressable registers.
    pub count: usize,
    /// Width of each register in bits.
    pub width: u32,
}

impl RegisterGeometry {
    /// Check that `register`/`bit` name a real bit in this register file.
    pub fn contains(&self, register: usize, bit: u32) -> bool {
        register < self.count && bit < self.width
    }
}

impl std::fmt::Display for RegisterGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} registers x {} bits", self.count, self.width)
    }
}

/// The two memory cells the completion protocol is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolAddresses {
    /// Reads non-zero while the program runs; the program writes `0` here
    /// to signal completion.
    pub finish: u32,
    /// Holds the outcome byte compared against the golden result.
    pub result: u32,
}

impl ProtocolAddresses {
    /// The first cell outside `memory_size`, if either cell is.
    pub fn out_of_range(&self, memory_size: usize) -> Option<u32> {
        [self.finish, self.result]
            .into_iter()
            .find(|addr| *addr as usize >= memory_size)
    }
}

/// A program binary, read once and reloaded into the unit before every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramImage {
    bytes: Vec<u8>,
}

impl ProgramImage {
    /// Wrap raw program bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Read a program binary from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProgramLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ProgramLoadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if bytes.is_empty() {
            return Err(ProgramLoadError::Empty(path.display().to_string()));
        }
        Ok(Self { bytes })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Errors raised while reading or placing a program image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramLoadError {
    #[error("cannot read program {path}: {message}")]
    Io { path: String, message: String },

    #[error("program {0} is empty")]
    Empty(String),

    #[error("program size {size} exceeds available space {available}")]
    TooLarge { size: usize, available: usize },

    #[error("protocol cell {addr:#x} is outside {size} bytes of memory")]
    AddressOutOfRange { addr: u32, size: usize },
}

/// A steppable CPU + memory model.
///
/// `reset` must be exhaustive: registers, memory and the cycle counter all
/// return to their power-on state, so consecutive runs cannot leak into
/// each other.
pub trait ExecutionUnit {
    /// Return every piece of state to power-on values.
    fn reset(&mut self);

    /// Place a program image in memory, ready to run from its entry point,
    /// and arm the finish cell so it reads non-zero until the program clears it.
    fn load_program(
        &mut self,
        image: &ProgramImage,
        addresses: &ProtocolAddresses,
    ) -> Result<(), ProgramLoadError>;

    /// Advance exactly one cycle.
    fn step_cycle(&mut self);

    /// Cycles executed since the last reset.
    fn cycle_count(&self) -> u64;

    fn read_register(&self, index: usize) -> u32;

    fn write_register(&mut self, index: usize, value: u32);

    fn read_memory_byte(&self, addr: u32) -> u8;

    fn read_memory_word(&self, addr: u32) -> u32;

    /// Addressable memory in bytes.
    fn memory_size(&self) -> usize;

    /// The register file the fault model may target.
    fn geometry(&self) -> RegisterGeometry;

    /// Flip one bit of one register. This is the whole fault model.
    fn flip_register_bit(&mut self, register: usize, bit: u32) {
        let value = self.read_register(register);
        self.write_register(register, value ^ (1 << bit));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_bounds() {
        let geometry = RegisterGeometry { count: 32, width: 8 };

        assert!(geometry.contains(0, 0));
        assert!(geometry.contains(31, 7));
        assert!(!geometry.contains(32, 0));
        assert!(!geometry.contains(0, 8));
    }

    #[test]
    fn test_missing_program_file() {
        let err = ProgramImage::from_file("/nonexistent/program.bin").unwrap_err();
        assert!(matches!(err, ProgramLoadError::Io { .. }));
    }

    #[test]
    fn test_empty_program_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = ProgramImage::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ProgramLoadError::Empty(_)));
    }
}
