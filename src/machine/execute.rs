//! Execution engine for the reference machine.
//!
//! Implements the fetch-decode-execute cycle and the [`ExecutionUnit`]
//! contract. A fault never stops the clock: a halted or faulted machine
//! keeps consuming cycles without making progress, which a campaign sees
//! as a hang.

use crate::machine::memory::MEMORY_SIZE;
use crate::machine::{Memory, Registers, FINISH_LOCATION, RESULT_LOCATION};
use crate::machine::decode::{self, Instruction, DecodeError, INSTRUCTION_LEN};
use crate::machine::registers::{REGISTER_COUNT, REGISTER_WIDTH};
use crate::unit::{ExecutionUnit, ProgramImage, ProgramLoadError, ProtocolAddresses, RegisterGeometry};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::warn;

/// Machine execution state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    /// Fetching and executing instructions.
    Running,
    /// Executed HLT.
    Halted,
    /// Hit an undecodable instruction.
    Faulted(DecodeError),
}

/// The reference machine.
#[derive(Clone, Serialize, Deserialize)]
pub struct Machine {
    /// Register file.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Current execution state.
    pub state: MachineState,
    /// Cycles since reset. Every cycle executes at most one instruction.
    pub cycles: u64,
    last_instr: Option<Instruction>,
}

impl Machine {
    /// Create a new machine with zeroed state.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            state: MachineState::Running,
            cycles: 0,
            last_instr: None,
        }
    }

    /// Reset registers, memory, state and cycle counter.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = MachineState::Running;
        self.cycles = 0;
        self.last_instr = None;
    }

    /// Load a program image at address 0x00 using the default protocol cells.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), ProgramLoadError> {
        self.mem.load_program(program, FINISH_LOCATION, RESULT_LOCATION)
    }

    /// Execute a single instruction.
    ///
    /// Returns the instruction that was executed. Fails without touching
    /// any state when the machine is not running.
    pub fn step(&mut self) -> Result<Instruction, MachineError> {
        if self.state != MachineState::Running {
            return Err(MachineError::NotRunning(self.state.clone()));
        }

        // Fetch
        let pc = self.regs.advance_pc(INSTRUCTION_LEN);
        let raw = [
            self.mem.read(pc),
            self.mem.read(pc.wrapping_add(1)),
            self.mem.read(pc.wrapping_add(2)),
        ];

        // Decode; a bad word latches the fault but still costs a cycle
        self.cycles += 1;
        let instr = match decode::decode(raw) {
            Ok(instr) => instr,
            Err(e) => {
                warn!(pc, cycle = self.cycles, error = %e, "machine faulted");
                self.state = MachineState::Faulted(e.clone());
                return Err(MachineError::Decode(e));
            }
        };

        self.execute(instr);
        self.last_instr = Some(instr);

        Ok(instr)
    }

    /// Run for at most `max_cycles` cycles or until the machine stops.
    ///
    /// Returns the number of cycles executed.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, MachineError> {
        let start_cycles = self.cycles;
        let limit = self.cycles + max_cycles;

        while self.state == MachineState::Running && self.cycles < limit {
            self.step()?;
        }

        Ok(self.cycles - start_cycles)
    }

    fn execute(&mut self, instr: Instruction) {
        let regs = &mut self.regs;
        match instr {
            Instruction::Nop => {}

            Instruction::Ldi { rd, imm } => regs.set(rd, imm),

            Instruction::Mov { rd, rs } => {
                let value = regs.get(rs);
                regs.set(rd, value);
            }

            Instruction::Ld { rd, addr } => {
                let value = self.mem.read(addr);
                regs.set(rd, value);
            }

            Instruction::St { rs, addr } => self.mem.write(addr, regs.get(rs)),

            Instruction::Add { rd, rs } => {
                let value = regs.get(rd).wrapping_add(regs.get(rs));
                regs.set(rd, value);
            }

            Instruction::Sub { rd, rs } => {
                let value = regs.get(rd).wrapping_sub(regs.get(rs));
                regs.set(rd, value);
            }

            Instruction::Addi { rd, imm } => {
                let value = regs.get(rd).wrapping_add(imm);
                regs.set(rd, value);
            }

            Instruction::Jmp { addr } => regs.jump(addr),

            Instruction::Jz { rs, addr } => {
                if regs.get(rs) == 0 {
                    regs.jump(addr);
                }
            }

            Instruction::Jnz { rs, addr } => {
                if regs.get(rs) != 0 {
                    regs.jump(addr);
                }
            }

            Instruction::Hlt => self.state = MachineState::Halted,
        }
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    pub fn is_running(&self) -> bool {
        self.state == MachineState::Running
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}

impl ExecutionUnit for Machine {
    fn reset(&mut self) {
        Machine::reset(self);
    }

    fn load_program(
        &mut self,
        image: &ProgramImage,
        addresses: &ProtocolAddresses,
    ) -> Result<(), ProgramLoadError> {
        let cell = |addr: u32| {
            u8::try_from(addr).map_err(|_| ProgramLoadError::AddressOutOfRange {
                addr,
                size: MEMORY_SIZE,
            })
        };
        let finish = cell(addresses.finish)?;
        let result = cell(addresses.result)?;
        self.mem.load_program(image.bytes(), finish, result)
    }

    fn step_cycle(&mut self) {
        if self.is_running() {
            // Faults are latched in `state`; the clock keeps going either way.
            let _ = self.step();
        } else {
            self.cycles += 1;
        }
    }

    fn cycle_count(&self) -> u64 {
        self.cycles
    }

    fn read_register(&self, index: usize) -> u32 {
        self.regs.gpr[index] as u32
    }

    fn write_register(&mut self, index: usize, value: u32) {
        self.regs.gpr[index] = value as u8;
    }

    // Addresses wrap at 256; sessions reject protocol cells past `memory_size`.
    fn read_memory_byte(&self, addr: u32) -> u8 {
        self.mem.read(addr as u8)
    }

    fn read_memory_word(&self, addr: u32) -> u32 {
        self.mem.read_word(addr as u8) as u32
    }

    fn memory_size(&self) -> usize {
        MEMORY_SIZE
    }

    fn geometry(&self) -> RegisterGeometry {
        RegisterGeometry {
            count: REGISTER_COUNT,
            width: REGISTER_WIDTH,
        }
    }
}

/// Errors that can occur while stepping the machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("machine not running: {0:?}")]
    NotRunning(MachineState),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}
