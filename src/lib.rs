//! # bitflip
//!
//! Software-implemented fault injection (SWIFI) against a simulated CPU.
//!
//! A campaign runs a program once fault-free to record its golden result
//! and cycle count, then re-runs it once per planned injection, flipping a
//! single register bit at a chosen cycle, and classifies each run as
//! no effect, silent data corruption (SDC), single event delay (SED) or
//! detected unrecoverable error (DUE).

pub mod unit;
pub mod machine;
pub mod campaign;
pub mod config;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use unit::{ExecutionUnit, ProgramImage, ProgramLoadError, ProtocolAddresses, RegisterGeometry};
pub use machine::{Machine, MachineError, MachineState, Instruction};
pub use campaign::{
    aggregate, classify, run_baseline, Baseline, CampaignDefinition, CampaignError,
    CampaignObserver, CampaignSession, Injection, Outcome, Progress, RunStatus, StopFlag, Summary,
};
pub use config::{Config, ConfigError, EngineConfig};

#[cfg(feature = "tui")]
pub use tui::run_monitor;
