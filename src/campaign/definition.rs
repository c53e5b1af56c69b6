//! The campaign description: program, golden values, planned injections.

use crate::campaign::CampaignError;
use crate::unit::RegisterGeometry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One planned fault: flip `bit` of `register` when the unit's cycle
/// counter reaches `cycle`.
///
/// Serialized as the triple `[cycle, register, bit]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u64, usize, u32)", into = "(u64, usize, u32)")]
pub struct Injection {
    pub cycle: u64,
    pub register: usize,
    pub bit: u32,
}

impl Injection {
    pub fn new(cycle: u64, register: usize, bit: u32) -> Self {
        Self { cycle, register, bit }
    }
}

impl From<(u64, usize, u32)> for Injection {
    fn from((cycle, register, bit): (u64, usize, u32)) -> Self {
        Self { cycle, register, bit }
    }
}

impl From<Injection> for (u64, usize, u32) {
    fn from(injection: Injection) -> Self {
        (injection.cycle, injection.register, injection.bit)
    }
}

/// A fault-injection experiment.
///
/// `expected_result` and `expected_instructions` are the golden values;
/// `0` in `expected_instructions` means the baseline has not been run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDefinition {
    #[serde(rename = "program")]
    pub program_path: PathBuf,
    pub expected_result: u8,
    pub expected_instructions: u64,
    pub injections: Vec<Injection>,
}

impl CampaignDefinition {
    /// An uncalibrated campaign.
    pub fn new(program_path: impl Into<PathBuf>, injections: Vec<Injection>) -> Self {
        Self {
            program_path: program_path.into(),
            expected_result: 0,
            expected_instructions: 0,
            injections,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.expected_instructions != 0
    }

    /// Cycle count after which an injection run is declared hung.
    pub fn hang_budget(&self, hang_factor: u64) -> u64 {
        self.expected_instructions.saturating_mul(hang_factor)
    }

    /// Reject any injection that names a register or bit the unit lacks.
    pub fn validate(&self, geometry: &RegisterGeometry) -> Result<(), CampaignError> {
        for (index, injection) in self.injections.iter().enumerate() {
            if !geometry.contains(injection.register, injection.bit) {
                return Err(CampaignError::InvalidInjectionSpec {
                    index,
                    register: injection.register,
                    bit: injection.bit,
                    geometry: *geometry,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.injections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.injections.is_empty()
    }
}
