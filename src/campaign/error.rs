//! Campaign error taxonomy.

use crate::unit::{ProgramLoadError, RegisterGeometry};
use thiserror::Error;

/// Errors that abort a campaign operation.
///
/// A hang during a single injection run is not an error: it is the
/// [`Outcome::Due`](super::Outcome::Due) result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CampaignError {
    #[error("program load failed: {0}")]
    ProgramLoadFailed(#[from] ProgramLoadError),

    #[error("campaign load failed: {0}")]
    CampaignLoadFailed(String),

    #[error("campaign save failed: {0}")]
    CampaignSaveFailed(String),

    #[error("baseline run did not signal completion within {ceiling} cycles")]
    BaselineDidNotTerminate { ceiling: u64 },

    #[error("cannot aggregate an empty result set")]
    EmptyCampaignAggregation,

    #[error("injection {index} targets r{register} bit {bit}, outside {geometry}")]
    InvalidInjectionSpec {
        index: usize,
        register: usize,
        bit: u32,
        geometry: RegisterGeometry,
    },

    #[error("protocol cell {addr:#x} is outside the unit's {memory_size} bytes of memory")]
    InvalidProtocolAddress { addr: u32, memory_size: usize },

    #[error("campaign has no golden values; calibrate it before injecting")]
    NotCalibrated,
}
