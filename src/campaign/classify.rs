//! Outcome classification against the golden run.

use serde::{Deserialize, Serialize};

/// What a single injection did to the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Same answer, same cycle count as the golden run.
    NoEffect,
    /// Silent Data Corruption: finished, but with the wrong answer.
    Sdc,
    /// Single Event Delay: right answer, reached later than the golden run.
    Sed,
    /// Detected Unrecoverable Error: never finished within the hang budget.
    Due,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [Outcome::NoEffect, Outcome::Sdc, Outcome::Sed, Outcome::Due];

    pub fn label(self) -> &'static str {
        match self {
            Outcome::NoEffect => "No effect",
            Outcome::Sdc => "SDC",
            Outcome::Sed => "SED",
            Outcome::Due => "DUE",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a finished (or abandoned) run.
///
/// Precedence: hang, then wrong answer, then late answer.
pub fn classify(
    final_result: u8,
    final_cycles: u64,
    expected_result: u8,
    expected_instructions: u64,
    hung: bool,
) -> Outcome {
    if hung {
        Outcome::Due
    } else if final_result != expected_result {
        Outcome::Sdc
    } else if final_cycles > expected_instructions {
        Outcome::Sed
    } else {
        Outcome::NoEffect
    }
}
