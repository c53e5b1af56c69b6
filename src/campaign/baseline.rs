//! Golden (fault-free) run.

use crate::campaign::CampaignError;
use crate::unit::{ExecutionUnit, ProgramImage, ProtocolAddresses};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Golden values established by a fault-free run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub expected_result: u8,
    pub expected_instructions: u64,
}

/// Run the program to completion without faults.
///
/// Fails with [`CampaignError::BaselineDidNotTerminate`] once `ceiling`
/// cycles pass without the finish cell reading zero.
pub fn run_baseline<U: ExecutionUnit + ?Sized>(
    unit: &mut U,
    image: &ProgramImage,
    addresses: &ProtocolAddresses,
    ceiling: u64,
) -> Result<Baseline, CampaignError> {
    unit.reset();
    unit.load_program(image, addresses)?;

    while unit.read_memory_byte(addresses.finish) != 0 {
        if unit.cycle_count() >= ceiling {
            return Err(CampaignError::BaselineDidNotTerminate { ceiling });
        }
        unit.step_cycle();
    }

    let baseline = Baseline {
        expected_result: unit.read_memory_byte(addresses.result),
        expected_instructions: unit.cycle_count(),
    };
    info!(
        expected_result = baseline.expected_result,
        expected_instructions = baseline.expected_instructions,
        "baseline complete"
    );

    Ok(baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::decode::assemble;
    use crate::machine::{Instruction, Machine, FINISH_LOCATION, RESULT_LOCATION};

    fn addresses() -> ProtocolAddresses {
        ProtocolAddresses {
            finish: FINISH_LOCATION as u32,
            result: RESULT_LOCATION as u32,
        }
    }

    #[test]
    fn test_baseline_records_result_and_cycles() {
        let image = ProgramImage::new(assemble(&[
            Instruction::Ldi { rd: 0, imm: 42 },
            Instruction::St { rs: 0, addr: RESULT_LOCATION },
            Instruction::Ldi { rd: 1, imm: 0 },
            Instruction::St { rs: 1, addr: FINISH_LOCATION },
        ]));
        let mut machine = Machine::new();

        let baseline = run_baseline(&mut machine, &image, &addresses(), 1000).unwrap();

        assert_eq!(baseline, Baseline { expected_result: 42, expected_instructions: 4 });
    }

    #[test]
    fn test_baseline_is_bounded() {
        let image = ProgramImage::new(assemble(&[Instruction::Jmp { addr: 0 }]));
        let mut machine = Machine::new();

        let err = run_baseline(&mut machine, &image, &addresses(), 500).unwrap_err();

        assert_eq!(err, CampaignError::BaselineDidNotTerminate { ceiling: 500 });
        assert_eq!(machine.cycles, 500);
    }

    #[test]
    fn test_baseline_resets_previous_state() {
        let image = ProgramImage::new(assemble(&[
            Instruction::Ldi { rd: 1, imm: 0 },
            Instruction::St { rs: 1, addr: FINISH_LOCATION },
        ]));
        let mut machine = Machine::new();
        machine.cycles = 999;
        machine.mem.write(RESULT_LOCATION, 77);

        let baseline = run_baseline(&mut machine, &image, &addresses(), 1000).unwrap();

        assert_eq!(baseline, Baseline { expected_result: 0, expected_instructions: 2 });
    }
}
