//! The injection scheduler.
//!
//! [`CampaignSession`] owns the execution unit for the whole campaign and
//! advances it one cycle per [`CampaignSession::step`] call, so any driver
//! (CLI loop, terminal UI, browser event loop) can interleave progress
//! rendering and stop requests between cycles.

use crate::campaign::baseline::{run_baseline, Baseline};
use crate::campaign::{aggregate, classify, CampaignDefinition, CampaignError, Injection, Outcome, Summary};
use crate::config::EngineConfig;
use crate::unit::{ExecutionUnit, ProgramImage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of advancing a session by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The current injection run advanced one cycle.
    Stepped,
    /// The current injection run ended and produced an outcome.
    InjectionComplete { index: usize, outcome: Outcome },
    /// Every injection has an outcome.
    Finished,
}

/// How a call to [`CampaignSession::run`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Completed(Summary),
    /// The definition plans no injections; nothing ran and nothing was
    /// calibrated.
    NoInjections,
    /// A stop was requested. The pending injection restarts on the next run.
    Stopped,
}

/// Shared stop request, checked once per cycle.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One-way campaign notifications for presentation layers.
pub trait CampaignObserver {
    fn on_calibrated(&mut self, _baseline: &Baseline) {}

    fn on_injection_complete(&mut self, _index: usize, _total: usize, _outcome: Outcome) {}

    fn on_complete(&mut self, _summary: &Summary) {}
}

impl CampaignObserver for () {}

/// State of the injection run in flight.
#[derive(Debug, Clone, Copy)]
struct InjectionRun {
    injection: Injection,
    flipped: bool,
}

/// A campaign in progress: definition, exclusive unit, accumulated results.
pub struct CampaignSession<U: ExecutionUnit> {
    unit: U,
    definition: CampaignDefinition,
    image: ProgramImage,
    config: EngineConfig,
    results: Vec<Outcome>,
    run: Option<InjectionRun>,
}

impl<U: ExecutionUnit> CampaignSession<U> {
    /// Build a session from an already-read program image.
    ///
    /// Injections are validated against the unit's register file and the
    /// protocol cells against its memory here, so a bad campaign never
    /// reaches the first run.
    pub fn new(
        unit: U,
        definition: CampaignDefinition,
        image: ProgramImage,
        config: EngineConfig,
    ) -> Result<Self, CampaignError> {
        definition.validate(&unit.geometry())?;
        let memory_size = unit.memory_size();
        if let Some(addr) = config.addresses().out_of_range(memory_size) {
            return Err(CampaignError::InvalidProtocolAddress { addr, memory_size });
        }
        let capacity = definition.len();
        Ok(Self {
            unit,
            definition,
            image,
            config,
            results: Vec::with_capacity(capacity),
            run: None,
        })
    }

    /// Build a session, reading the program the definition points at.
    pub fn open(
        unit: U,
        definition: CampaignDefinition,
        config: EngineConfig,
    ) -> Result<Self, CampaignError> {
        let image = ProgramImage::from_file(&definition.program_path)?;
        Self::new(unit, definition, image, config)
    }

    /// Run the golden execution unless the definition is already calibrated.
    ///
    /// Golden values are written once; on error the definition is untouched.
    pub fn calibrate(&mut self) -> Result<Baseline, CampaignError> {
        if self.definition.is_calibrated() {
            return Ok(self.baseline());
        }

        let baseline = run_baseline(
            &mut self.unit,
            &self.image,
            &self.config.addresses(),
            self.config.baseline_cycle_ceiling,
        )?;
        if baseline.expected_instructions == 0 {
            return Err(CampaignError::NotCalibrated);
        }

        self.definition.expected_result = baseline.expected_result;
        self.definition.expected_instructions = baseline.expected_instructions;
        Ok(baseline)
    }

    /// Advance by one cycle of the current injection run, starting the next
    /// run first when none is in flight.
    pub fn step(&mut self) -> Result<Progress, CampaignError> {
        if !self.definition.is_calibrated() {
            return Err(CampaignError::NotCalibrated);
        }
        if self.is_complete() {
            return Ok(Progress::Finished);
        }

        let mut run = match self.run {
            Some(run) => run,
            None => self.start_run()?,
        };

        let addresses = self.config.addresses();
        let budget = self.definition.hang_budget(self.config.hang_factor);
        let cycles = self.unit.cycle_count();

        if self.unit.read_memory_byte(addresses.finish) == 0 {
            let outcome = classify(
                self.unit.read_memory_byte(addresses.result),
                cycles,
                self.definition.expected_result,
                self.definition.expected_instructions,
                false,
            );
            return Ok(self.complete(outcome));
        }

        if cycles >= budget {
            return Ok(self.complete(Outcome::Due));
        }

        if !run.flipped && cycles == run.injection.cycle {
            let Injection { register, bit, .. } = run.injection;
            self.unit.flip_register_bit(register, bit);
            run.flipped = true;
            debug!(cycle = cycles, register, bit, "bit flipped");
        }

        self.unit.step_cycle();
        self.run = Some(run);
        Ok(Progress::Stepped)
    }

    /// Drive the current (or next) injection to its outcome.
    ///
    /// Returns `None` when every injection already has an outcome.
    pub fn run_injection(&mut self) -> Result<Option<Outcome>, CampaignError> {
        loop {
            match self.step()? {
                Progress::Stepped => {}
                Progress::InjectionComplete { outcome, .. } => return Ok(Some(outcome)),
                Progress::Finished => return Ok(None),
            }
        }
    }

    /// Calibrate if needed, then run every pending injection.
    ///
    /// `stop` is checked before every cycle. Stopping abandons the run in
    /// flight without recording an outcome for it.
    pub fn run(
        &mut self,
        stop: &StopFlag,
        observer: &mut dyn CampaignObserver,
    ) -> Result<RunStatus, CampaignError> {
        if self.definition.is_empty() {
            info!("campaign has no injections");
            return Ok(RunStatus::NoInjections);
        }

        if !self.definition.is_calibrated() {
            let baseline = self.calibrate()?;
            observer.on_calibrated(&baseline);
        }

        info!(
            pending = self.total() - self.completed(),
            total = self.total(),
            "running campaign"
        );

        loop {
            if stop.is_stopped() {
                self.abort_current();
                info!(completed = self.completed(), "campaign stopped");
                return Ok(RunStatus::Stopped);
            }

            match self.step()? {
                Progress::Stepped => {}
                Progress::InjectionComplete { index, outcome } => {
                    observer.on_injection_complete(index, self.total(), outcome);
                }
                Progress::Finished => {
                    let summary = self.summary()?;
                    info!(total = summary.total, "campaign complete");
                    observer.on_complete(&summary);
                    return Ok(RunStatus::Completed(summary));
                }
            }
        }
    }

    /// Drop the run in flight; its injection stays pending.
    pub fn abort_current(&mut self) {
        self.run = None;
    }

    /// Discard all results and start over from the first injection.
    pub fn restart(&mut self) {
        self.results.clear();
        self.run = None;
    }

    pub fn summary(&self) -> Result<Summary, CampaignError> {
        aggregate(&self.results)
    }

    pub fn results(&self) -> &[Outcome] {
        &self.results
    }

    pub fn completed(&self) -> usize {
        self.results.len()
    }

    pub fn total(&self) -> usize {
        self.definition.len()
    }

    pub fn is_complete(&self) -> bool {
        self.completed() >= self.total()
    }

    /// The injection currently running, if any.
    pub fn current_injection(&self) -> Option<Injection> {
        self.run.map(|run| run.injection)
    }

    pub fn baseline(&self) -> Baseline {
        Baseline {
            expected_result: self.definition.expected_result,
            expected_instructions: self.definition.expected_instructions,
        }
    }

    pub fn definition(&self) -> &CampaignDefinition {
        &self.definition
    }

    pub fn unit(&self) -> &U {
        &self.unit
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn start_run(&mut self) -> Result<InjectionRun, CampaignError> {
        let index = self.completed();
        let injection = self.definition.injections[index];

        self.unit.reset();
        self.unit.load_program(&self.image, &self.config.addresses())?;

        Ok(InjectionRun {
            injection,
            flipped: false,
        })
    }

    fn complete(&mut self, outcome: Outcome) -> Progress {
        let index = self.completed();
        debug!(
            index,
            cycles = self.unit.cycle_count(),
            outcome = %outcome,
            "injection complete"
        );
        self.results.push(outcome);
        self.run = None;
        Progress::InjectionComplete { index, outcome }
    }
}
