//! Campaign monitor state and event loop.

use crate::campaign::{CampaignSession, Outcome, Progress, Summary};
use crate::machine::Machine;
use std::collections::VecDeque;

/// Cycles executed per rendered frame while running.
pub const CYCLES_PER_FRAME: usize = 5_000;

/// Outcomes kept for the recent-injections panel.
const RECENT_CAPACITY: usize = 64;

/// A finished injection as shown in the monitor.
#[derive(Debug, Clone)]
pub struct RecentInjection {
    pub index: usize,
    pub cycle: u64,
    pub register: usize,
    pub bit: u32,
    pub outcome: Outcome,
}

/// Monitor application state.
pub struct MonitorApp {
    /// The campaign being driven.
    pub session: CampaignSession<Machine>,
    /// Is the campaign advancing every frame?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Most recent outcomes, newest first.
    pub recent: VecDeque<RecentInjection>,
    /// Final statistics once every injection has an outcome.
    pub summary: Option<Summary>,
}

impl MonitorApp {
    pub fn new(session: CampaignSession<Machine>) -> Self {
        Self {
            session,
            running: false,
            should_quit: false,
            status: "Ready. Press 'r' to run, 'q' to quit.".into(),
            recent: VecDeque::with_capacity(RECENT_CAPACITY),
            summary: None,
        }
    }

    /// Start or resume the campaign, calibrating first if needed.
    pub fn run(&mut self) {
        if self.summary.is_some() {
            self.status = "Campaign complete. Press 'x' to run it again.".into();
            return;
        }
        if !self.session.definition().is_calibrated() {
            match self.session.calibrate() {
                Ok(baseline) => {
                    self.status = format!(
                        "Calibrated: result={} cycles={}",
                        baseline.expected_result, baseline.expected_instructions
                    );
                }
                Err(e) => {
                    self.status = format!("Error: {}", e);
                    return;
                }
            }
        } else {
            self.status = "Running...".into();
        }
        self.running = true;
    }

    /// Stop stepping. The injection in flight is abandoned and restarts
    /// from a clean reset on resume.
    pub fn pause(&mut self) {
        self.running = false;
        self.session.abort_current();
        self.status = format!(
            "Paused at injection {}/{}.",
            self.session.completed(),
            self.session.total()
        );
    }

    /// Discard results and start from the first injection.
    pub fn restart(&mut self) {
        self.session.restart();
        self.recent.clear();
        self.summary = None;
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Advance the campaign by up to one frame's worth of cycles.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        for _ in 0..CYCLES_PER_FRAME {
            if !self.advance() {
                break;
            }
        }
    }

    /// Run exactly one injection to its outcome.
    pub fn step_injection(&mut self) {
        self.running = false;
        if !self.session.definition().is_calibrated() {
            self.run();
            self.running = false;
            if !self.session.definition().is_calibrated() {
                return;
            }
        }
        let before = self.session.completed();
        while self.advance() && self.session.completed() == before {}
    }

    /// One session step. Returns `false` once nothing more can happen.
    fn advance(&mut self) -> bool {
        match self.session.step() {
            Ok(Progress::Stepped) => true,
            Ok(Progress::InjectionComplete { index, outcome }) => {
                let injection = self.session.definition().injections[index];
                if self.recent.len() == RECENT_CAPACITY {
                    self.recent.pop_back();
                }
                self.recent.push_front(RecentInjection {
                    index,
                    cycle: injection.cycle,
                    register: injection.register,
                    bit: injection.bit,
                    outcome,
                });
                true
            }
            Ok(Progress::Finished) => {
                self.running = false;
                match self.session.summary() {
                    Ok(summary) => {
                        self.status = format!("Campaign complete: {} injections.", summary.total);
                        self.summary = Some(summary);
                    }
                    Err(e) => self.status = format!("Error: {}", e),
                }
                false
            }
            Err(e) => {
                self.running = false;
                self.status = format!("Error: {}", e);
                false
            }
        }
    }

    /// Fraction of injections with an outcome.
    pub fn progress_ratio(&self) -> f64 {
        let total = self.session.total();
        if total == 0 {
            return 0.0;
        }
        self.session.completed() as f64 / total as f64
    }
}

/// Monitor a campaign in the terminal until the user quits.
///
/// Returns the session so the caller can report or persist results.
pub fn run_monitor(session: CampaignSession<Machine>) -> std::io::Result<CampaignSession<Machine>> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = MonitorApp::new(session);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(if app.running { 0 } else { 50 }))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => app.pause(),
                        KeyCode::Char('s') => app.step_injection(),
                        KeyCode::Char('x') => app.restart(),
                        _ => {}
                    }
                }
            }
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(app.session)
}
