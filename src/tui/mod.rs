//! Terminal campaign monitor.
//!
//! Drives a campaign cooperatively, a frame's worth of cycles at a time:
//! - Live progress gauge and outcome tallies
//! - Recent injections with their classification
//! - Run/pause/step/reset controls

mod app;
mod ui;

pub use app::{MonitorApp, run_monitor};
