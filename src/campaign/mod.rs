//! Fault-injection campaign engine.
//!
//! This module provides:
//! - [`CampaignDefinition`] - program, golden values and planned injections
//! - [`run_baseline`] - the fault-free golden run
//! - [`CampaignSession`] - the cycle-stepped injection scheduler
//! - [`classify`] / [`aggregate`] - outcome taxonomy and statistics
//! - [`store`] - campaign files and the random campaign generator

pub mod definition;
pub mod baseline;
pub mod scheduler;
pub mod classify;
pub mod aggregate;
pub mod store;
mod error;

pub use definition::{CampaignDefinition, Injection};
pub use baseline::{run_baseline, Baseline};
pub use scheduler::{CampaignObserver, CampaignSession, Progress, RunStatus, StopFlag};
pub use classify::{classify, Outcome};
pub use aggregate::{aggregate, Summary};
pub use error::CampaignError;
