//! Turn a results sequence into per-outcome percentages.

use crate::campaign::{CampaignError, Outcome};
use serde::{Deserialize, Serialize};

/// Campaign statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub no_effect: usize,
    pub sdc: usize,
    pub sed: usize,
    pub due: usize,
    pub no_effect_pct: f64,
    pub sdc_pct: f64,
    pub sed_pct: f64,
    pub due_pct: f64,
}

impl Summary {
    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::NoEffect => self.no_effect,
            Outcome::Sdc => self.sdc,
            Outcome::Sed => self.sed,
            Outcome::Due => self.due,
        }
    }

    pub fn percent(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::NoEffect => self.no_effect_pct,
            Outcome::Sdc => self.sdc_pct,
            Outcome::Sed => self.sed_pct,
            Outcome::Due => self.due_pct,
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Campaign results ({} injections):", self.total)?;
        for outcome in Outcome::ALL {
            writeln!(
                f,
                "  {:<10} {:>6.2}%  ({})",
                format!("{}:", outcome),
                self.percent(outcome),
                self.count(outcome)
            )?;
        }
        Ok(())
    }
}

/// Tally outcomes. Fails on an empty sequence instead of dividing by zero.
pub fn aggregate(results: &[Outcome]) -> Result<Summary, CampaignError> {
    if results.is_empty() {
        return Err(CampaignError::EmptyCampaignAggregation);
    }

    let tally = |kind: Outcome| results.iter().filter(|r| **r == kind).count();
    let total = results.len();
    let pct = |count: usize| 100.0 * count as f64 / total as f64;

    let no_effect = tally(Outcome::NoEffect);
    let sdc = tally(Outcome::Sdc);
    let sed = tally(Outcome::Sed);
    let due = tally(Outcome::Due);

    Ok(Summary {
        total,
        no_effect,
        sdc,
        sed,
        due,
        no_effect_pct: pct(no_effect),
        sdc_pct: pct(sdc),
        sed_pct: pct(sed),
        due_pct: pct(due),
    })
}
