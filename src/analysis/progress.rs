use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::CampaignWindow;

/// Where a campaign stands relative to its window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CampaignProgress {
    /// Start or end date not set; progress is not computed at all.
    Unset,
    /// The window spans zero or fewer days.
    Indeterminate,
    /// Still running, `percent` in `[0, 100]`.
    Running { percent: f64 },
    /// Last day is behind us.
    Finished,
}

impl CampaignProgress {
    /// Evaluate `window` as of `today`.
    pub fn evaluate(window: &CampaignWindow, today: NaiveDate) -> Self {
        let Some((start, end)) = window.bounds() else {
            return Self::Unset;
        };

        // Both ends inclusive
        let total_days = (end - start).num_days() + 1;
        if total_days <= 0 {
            return Self::Indeterminate;
        }

        let remaining_days = (end - today).num_days() + 1;
        if remaining_days <= 0 {
            return Self::Finished;
        }

        let percent = 100.0 * (1.0 - remaining_days as f64 / total_days as f64);
        Self::Running {
            percent: percent.clamp(0.0, 100.0),
        }
    }

    /// Progress bar width, if there is one to draw.
    pub fn percent(&self) -> Option<f64> {
        match self {
            Self::Unset | Self::Indeterminate => None,
            Self::Running { percent } => Some(*percent),
            Self::Finished => Some(100.0),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for CampaignProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset | Self::Indeterminate => write!(f, "-"),
            Self::Running { percent } => write!(f, "Running ({percent:.1}%)"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}
