//! # Campaign Insights
//!
//! `campaign_insights` builds the insight dashboard of a mapping campaign.
//! It fetches the rendered fragment of every insight function attached to the
//! campaign, groups the panels by campaign type, keeps running totals, and
//! turns the mapper engagement data into per-contributor activity charts and
//! a global contributions histogram.
//!
//! ## Features
//!
//! - Merge contributor records by identity and build sorted, window-padded
//!   activity series
//! - Sum contributions of every contributor per day
//! - Deterministic per-contributor chart colors
//! - Campaign progress from its start and end dates
//! - Concurrent insight fetches folded into a single dashboard state
//! - PNG charts via `plotters`
//!
//! ## Example
//!
//! ```no_run
//! use campaign_insights::analysis::TimelineAggregator;
//! use campaign_insights::types::{CampaignWindow, ContributionRecord};
//!
//! let window = CampaignWindow::parse(Some("2021-01-01"), Some("2021-01-31")).unwrap();
//! let records = vec![ContributionRecord::new("Jane Doe", 3, 5, r#"[["2021-01-15", 5]]"#)];
//!
//! let summary = TimelineAggregator::new(window).aggregate(&records).unwrap();
//! assert_eq!(summary.users_engaged(), 1);
//! ```

pub mod analysis;
pub mod campaign;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod plotting;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use analysis::{CampaignProgress, TimelineAggregator};
pub use error::{InsightError, Result};
pub use types::{CampaignWindow, ContributionRecord, EngagementSummary, GlobalHistogram, TimelineSeries};
