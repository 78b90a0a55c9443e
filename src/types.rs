//! # Common Types
//!
//! This module contains the types shared by the engagement pipeline, the
//! progress calculation and the dashboard: contributor records as they come
//! off the wire, the campaign window, and the derived chart series.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{InsightError, Result};
use crate::plotting::ContributorColor;

/// Date format used by campaign documents and contributor timelines.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text the campaign server writes for a date that was never set.
const UNSET_DATE: &str = "None";

/// One contributor entry as reported by the mapper engagement insight.
///
/// The same person can appear several times (once per feature type); records
/// are merged by their canonical identity during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    /// Display name of the contributor
    #[serde(rename = "name")]
    pub identity: String,
    /// Number of ways edited
    #[serde(rename = "ways", default)]
    pub way_count: u64,
    /// Number of nodes edited
    #[serde(rename = "nodes", default)]
    pub node_count: u64,
    /// JSON text holding `[["YYYY-MM-DD", count], ...]`
    pub timeline: String,
}

impl ContributionRecord {
    pub fn new(identity: impl Into<String>, ways: u64, nodes: u64, timeline: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            way_count: ways,
            node_count: nodes,
            timeline: timeline.into(),
        }
    }
}

/// Start and end date of a campaign. Either side may be unset, in which case
/// engagement aggregation and progress are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl CampaignWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// A window with neither date set.
    pub fn unset() -> Self {
        Self::default()
    }

    /// Parse a window from the textual dates of a campaign document.
    ///
    /// Missing values, empty strings and the literal `None` are all treated
    /// as unset.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Ok(Self {
            start: parse_optional_date(start)?,
            end: parse_optional_date(end)?,
        })
    }

    /// Both bounds, or `None` if either is unset.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start?, self.end?))
    }

    /// Both bounds as unix seconds at UTC midnight.
    pub fn instants(&self) -> Option<(i64, i64)> {
        self.bounds()
            .map(|(start, end)| (instant_of(start), instant_of(end)))
    }

    pub fn is_set(&self) -> bool {
        self.bounds().is_some()
    }
}

/// Chronological activity of one merged contributor, ready for charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSeries {
    /// Canonical identity (whitespace collapsed to `_`)
    pub key: String,
    /// Display name used as the chart label
    pub label: String,
    pub ways: u64,
    pub nodes: u64,
    /// `(unix seconds, count)` sorted by instant, padded to the campaign window
    pub points: Vec<(i64, u64)>,
    pub color: ContributorColor,
}

impl TimelineSeries {
    /// Sum of all counts in the series.
    pub fn total(&self) -> u64 {
        self.points.iter().fold(0u64, |total, (_, count)| total.saturating_add(*count))
    }
}

/// Contributions of every contributor summed per instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GlobalHistogram {
    totals: BTreeMap<i64, u64>,
}

impl GlobalHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` to the total at `instant`, creating it at zero first.
    pub fn add(&mut self, instant: i64, count: u64) {
        let total = self.totals.entry(instant).or_insert(0);
        *total = total.saturating_add(count);
    }

    pub fn get(&self, instant: i64) -> Option<u64> {
        self.totals.get(&instant).copied()
    }

    /// Entries in ascending instant order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.totals.iter().map(|(instant, count)| (*instant, *count))
    }

    pub fn points(&self) -> Vec<(i64, u64)> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.totals.values().fold(0u64, |total, count| total.saturating_add(*count))
    }
}

/// Output of one engagement aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngagementSummary {
    /// One series per merged contributor, ordered by key
    pub series: Vec<TimelineSeries>,
    /// Global contributions per instant
    pub histogram: GlobalHistogram,
    /// Identities dropped because their timeline was malformed
    pub skipped: Vec<String>,
    pub total_ways: u64,
    pub total_nodes: u64,
}

impl EngagementSummary {
    /// Number of distinct contributors after merging.
    pub fn users_engaged(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.histogram.is_empty()
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| InsightError::InvalidDate(value.to_string()))
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") | Some(UNSET_DATE) => Ok(None),
        Some(text) => parse_date(text).map(Some),
    }
}

/// Unix seconds at UTC midnight of `date`.
pub fn instant_of(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}

/// Inverse of [`instant_of`] for chart labels.
pub fn date_of(instant: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp(instant, 0).map(|dt| dt.date_naive())
}
