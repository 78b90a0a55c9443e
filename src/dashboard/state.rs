use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::layout::{DashboardLayout, Dispatch, FEATURE_COMPLETENESS, MAPPER_ENGAGEMENT};
use super::payload::{self, ErrorRow};
use crate::error::Result;
use crate::types::ContributionRecord;

/// Panel key of the osmcha error counter.
pub const OSMCHA_PANEL: &str = "osmcha-errors";

/// Lifecycle of one dashboard panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum PanelState {
    Loading,
    Loaded,
    Failed(String),
}

/// Rows of the feature completeness error table, appended as responses arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorTable {
    rows: Vec<ErrorRow>,
}

impl ErrorTable {
    pub fn push(&mut self, row: ErrorRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ErrorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Fires once after `n` completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionLatch {
    remaining: usize,
    fired: bool,
}

impl CompletionLatch {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: count,
            fired: false,
        }
    }

    /// Record one completion. Returns true exactly once, on the completion
    /// that brings the count to zero.
    pub fn count_down(&mut self) -> bool {
        if self.fired {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.fired = true;
            return true;
        }
        false
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_done(&self) -> bool {
        self.fired
    }
}

/// Totals shown on one campaign type tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TabTotals {
    pub features_collected: u64,
    pub summaries: Vec<String>,
}

/// Everything the insight responses accumulate into.
///
/// Owned by the single loop that applies responses, so no locking is needed
/// regardless of how the fetches themselves are scheduled.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub panels: BTreeMap<String, PanelState>,
    pub total_features_collected: u64,
    pub tab_totals: BTreeMap<String, TabTotals>,
    pub error_table: ErrorTable,
    pub total_completeness_errors: usize,
    pub osmcha_errors: Option<String>,
    pub contributors: Vec<ContributionRecord>,
    engagement: CompletionLatch,
}

impl DashboardState {
    /// Every panel of `layout` starts out loading.
    pub fn new(layout: &DashboardLayout) -> Self {
        let mut panels: BTreeMap<String, PanelState> = layout
            .dispatches()
            .into_iter()
            .map(|d| (d.function_id, PanelState::Loading))
            .collect();
        panels.insert(OSMCHA_PANEL.to_string(), PanelState::Loading);

        Self {
            panels,
            total_features_collected: 0,
            tab_totals: layout
                .tabs
                .iter()
                .map(|tab| (tab.id.clone(), TabTotals::default()))
                .collect(),
            error_table: ErrorTable::default(),
            total_completeness_errors: 0,
            osmcha_errors: None,
            contributors: Vec::new(),
            engagement: CompletionLatch::new(layout.engagement_fetch_count()),
        }
    }

    /// Apply the outcome of one insight fetch. Returns true when this was the
    /// last engagement fetch and the engagement charts should be built.
    pub fn apply(&mut self, dispatch: &Dispatch, outcome: Result<String>) -> bool {
        match outcome {
            Ok(html) => {
                self.panels.insert(dispatch.function_id.clone(), PanelState::Loaded);
                self.absorb(dispatch, &html);
            }
            Err(err) => {
                warn!(function_id = %dispatch.function_id, error = %err, "insight panel failed");
                self.panels
                    .insert(dispatch.function_id.clone(), PanelState::Failed(err.to_string()));
            }
        }

        dispatch.feeds_engagement() && self.engagement.count_down()
    }

    fn absorb(&mut self, dispatch: &Dispatch, html: &str) {
        let features = payload::total_features(html);
        if let Some(value) = features {
            self.total_features_collected = self.total_features_collected.saturating_add(value);
        }

        let Some(tab_id) = &dispatch.tab_id else {
            return;
        };
        let tab = self.tab_totals.entry(tab_id.clone()).or_default();
        if let Some(value) = features {
            tab.features_collected = tab.features_collected.saturating_add(value);
        }
        if let Some(summary) = payload::insight_summaries(html) {
            tab.summaries.push(summary);
        }

        match dispatch.function.as_str() {
            FEATURE_COMPLETENESS => match payload::completeness_rows(html) {
                Ok(rows) => {
                    self.total_completeness_errors += rows.len();
                    for row in rows {
                        self.error_table.push(row);
                    }
                }
                Err(err) => {
                    warn!(function_id = %dispatch.function_id, error = %err, "unreadable completeness rows");
                }
            },
            MAPPER_ENGAGEMENT => match payload::contributors(html) {
                Ok(records) => {
                    debug!(function_id = %dispatch.function_id, count = records.len(), "contributors received");
                    self.contributors.extend(records);
                }
                Err(err) => {
                    warn!(function_id = %dispatch.function_id, error = %err, "unreadable contributors");
                }
            },
            _ => {}
        }
    }

    /// Apply the outcome of the osmcha error count fetch.
    pub fn apply_osmcha(&mut self, outcome: Result<String>) {
        match outcome {
            Ok(text) => {
                self.osmcha_errors = Some(text.trim().to_string());
                self.panels.insert(OSMCHA_PANEL.to_string(), PanelState::Loaded);
            }
            Err(err) => {
                warn!(error = %err, "osmcha errors unavailable");
                self.panels
                    .insert(OSMCHA_PANEL.to_string(), PanelState::Failed(err.to_string()));
            }
        }
    }

    /// Engagement fetches still outstanding.
    pub fn engagement_pending(&self) -> usize {
        self.engagement.remaining()
    }

    pub fn engagement_done(&self) -> bool {
        self.engagement.is_done()
    }

    /// Panels that never left the loading state.
    pub fn loading_panels(&self) -> Vec<&str> {
        self.panels
            .iter()
            .filter(|(_, state)| **state == PanelState::Loading)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}
