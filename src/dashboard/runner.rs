use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use super::client::InsightClient;
use super::layout::{DashboardLayout, NO_INSIGHT_MESSAGE};
use super::payload::ErrorRow;
use super::state::{DashboardState, PanelState, TabTotals};
use crate::analysis::{CampaignProgress, MalformedPolicy, TimelineAggregator};
use crate::campaign::Campaign;
use crate::error::Result;
use crate::plotting::{render_engagement, ChartRenderer};
use crate::types::{CampaignWindow, EngagementSummary};

/// Knobs for one dashboard run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Viewing user, decides manager-only panels
    pub username: String,
    /// Upper bound on fetches in flight
    pub max_concurrent_fetches: usize,
    /// Day progress is measured against
    pub today: NaiveDate,
}

/// Headline numbers of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardTotals {
    pub features_collected: u64,
    pub completeness_errors: usize,
    pub osmcha_errors: Option<String>,
    pub users_engaged: usize,
}

/// Everything a dashboard run produced.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub campaign_id: String,
    pub campaign_name: String,
    pub progress: CampaignProgress,
    /// Set when the campaign has no insight function at all
    pub message: Option<String>,
    pub layout: DashboardLayout,
    pub panels: BTreeMap<String, PanelState>,
    pub totals: DashboardTotals,
    pub tab_totals: BTreeMap<String, TabTotals>,
    pub error_rows: Vec<ErrorRow>,
    pub engagement: Option<EngagementSummary>,
    pub charts: Vec<String>,
}

/// Fetch every insight of `campaign`, fold the responses into one state and
/// render the engagement charts once the last engagement fetch completes.
pub async fn run_dashboard(
    client: &InsightClient,
    campaign: &Campaign,
    renderer: &mut dyn ChartRenderer,
    options: &RunOptions,
) -> Result<DashboardReport> {
    let started = Instant::now();
    let window = campaign.window()?;
    let layout = DashboardLayout::build(campaign, &options.username);
    let dispatches = layout.dispatches();
    let mut state = DashboardState::new(&layout);
    let mut engagement = None;

    info!(
        campaign = %campaign.uuid,
        panels = dispatches.len(),
        engagement_fetches = state.engagement_pending(),
        "dispatching insight fetches"
    );

    let insights = async {
        let mut responses = stream::iter(dispatches.into_iter().map(|dispatch| async move {
            let outcome = client.fetch_insight(&dispatch.function_id).await;
            (dispatch, outcome)
        }))
        .buffer_unordered(options.max_concurrent_fetches.max(1));

        // Responses arrive in completion order, not dispatch order
        while let Some((dispatch, outcome)) = responses.next().await {
            if state.apply(&dispatch, outcome) {
                engagement = Some(finalize_engagement(&state, window, &mut *renderer));
            }
        }
    };
    let (osmcha, ()) = tokio::join!(client.fetch_osmcha_errors(), insights);
    state.apply_osmcha(osmcha);

    let loading = state.loading_panels();
    if !loading.is_empty() {
        warn!(panels = ?loading, "panels still loading after all fetches finished");
    }

    let report = DashboardReport {
        campaign_id: campaign.uuid.clone(),
        campaign_name: campaign.name.clone(),
        progress: CampaignProgress::evaluate(&window, options.today),
        message: campaign
            .selected_functions
            .is_empty()
            .then(|| NO_INSIGHT_MESSAGE.to_string()),
        totals: DashboardTotals {
            features_collected: state.total_features_collected,
            completeness_errors: state.total_completeness_errors,
            osmcha_errors: state.osmcha_errors.clone(),
            users_engaged: engagement
                .as_ref()
                .map(EngagementSummary::users_engaged)
                .unwrap_or(0),
        },
        layout,
        panels: state.panels,
        tab_totals: state.tab_totals,
        error_rows: state.error_table.rows().to_vec(),
        engagement,
        charts: renderer.outputs(),
    };

    info!(
        campaign = %report.campaign_id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        features = report.totals.features_collected,
        users = report.totals.users_engaged,
        "dashboard complete"
    );
    Ok(report)
}

/// Aggregate the collected contributors and draw their charts. Chart failures
/// are logged; the summary is still reported.
fn finalize_engagement(
    state: &DashboardState,
    window: CampaignWindow,
    renderer: &mut dyn ChartRenderer,
) -> EngagementSummary {
    let aggregator = TimelineAggregator::new(window).with_policy(MalformedPolicy::Skip);
    let summary = match aggregator.aggregate(&state.contributors) {
        Ok(summary) => summary,
        Err(err) => {
            warn!(error = %err, "engagement aggregation failed");
            return EngagementSummary::default();
        }
    };

    if window.is_set() {
        if let Err(err) = render_engagement(renderer, &summary) {
            warn!(error = %err, "engagement charts failed");
        }
    }

    info!(
        contributors = summary.users_engaged(),
        records = state.contributors.len(),
        "mapper engagement finalized"
    );
    summary
}
