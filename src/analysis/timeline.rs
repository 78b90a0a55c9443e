use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::error::{InsightError, Result};
use crate::plotting::ContributorColor;
use crate::types::{
    instant_of, parse_date, CampaignWindow, ContributionRecord, EngagementSummary,
    GlobalHistogram, TimelineSeries,
};
use crate::utils::underscore_whitespace;

/// What to do with a contributor whose timeline can't be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Fail the whole aggregation with [`InsightError::MalformedTimeline`].
    Abort,
    /// Log, drop that record and list its identity in
    /// [`EngagementSummary::skipped`].
    #[default]
    Skip,
}

/// Merges contributor records and builds the per-contributor series and the
/// global contribution histogram.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineAggregator {
    window: CampaignWindow,
    policy: MalformedPolicy,
}

/// Running totals for one canonical identity.
struct Contributor {
    label: String,
    ways: u64,
    nodes: u64,
    timeline: Vec<(i64, u64)>,
}

impl TimelineAggregator {
    pub fn new(window: CampaignWindow) -> Self {
        Self {
            window,
            policy: MalformedPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn window(&self) -> CampaignWindow {
        self.window
    }

    /// Aggregate `records` into an [`EngagementSummary`].
    ///
    /// An unset window is a no-op and returns an empty summary.
    pub fn aggregate(&self, records: &[ContributionRecord]) -> Result<EngagementSummary> {
        let Some((start, end)) = self.window.instants() else {
            debug!("campaign window unset, skipping engagement aggregation");
            return Ok(EngagementSummary::default());
        };

        let mut summary = EngagementSummary::default();
        let contributors = self.merge_identities(records, &mut summary.skipped)?;

        for (key, contributor) in contributors {
            let points = build_points(&contributor.timeline, start, end, &mut summary.histogram);
            summary.total_ways = summary.total_ways.saturating_add(contributor.ways);
            summary.total_nodes = summary.total_nodes.saturating_add(contributor.nodes);
            summary.series.push(TimelineSeries {
                color: ContributorColor::for_name(&contributor.label),
                key,
                label: contributor.label,
                ways: contributor.ways,
                nodes: contributor.nodes,
                points,
            });
        }

        debug!(
            contributors = summary.series.len(),
            instants = summary.histogram.len(),
            skipped = summary.skipped.len(),
            "engagement aggregated"
        );
        Ok(summary)
    }

    /// Step one: merge records by canonical identity. Timelines (JSON and
    /// dates) are parsed per record before merging, so a malformed record is
    /// dropped on its own and never takes other records of the same
    /// contributor with it.
    fn merge_identities(
        &self,
        records: &[ContributionRecord],
        skipped: &mut Vec<String>,
    ) -> Result<BTreeMap<String, Contributor>> {
        let mut merged: BTreeMap<String, Contributor> = BTreeMap::new();

        for record in records {
            let timeline = match parse_timeline(record) {
                Ok(timeline) => timeline,
                Err(err) => {
                    self.reject(err, record.identity.clone(), skipped)?;
                    continue;
                }
            };

            let key = underscore_whitespace(&record.identity);
            match merged.get_mut(&key) {
                Some(existing) => {
                    existing.ways = existing.ways.saturating_add(record.way_count);
                    existing.nodes = existing.nodes.saturating_add(record.node_count);
                    existing.timeline.extend(timeline);
                }
                None => {
                    merged.insert(
                        key,
                        Contributor {
                            label: record.identity.clone(),
                            ways: record.way_count,
                            nodes: record.node_count,
                            timeline,
                        },
                    );
                }
            }
        }

        Ok(merged)
    }

    fn reject(&self, err: InsightError, identity: String, skipped: &mut Vec<String>) -> Result<()> {
        match self.policy {
            MalformedPolicy::Abort => Err(err),
            MalformedPolicy::Skip => {
                warn!(contributor = %identity, error = %err, "skipping contributor");
                skipped.push(identity);
                Ok(())
            }
        }
    }
}

/// Parse the JSON timeline text of a record into `(instant, count)` pairs.
/// Fails on bad JSON as well as on any date that isn't `YYYY-MM-DD`.
pub fn parse_timeline(record: &ContributionRecord) -> Result<Vec<(i64, u64)>> {
    let malformed = |reason: String| InsightError::MalformedTimeline {
        contributor: record.identity.clone(),
        reason,
    };

    let entries = serde_json::from_str::<Vec<(String, u64)>>(&record.timeline)
        .map_err(|e| malformed(e.to_string()))?;

    entries
        .into_iter()
        .map(|(date, count)| {
            let date = parse_date(&date).map_err(|e| malformed(e.to_string()))?;
            Ok((instant_of(date), count))
        })
        .collect()
}

/// Steps two to four for one contributor: sum counts per instant, pad to the
/// window and feed the global histogram.
fn build_points(
    timeline: &[(i64, u64)],
    start: i64,
    end: i64,
    histogram: &mut GlobalHistogram,
) -> Vec<(i64, u64)> {
    let mut by_instant: HashMap<i64, u64> = HashMap::with_capacity(timeline.len() + 2);
    for &(instant, count) in timeline {
        let total = by_instant.entry(instant).or_insert(0);
        *total = total.saturating_add(count);
        histogram.add(instant, count);
    }

    by_instant.entry(start).or_insert(0);
    by_instant.entry(end).or_insert(0);

    let mut points: Vec<(i64, u64)> = by_instant.into_iter().collect();
    points.sort_by_key(|(instant, _)| *instant);
    points
}
