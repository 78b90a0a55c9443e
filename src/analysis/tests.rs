use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use super::*;
use crate::error::InsightError;
use crate::plotting::ContributorColor;
use crate::types::{instant_of, CampaignWindow, ContributionRecord};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn instant(y: i32, m: u32, d: u32) -> i64 {
    instant_of(date(y, m, d))
}

fn january() -> CampaignWindow {
    CampaignWindow::new(date(2021, 1, 1), date(2021, 1, 31))
}

fn record(name: &str, ways: u64, nodes: u64, timeline: &str) -> ContributionRecord {
    ContributionRecord::new(name, ways, nodes, timeline)
}

#[test]
fn test_merge_by_identity() {
    let records = vec![
        record("Jane Doe", 2, 10, r#"[["2021-01-05", 1]]"#),
        record("Jane_Doe", 3, 5, r#"[["2021-01-06", 2]]"#),
    ];

    let summary = TimelineAggregator::new(january()).aggregate(&records).unwrap();

    assert_eq!(summary.users_engaged(), 1);
    let jane = &summary.series[0];
    assert_eq!(jane.key, "Jane_Doe");
    assert_eq!(jane.label, "Jane Doe");
    assert_eq!(jane.ways, 5);
    assert_eq!(jane.nodes, 15);
    assert_eq!(
        jane.points,
        vec![
            (instant(2021, 1, 1), 0),
            (instant(2021, 1, 5), 1),
            (instant(2021, 1, 6), 2),
            (instant(2021, 1, 31), 0),
        ]
    );
    assert_eq!(summary.total_ways, 5);
    assert_eq!(summary.total_nodes, 15);
}

#[test]
fn test_boundary_padding() {
    let records = vec![record("Jane Doe", 0, 0, r#"[["2021-01-15", 5]]"#)];

    let summary = TimelineAggregator::new(january()).aggregate(&records).unwrap();

    assert_eq!(
        summary.series[0].points,
        vec![
            (instant(2021, 1, 1), 0),
            (instant(2021, 1, 15), 5),
            (instant(2021, 1, 31), 0),
        ]
    );
}

#[test]
fn test_boundaries_not_duplicated() {
    let records = vec![record(
        "Jane Doe",
        0,
        0,
        r#"[["2021-01-31", 4], ["2021-01-01", 2]]"#,
    )];

    let summary = TimelineAggregator::new(january()).aggregate(&records).unwrap();

    assert_eq!(
        summary.series[0].points,
        vec![(instant(2021, 1, 1), 2), (instant(2021, 1, 31), 4)]
    );
}

#[test]
fn test_histogram_summation() {
    let records = vec![
        record("Jane Doe", 1, 1, r#"[["2021-01-15", 3]]"#),
        record("John Roe", 1, 1, r#"[["2021-01-15", 3]]"#),
    ];

    let summary = TimelineAggregator::new(january()).aggregate(&records).unwrap();

    assert_eq!(summary.users_engaged(), 2);
    assert_eq!(summary.histogram.get(instant(2021, 1, 15)), Some(6));
    // The histogram never receives window padding
    assert_eq!(summary.histogram.len(), 1);
    assert_eq!(summary.histogram.get(instant(2021, 1, 1)), None);
}

#[test]
fn test_duplicate_dates_are_summed() {
    let records = vec![
        record("Jane Doe", 0, 0, r#"[["2021-01-10", 2], ["2021-01-10", 5]]"#),
        record("Jane  Doe", 0, 0, r#"[["2021-01-10", 1]]"#),
    ];

    let summary = TimelineAggregator::new(january()).aggregate(&records).unwrap();

    assert_eq!(summary.users_engaged(), 1);
    assert_eq!(
        summary.series[0].points,
        vec![
            (instant(2021, 1, 1), 0),
            (instant(2021, 1, 10), 8),
            (instant(2021, 1, 31), 0),
        ]
    );
    assert_eq!(summary.histogram.get(instant(2021, 1, 10)), Some(8));
}

#[test]
fn test_out_of_order_timeline_is_sorted() {
    let records = vec![record(
        "Jane Doe",
        0,
        0,
        r#"[["2021-01-20", 1], ["2021-01-03", 2], ["2021-01-25", 3], ["2021-01-04", 4]]"#,
    )];

    let summary = TimelineAggregator::new(january()).aggregate(&records).unwrap();

    let instants: Vec<i64> = summary.series[0].points.iter().map(|(i, _)| *i).collect();
    let mut sorted = instants.clone();
    sorted.sort();
    assert_eq!(instants, sorted);
    assert_eq!(instants.len(), 6);

    let keys: Vec<i64> = summary.histogram.iter().map(|(i, _)| i).collect();
    assert_eq!(
        keys,
        vec![
            instant(2021, 1, 3),
            instant(2021, 1, 4),
            instant(2021, 1, 20),
            instant(2021, 1, 25),
        ]
    );
}

#[test]
fn test_points_outside_window_are_kept() {
    let records = vec![record("Jane Doe", 0, 0, r#"[["2020-12-30", 7]]"#)];

    let summary = TimelineAggregator::new(january()).aggregate(&records).unwrap();

    assert_eq!(
        summary.series[0].points,
        vec![
            (instant(2020, 12, 30), 7),
            (instant(2021, 1, 1), 0),
            (instant(2021, 1, 31), 0),
        ]
    );
}

#[test]
fn test_unset_window_is_noop() {
    let records = vec![record("Jane Doe", 1, 1, "not json at all")];

    for window in [
        CampaignWindow::unset(),
        CampaignWindow {
            start: Some(date(2021, 1, 1)),
            end: None,
        },
    ] {
        let summary = TimelineAggregator::new(window)
            .with_policy(MalformedPolicy::Abort)
            .aggregate(&records)
            .unwrap();
        assert!(summary.series.is_empty());
        assert!(summary.histogram.is_empty());
        assert!(summary.is_empty());
    }
}

#[test]
fn test_malformed_timeline_aborts() {
    let records = vec![
        record("Jane Doe", 1, 1, r#"[["2021-01-15", 3]]"#),
        record("John Roe", 1, 1, "[[2021-01-15"),
    ];

    let err = TimelineAggregator::new(january())
        .with_policy(MalformedPolicy::Abort)
        .aggregate(&records)
        .unwrap_err();

    match err {
        InsightError::MalformedTimeline { contributor, .. } => assert_eq!(contributor, "John Roe"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_malformed_timeline_is_skipped() {
    let records = vec![
        record("Jane Doe", 1, 1, r#"[["2021-01-15", 3]]"#),
        record("John Roe", 4, 4, r#"{"2021-01-15": 3}"#),
        record("Max Moe", 2, 2, r#"[["15/01/2021", 3]]"#),
    ];

    let summary = TimelineAggregator::new(january()).aggregate(&records).unwrap();

    assert_eq!(summary.users_engaged(), 1);
    assert_eq!(summary.series[0].label, "Jane Doe");
    assert_eq!(summary.skipped, vec!["John Roe".to_string(), "Max Moe".to_string()]);
    // A rejected contributor contributes nothing to the totals
    assert_eq!(summary.histogram.get(instant(2021, 1, 15)), Some(3));
    assert_eq!(summary.total_ways, 1);
}

#[test]
fn test_bad_record_does_not_spoil_merge() {
    let records = vec![
        record("Jane Doe", 1, 1, r#"[["2021-01-15", 3]]"#),
        record("Jane Doe", 9, 9, "garbage"),
    ];

    let summary = TimelineAggregator::new(january()).aggregate(&records).unwrap();

    assert_eq!(summary.series[0].ways, 1);
    assert_eq!(summary.skipped, vec!["Jane Doe".to_string()]);
}

#[test]
fn test_bad_date_does_not_spoil_merge() {
    let records = vec![
        record("Jane Doe", 1, 2, r#"[["2021-01-15", 3]]"#),
        record("Jane Doe", 9, 9, r#"[["15/01/2021", 2]]"#),
    ];

    let summary = TimelineAggregator::new(january()).aggregate(&records).unwrap();

    assert_eq!(summary.users_engaged(), 1);
    let jane = &summary.series[0];
    assert_eq!((jane.ways, jane.nodes), (1, 2));
    assert_eq!(
        jane.points,
        vec![
            (instant(2021, 1, 1), 0),
            (instant(2021, 1, 15), 3),
            (instant(2021, 1, 31), 0),
        ]
    );
    assert_eq!(summary.histogram.get(instant(2021, 1, 15)), Some(3));
    assert_eq!(summary.skipped, vec!["Jane Doe".to_string()]);
}

#[test]
fn test_parse_timeline_rejects_bad_dates() {
    let good = record("Jane Doe", 0, 0, r#"[["2021-01-15", 3], ["2021-01-01", 1]]"#);
    assert_eq!(
        parse_timeline(&good).unwrap(),
        vec![(instant(2021, 1, 15), 3), (instant(2021, 1, 1), 1)]
    );

    let bad = record("Jane Doe", 0, 0, r#"[["2021-01-15", 3], ["2021-13-01", 1]]"#);
    assert!(matches!(
        parse_timeline(&bad),
        Err(InsightError::MalformedTimeline { .. })
    ));
}

#[test]
fn test_huge_counters_saturate() {
    let records = vec![
        record("Jane Doe", u64::MAX, u64::MAX, &format!(r#"[["2021-01-15", {}]]"#, u64::MAX)),
        record("Jane_Doe", 1, 1, r#"[["2021-01-15", 1]]"#),
        record("John Roe", 5, 5, r#"[["2021-01-15", 1]]"#),
    ];

    let summary = TimelineAggregator::new(january()).aggregate(&records).unwrap();

    let jane = &summary.series[0];
    assert_eq!(jane.ways, u64::MAX);
    assert_eq!(jane.points[1], (instant(2021, 1, 15), u64::MAX));
    assert_eq!(summary.total_ways, u64::MAX);
    assert_eq!(summary.histogram.get(instant(2021, 1, 15)), Some(u64::MAX));
}

#[test]
fn test_colors_follow_labels() {
    let records = vec![
        record("Jane Doe", 0, 0, "[]"),
        record("John Roe", 0, 0, "[]"),
    ];

    let first = TimelineAggregator::new(january()).aggregate(&records).unwrap();
    let second = TimelineAggregator::new(january()).aggregate(&records).unwrap();

    for series in &first.series {
        assert_eq!(series.color, ContributorColor::for_name(&series.label));
    }
    assert_eq!(first, second);
}

#[test]
fn test_empty_timeline_is_only_padding() {
    let records = vec![record("Jane Doe", 0, 0, "[]")];

    let summary = TimelineAggregator::new(january()).aggregate(&records).unwrap();

    assert_eq!(
        summary.series[0].points,
        vec![(instant(2021, 1, 1), 0), (instant(2021, 1, 31), 0)]
    );
    assert!(summary.histogram.is_empty());
}
