//! Interpretation of the HTML fragments returned by insight functions.
//!
//! Fragments are opaque markup; the dashboard only looks for a handful of
//! well-known markers in them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::ContributionRecord;

static TOTAL_FEATURES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class\s*=\s*"[^"]*\btotal-features\b[^"]*"[^>]*>\s*(\d+)"#).unwrap()
});

static INSIGHT_SUMMARIES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class\s*=\s*"[^"]*\binsight-summaries\b[^"]*"[^>]*>(.*?)</div>"#).unwrap()
});

static CONTRIBUTORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bcontributors\s*=\s*\[").unwrap());

static FEATURE_COMPLETENESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfeatureCompleteness\s*=\s*\[").unwrap());

/// A row of the feature completeness error table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String, String)")]
pub struct ErrorRow {
    pub name: String,
    #[serde(rename = "type")]
    pub feature_type: String,
    pub status: String,
}

impl From<(String, String, String)> for ErrorRow {
    fn from((name, feature_type, status): (String, String, String)) -> Self {
        Self {
            name,
            feature_type,
            status,
        }
    }
}

/// Value of the `total-features` element, if the fragment has one.
pub fn total_features(html: &str) -> Option<u64> {
    TOTAL_FEATURES
        .captures(html)
        .and_then(|caps| caps[1].parse().ok())
}

/// Inner markup of the `insight-summaries` element, if present.
pub fn insight_summaries(html: &str) -> Option<String> {
    INSIGHT_SUMMARIES
        .captures(html)
        .map(|caps| caps[1].trim().to_string())
        .filter(|summary| !summary.is_empty())
}

/// Contributor records embedded by the mapper engagement fragment.
pub fn contributors(html: &str) -> Result<Vec<ContributionRecord>> {
    embedded_array(html, &CONTRIBUTORS)
}

/// Error rows embedded by the feature completeness fragment.
pub fn completeness_rows(html: &str) -> Result<Vec<ErrorRow>> {
    embedded_array(html, &FEATURE_COMPLETENESS)
}

/// Decode the JSON array assigned to a script variable. A fragment without
/// the assignment yields an empty list.
fn embedded_array<T: DeserializeOwned>(html: &str, marker: &Regex) -> Result<Vec<T>> {
    let Some(found) = marker.find(html) else {
        return Ok(Vec::new());
    };
    // The match ends just past the opening bracket; whatever follows the
    // array is left unread
    let mut deserializer = serde_json::Deserializer::from_str(&html[found.end() - 1..]);
    Ok(Vec::<T>::deserialize(&mut deserializer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InsightError;
    use pretty_assertions::assert_eq;

    const FEATURE_FRAGMENT: &str = r#"
        <div class="insight-title">Feature completeness</div>
        <div class="total-features">42</div>
        <div class="insight-summaries side-summary">
            <span>80% complete</span>
        </div>
        <script>
            featureCompleteness = [["School A", "node", "missing name"], ["School B", "way", "ok"]];
        </script>
    "#;

    const ENGAGEMENT_FRAGMENT: &str = r#"
        <div class="mapper-engagement"></div>
        <script>
            var contributors = [
                {"name": "Jane Doe", "ways": 3, "nodes": 5, "timeline": "[[\"2021-01-15\", 3]]"},
                {"name": "John Roe", "ways": 1, "nodes": 0, "timeline": "[]"}
            ];
        </script>
    "#;

    #[test]
    fn test_total_features() {
        assert_eq!(total_features(FEATURE_FRAGMENT), Some(42));
        assert_eq!(total_features(r#"<span class="count total-features big"> 7 </span>"#), Some(7));
        assert_eq!(total_features(ENGAGEMENT_FRAGMENT), None);
    }

    #[test]
    fn test_insight_summaries() {
        assert_eq!(
            insight_summaries(FEATURE_FRAGMENT).as_deref(),
            Some("<span>80% complete</span>")
        );
        assert_eq!(insight_summaries(r#"<div class="insight-summaries"> </div>"#), None);
        assert_eq!(insight_summaries(ENGAGEMENT_FRAGMENT), None);
    }

    #[test]
    fn test_completeness_rows() {
        let rows = completeness_rows(FEATURE_FRAGMENT).unwrap();
        assert_eq!(
            rows,
            vec![
                ErrorRow::from(("School A".to_string(), "node".to_string(), "missing name".to_string())),
                ErrorRow::from(("School B".to_string(), "way".to_string(), "ok".to_string())),
            ]
        );
        assert!(completeness_rows(ENGAGEMENT_FRAGMENT).unwrap().is_empty());
    }

    #[test]
    fn test_contributors() {
        let records = contributors(ENGAGEMENT_FRAGMENT).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ContributionRecord::new("Jane Doe", 3, 5, r#"[["2021-01-15", 3]]"#));
        assert!(contributors(FEATURE_FRAGMENT).unwrap().is_empty());
    }

    #[test]
    fn test_broken_embedded_array() {
        let err = contributors("contributors = [{\"name\": ").unwrap_err();
        assert!(matches!(err, InsightError::Json(_)));
    }

    #[test]
    fn test_error_row_serializes_as_object() {
        let row = ErrorRow::from(("A".to_string(), "node".to_string(), "ok".to_string()));
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            serde_json::json!({"name": "A", "type": "node", "status": "ok"})
        );
    }
}
