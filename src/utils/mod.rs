mod aggregation;

use once_cell::sync::Lazy;
use regex::Regex;

pub use aggregation::downsample_points;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every run of whitespace into a single `_`.
///
/// Used as the merge key for contributor names and as the DOM-safe id of
/// campaign type tabs.
pub fn underscore_whitespace(name: &str) -> String {
    WHITESPACE.replace_all(name, "_").into_owned()
}
