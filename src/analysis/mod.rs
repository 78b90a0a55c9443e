mod progress;
mod timeline;

#[cfg(test)]
mod tests;

pub use progress::CampaignProgress;
pub use timeline::{parse_timeline, MalformedPolicy, TimelineAggregator};
