use serde::Serialize;

use crate::campaign::{Campaign, SelectedFunction};
use crate::utils::underscore_whitespace;

/// Insight function whose payload carries contributor records.
pub const MAPPER_ENGAGEMENT: &str = "MapperEngagement";
/// Insight function whose payload carries error table rows.
pub const FEATURE_COMPLETENESS: &str = "FeatureAttributeCompleteness";

/// Shown instead of tabs when a campaign has nothing to display.
pub const NO_INSIGHT_MESSAGE: &str = "No insight Function";

/// One insight function panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightPanel {
    pub function_id: String,
    pub function: String,
    pub title: String,
    pub feature: Option<String>,
    /// Engagement panels inside a tab only feed the engagement charts
    pub hidden: bool,
}

/// Panels grouped under one campaign type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightTab {
    /// Type name with whitespace collapsed to `_`
    pub id: String,
    pub name: String,
    pub active: bool,
    pub panels: Vec<InsightPanel>,
}

/// A fetch to dispatch: which function, and which tab (if any) owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub function_id: String,
    pub function: String,
    pub tab_id: Option<String>,
}

impl Dispatch {
    /// Engagement fetches of typed tabs are the ones the completion latch waits on.
    pub fn feeds_engagement(&self) -> bool {
        self.tab_id.is_some() && self.function == MAPPER_ENGAGEMENT
    }
}

/// Tabs per campaign type plus the functions that matched no type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardLayout {
    pub tabs: Vec<InsightTab>,
    pub ungrouped: Vec<InsightPanel>,
    /// Features of every shown function, first-seen order, no duplicates
    pub feature_types: Vec<String>,
}

impl DashboardLayout {
    /// Group `campaign`'s selected functions as seen by `username`.
    pub fn build(campaign: &Campaign, username: &str) -> Self {
        let is_manager = campaign.is_manager(username);
        let visible = |function: &SelectedFunction| {
            function.name.is_some() && (!function.manager_only || is_manager)
        };

        let mut layout = Self::default();
        let mut claimed: Vec<&str> = Vec::new();

        for type_name in campaign.type_names() {
            let mut tab = InsightTab {
                id: underscore_whitespace(type_name),
                name: type_name.to_string(),
                active: layout.tabs.is_empty(),
                panels: Vec::new(),
            };

            for (function_id, function) in &campaign.selected_functions {
                if function.campaign_type.as_deref() != Some(type_name)
                    || claimed.contains(&function_id.as_str())
                {
                    continue;
                }
                claimed.push(function_id);
                if !visible(function) {
                    continue;
                }
                layout.collect_feature(function);
                tab.panels.push(InsightPanel {
                    function_id: function_id.clone(),
                    function: function.function.clone(),
                    title: function.name.clone().unwrap_or_default(),
                    feature: function.feature.clone(),
                    hidden: function.function == MAPPER_ENGAGEMENT,
                });
            }

            layout.tabs.push(tab);
        }

        for (function_id, function) in &campaign.selected_functions {
            if claimed.contains(&function_id.as_str()) || !visible(function) {
                continue;
            }
            layout.collect_feature(function);
            layout.ungrouped.push(InsightPanel {
                function_id: function_id.clone(),
                function: function.function.clone(),
                title: panel_title(function),
                feature: function.feature.clone(),
                hidden: false,
            });
        }

        layout
    }

    fn collect_feature(&mut self, function: &SelectedFunction) {
        if let Some(feature) = &function.feature {
            if !self.feature_types.contains(feature) {
                self.feature_types.push(feature.clone());
            }
        }
    }

    /// True when there is no panel to show at all.
    pub fn is_empty(&self) -> bool {
        self.ungrouped.is_empty() && self.tabs.iter().all(|tab| tab.panels.is_empty())
    }

    pub fn active_tab(&self) -> Option<&InsightTab> {
        self.tabs.iter().find(|tab| tab.active)
    }

    /// Make `tab_id` the only active tab. Returns false if no such tab exists.
    pub fn activate(&mut self, tab_id: &str) -> bool {
        if !self.tabs.iter().any(|tab| tab.id == tab_id) {
            return false;
        }
        for tab in &mut self.tabs {
            tab.active = tab.id == tab_id;
        }
        true
    }

    /// Every fetch the dashboard needs, tabs first.
    pub fn dispatches(&self) -> Vec<Dispatch> {
        let typed = self.tabs.iter().flat_map(|tab| {
            tab.panels.iter().map(move |panel| Dispatch {
                function_id: panel.function_id.clone(),
                function: panel.function.clone(),
                tab_id: Some(tab.id.clone()),
            })
        });
        let ungrouped = self.ungrouped.iter().map(|panel| Dispatch {
            function_id: panel.function_id.clone(),
            function: panel.function.clone(),
            tab_id: None,
        });
        typed.chain(ungrouped).collect()
    }

    /// Number of fetches that must complete before engagement is finalized.
    pub fn engagement_fetch_count(&self) -> usize {
        self.dispatches().iter().filter(|d| d.feeds_engagement()).count()
    }
}

/// `name`, or `name for feature` when a feature is set.
pub fn panel_title(function: &SelectedFunction) -> String {
    let name = function.name.clone().unwrap_or_default();
    match &function.feature {
        Some(feature) if !feature.is_empty() => format!("{name} for {feature}"),
        _ => name,
    }
}
