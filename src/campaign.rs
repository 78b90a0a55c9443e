//! # Campaign documents
//!
//! A campaign is stored as `<folder>/<uuid>.json`. Only the fields the
//! dashboard needs are modelled; everything else in the document is ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{InsightError, Result};
use crate::types::CampaignWindow;

/// Attributes every campaign document must carry.
const REQUIRED_ATTRIBUTES: [&str; 5] = ["uuid", "version", "campaign_creator", "edited_by", "name"];

/// An insight function attached to a campaign.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedFunction {
    /// Insight function class, e.g. `FeatureAttributeCompleteness`
    pub function: String,
    /// OSM feature filter, e.g. `amenity=school`
    #[serde(default)]
    pub feature: Option<String>,
    #[serde(default)]
    pub attributes: Option<Value>,
    /// Campaign type this function belongs to
    #[serde(default, rename = "type")]
    pub campaign_type: Option<String>,
    #[serde(default)]
    pub manager_only: bool,
    /// Human readable title; functions without one are not shown
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignType {
    #[serde(rename = "type")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub uuid: String,
    pub version: u64,
    pub name: String,
    pub campaign_creator: String,
    pub edited_by: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub campaign_managers: Vec<String>,
    #[serde(default)]
    pub selected_functions: BTreeMap<String, SelectedFunction>,
    #[serde(default, alias = "campaign_types")]
    pub types: BTreeMap<String, CampaignType>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Campaign {
    /// Path of the document for `uuid` inside `folder`.
    pub fn json_path(folder: &Path, uuid: &str) -> PathBuf {
        folder.join(format!("{uuid}.json"))
    }

    /// Load and validate the campaign `uuid` from `folder`.
    pub fn load(folder: &Path, uuid: &str) -> Result<Self> {
        let path = Self::json_path(folder, uuid);
        if !path.is_file() {
            return Err(InsightError::CampaignNotFound(uuid.to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_json(&content, uuid)
    }

    /// Parse and validate a campaign document that should belong to `uuid`.
    pub fn from_json(content: &str, uuid: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        validate(&value, uuid)?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn window(&self) -> Result<CampaignWindow> {
        CampaignWindow::parse(self.start_date.as_deref(), self.end_date.as_deref())
    }

    pub fn is_manager(&self, username: &str) -> bool {
        self.campaign_managers.iter().any(|m| m == username)
    }

    /// Campaign type names in document order.
    pub fn type_names(&self) -> Vec<&str> {
        self.types.values().map(|t| t.name.as_str()).collect()
    }
}

/// Check required attributes and that the document's uuid is `uuid`.
pub fn validate(value: &Value, uuid: &str) -> Result<()> {
    for attribute in REQUIRED_ATTRIBUTES {
        if value.get(attribute).is_none() {
            return Err(InsightError::MissingAttribute(attribute));
        }
    }
    match value.get("uuid").and_then(Value::as_str) {
        Some(found) if found == uuid => Ok(()),
        found => Err(InsightError::UuidMismatch {
            expected: uuid.to_string(),
            found: found.map(str::to_string).unwrap_or_else(|| value["uuid"].to_string()),
        }),
    }
}
