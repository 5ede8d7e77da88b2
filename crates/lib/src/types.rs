//! # Extracted Record Types
//!
//! Values stored in an `ExtractionResult`. They serialize into the result's
//! JSON fields and read back with `ExtractionResult::get`.

use serde::{Deserialize, Serialize};

/// One entry of a playlist or of the watch history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "availability", rename_all = "snake_case")]
pub enum ListItem {
    Available(AvailableItem),
    /// An entry the platform replaced with its "removed" rendering. Only the
    /// id survives.
    Unavailable { id: String },
}

impl ListItem {
    pub fn id(&self) -> &str {
        match self {
            ListItem::Available(item) => &item.id,
            ListItem::Unavailable { id } => id,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ListItem::Unavailable { .. })
    }

    pub fn as_available(&self) -> Option<&AvailableItem> {
        match self {
            ListItem::Available(item) => Some(item),
            ListItem::Unavailable { .. } => None,
        }
    }
}

/// A fully rendered list entry; every string is trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableItem {
    pub id: String,
    pub title: String,
    pub duration_ms: u64,
    pub channel_name: String,
    pub channel_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Watch history only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Watch history only: the label of the date section the entry sits in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_at: Option<String>,
    /// Watch history only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub url: String,
    pub thumbnail: String,
}

/// A related video from a video page's sidebar. Durations are lazy-loaded
/// by the platform, so `duration_ms` is often `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedVideo {
    pub id: String,
    pub title: String,
    pub duration_ms: u64,
    pub channel_name: String,
    pub watched_percentage: f64,
    pub uploaded_at_string: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribedChannel {
    pub channel_id: String,
    pub channel_name: String,
    pub channel_url: String,
    pub thumbnail_url: String,
    pub subscriber_count_string: String,
    pub notifications_enabled: bool,
}
