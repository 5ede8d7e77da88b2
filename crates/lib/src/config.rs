//! # Extractor Configuration
//!
//! The selectors tied to the platform's current markup live here rather than
//! in the extractors, so a markup change can be absorbed by a YAML override
//! instead of a release. Every key has a default; a partial YAML document
//! only replaces the keys it names.

use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// The generic image the platform shows for removed or private videos.
pub const PLACEHOLDER_THUMBNAIL_URL: &str = "https://i.ytimg.com/img/no_thumbnail.jpg";

/// Locator of the embedded linked-data payload.
pub const LINKED_DATA_SELECTOR: &str = r#"script[type="application/ld+json"]#scriptTag"#;

/// The root configuration structure, mapping directly to a YAML document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Thumbnail URL that marks a list row as removed by the platform.
    pub placeholder_thumbnail_url: String,
    /// Selector of the `<script>` holding the linked-data JSON.
    pub linked_data_selector: String,
    /// Per-row selectors shared by the playlist and watch-history lists.
    pub list_row: ListRowSelectors,
    pub playlist: PlaylistSelectors,
    pub video: VideoSelectors,
    pub watch_history: WatchHistorySelectors,
    pub subscriptions: SubscriptionSelectors,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            placeholder_thumbnail_url: PLACEHOLDER_THUMBNAIL_URL.to_string(),
            linked_data_selector: LINKED_DATA_SELECTOR.to_string(),
            list_row: ListRowSelectors::default(),
            playlist: PlaylistSelectors::default(),
            video: VideoSelectors::default(),
            watch_history: WatchHistorySelectors::default(),
            subscriptions: SubscriptionSelectors::default(),
        }
    }
}

impl ExtractorConfig {
    /// Parses a YAML document, filling every unnamed key with its default.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads the configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading extractor configuration from {}", path.display());
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }
}

/// Selectors evaluated inside one repeated video row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListRowSelectors {
    /// Link whose query carries the video id.
    pub link: String,
    /// Query parameter holding the video id.
    pub id_param: String,
    pub title: String,
    pub duration: String,
    /// Anchor inside the channel-name block; its text is the name and its
    /// `href` the channel URL.
    pub channel_link: String,
    pub thumbnail_image: String,
    pub description: String,
    /// Progress bar whose inline `width` is the watched percentage.
    pub resume_bar: String,
}

impl Default for ListRowSelectors {
    fn default() -> Self {
        Self {
            link: "a#thumbnail".into(),
            id_param: "v".into(),
            title: "#video-title".into(),
            duration: ".ytd-thumbnail-overlay-time-status-renderer:not([hidden])".into(),
            channel_link: ".ytd-channel-name a".into(),
            thumbnail_image: "a#thumbnail img".into(),
            description: "#description-text".into(),
            resume_bar: ".ytd-thumbnail .ytd-thumbnail-overlay-resume-playback-renderer".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaylistSelectors {
    /// Meta tag whose `content` URL carries the playlist id.
    pub url_meta: String,
    pub id_param: String,
    pub title: String,
    pub description: String,
    pub video_count: String,
    pub view_count: String,
    pub updated_at: String,
    pub rows: String,
}

impl Default for PlaylistSelectors {
    fn default() -> Self {
        let stat = |n: u8| {
            format!(
                "div#stats > .style-scope.ytd-playlist-sidebar-primary-info-renderer:nth-child({n})"
            )
        };
        Self {
            url_meta: r#"meta[property="og:url"]"#.into(),
            id_param: "list".into(),
            title: "h1#title".into(),
            description: "div#description".into(),
            video_count: stat(1),
            view_count: stat(2),
            updated_at: stat(3),
            rows: "#contents > .ytd-playlist-video-list-renderer".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VideoSelectors {
    pub canonical_link: String,
    pub id_param: String,
    pub channel_link: String,
    pub channel_image: String,
    pub like_bar: String,
    pub sentiment_tooltip: String,
    /// Separator between the up and down counts in the sentiment tooltip.
    pub sentiment_separator: String,
    pub hashtag_links: String,
    pub clarify_box: String,
    pub recommended_tags: String,
    pub recommended_rows: String,
    pub recommended_link: String,
    pub recommended_title: String,
    pub recommended_duration: String,
    pub recommended_channel_name: String,
    pub recommended_resume_bar: String,
    pub recommended_uploaded_at: String,
}

impl Default for VideoSelectors {
    fn default() -> Self {
        Self {
            canonical_link: "link[rel=canonical]".into(),
            id_param: "v".into(),
            channel_link: r#"#upload-info a[href^="/channel/"]"#.into(),
            channel_image: "#meta #img".into(),
            like_bar: "#like-bar".into(),
            sentiment_tooltip: "#sentiment #tooltip".into(),
            sentiment_separator: " / ".into(),
            hashtag_links: r#"a[href^="/hashtag/"]"#.into(),
            clarify_box: "#clarify-box".into(),
            recommended_tags: "#chips #text".into(),
            recommended_rows: "#related ytd-compact-video-renderer".into(),
            recommended_link: ".metadata > a".into(),
            recommended_title: ".metadata #video-title".into(),
            recommended_duration: ".ytd-thumbnail-overlay-time-status-renderer".into(),
            recommended_channel_name: ".metadata .ytd-channel-name #text".into(),
            recommended_resume_bar:
                ".ytd-thumbnail .ytd-thumbnail-overlay-resume-playback-renderer".into(),
            recommended_uploaded_at:
                "#metadata-line span.style-scope.ytd-video-meta-block:nth-child(2)".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WatchHistorySelectors {
    /// One section per day; rows are grouped under it.
    pub sections: String,
    pub section_label: String,
    pub rows: String,
}

impl Default for WatchHistorySelectors {
    fn default() -> Self {
        Self {
            sections: "#contents .ytd-section-list-renderer".into(),
            section_label: "#title".into(),
            rows: "ytd-video-renderer".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SubscriptionSelectors {
    pub rows: String,
    pub channel_link: String,
    pub channel_name: String,
    pub avatar_image: String,
    pub subscriber_count: String,
    pub notification_icon: String,
    /// Attribute of the notification icon naming the icon shown.
    pub notification_icon_attr: String,
    /// Icon name shown while notifications are switched on.
    pub notifications_active_icon: String,
}

impl Default for SubscriptionSelectors {
    fn default() -> Self {
        Self {
            rows: "#contents ytd-channel-renderer".into(),
            channel_link: "a#main-link".into(),
            channel_name: "#channel-title #text".into(),
            avatar_image: "#avatar img".into(),
            subscriber_count: "#subscribers".into(),
            notification_icon: "#notification-preference-button yt-icon".into(),
            notification_icon_attr: "icon".into(),
            notifications_active_icon: "notifications_active".into(),
        }
    }
}
