//! # vidextract
//!
//! Best-effort extraction of structured records (playlists, videos, watch
//! history entries, subscribed channels) from rendered pages of a video
//! platform.
//!
//! Each page type is described by a field `Schema`: independent extractors,
//! one per output field. The `engine` runs them against a parsed document and
//! isolates failures per field, so a missing or malformed field never costs
//! the others. Callers receive an `ExtractionResult` holding the fields that
//! succeeded and an ordered list of the ones that did not, and decide for
//! themselves whether the partial result is good enough.

pub mod config;
pub mod engine;
pub mod errors;
pub mod extractors;
pub mod linked_data;
pub mod normalize;
pub mod types;

pub use config::ExtractorConfig;
pub use engine::{ErrorFilter, ExtractionResult, FieldContext, Schema};
pub use errors::{
    ConfigError, DocumentError, ExtractionError, FieldError, FieldErrorKind, FieldResult,
};
pub use linked_data::LinkedData;
pub use types::{AvailableItem, Channel, ListItem, RecommendedVideo, SubscribedChannel};
pub use vidextract_html::{Document, Node, Selectable};

use extractors::{playlist, subscriptions, video, watch_history};

/// Extracts every supported page type with one configuration.
#[derive(Debug, Clone, Default)]
pub struct PageParser {
    config: ExtractorConfig,
}

impl PageParser {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts a playlist page. Fails only when no playlist id can be read.
    pub fn playlist(&self, html: &str) -> Result<ExtractionResult, DocumentError> {
        engine::extract_document(html, &playlist::schema(), &self.config)
    }

    /// Extracts a video page. Fails only when no video id can be read. A
    /// duration error on live content is dropped from the result.
    pub fn video(&self, html: &str) -> Result<ExtractionResult, DocumentError> {
        engine::extract_document(html, &video::schema(), &self.config)
    }

    /// Extracts the watch history feed. The schema has no identity field, so
    /// this never returns `Err`.
    pub fn watch_history(&self, html: &str) -> Result<ExtractionResult, DocumentError> {
        engine::extract_document(html, &watch_history::schema(), &self.config)
    }

    /// Extracts the subscribed-channels page. Never returns `Err`.
    pub fn subscribed_channels(&self, html: &str) -> Result<ExtractionResult, DocumentError> {
        engine::extract_document(html, &subscriptions::schema(), &self.config)
    }
}

/// Extracts a playlist page with the default configuration.
pub fn parse_playlist_page(html: &str) -> Result<ExtractionResult, DocumentError> {
    PageParser::default().playlist(html)
}

/// Extracts a video page with the default configuration.
pub fn parse_video_page(html: &str) -> Result<ExtractionResult, DocumentError> {
    PageParser::default().video(html)
}

/// Extracts the watch history feed with the default configuration.
pub fn parse_watch_history(html: &str) -> Result<ExtractionResult, DocumentError> {
    PageParser::default().watch_history(html)
}

/// Extracts the subscribed-channels page with the default configuration.
pub fn parse_subscribed_channels_page(html: &str) -> Result<ExtractionResult, DocumentError> {
    PageParser::default().subscribed_channels(html)
}
