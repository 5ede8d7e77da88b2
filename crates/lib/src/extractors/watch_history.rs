//! Watch-history feed: rows grouped under one section per day.

use super::list::{extract_rows, RowContext};
use crate::engine::{FieldContext, Schema};
use crate::errors::FieldResult;
use crate::types::ListItem;
use vidextract_html::Selectable;

pub const DOCUMENT: &str = "user-watch-history";

/// Where the history feed is served from.
pub const WATCH_HISTORY_URL: &str = "https://www.youtube.com/feed/history";

pub mod fields {
    pub const VIDEOS: &str = "videos";
}

pub fn schema() -> Schema {
    Schema::new(DOCUMENT).field(fields::VIDEOS, videos)
}

fn videos(ctx: &FieldContext<'_>) -> FieldResult<Vec<ListItem>> {
    let config = ctx.config();
    let selectors = &config.watch_history;

    let mut videos = Vec::new();
    for section in ctx.document().select_all(&selectors.sections) {
        let watched_at = section.text_of(&selectors.section_label).unwrap_or_default();
        let rows = section.select_all(&selectors.rows);
        videos.extend(extract_rows(
            &rows,
            &config.list_row,
            RowContext::History {
                watched_at: &watched_at,
            },
            &config.placeholder_thumbnail_url,
        ));
    }

    Ok(videos)
}
