//! Playlist page: header metadata from the sidebar plus the list of videos.

use super::list::{extract_rows, RowContext};
use crate::engine::{FieldContext, Schema};
use crate::errors::{FieldError, FieldResult};
use crate::normalize::{extract_number, query_param};
use crate::types::ListItem;
use vidextract_html::Selectable;

pub const DOCUMENT: &str = "playlist-page";

/// Field names of the playlist schema, in declaration order.
pub mod fields {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const VIEW_COUNT: &str = "view_count";
    pub const VIDEO_COUNT: &str = "video_count";
    pub const UPDATED_AT_STRING: &str = "updated_at_string";
    pub const VIDEOS: &str = "videos";
}

pub fn schema() -> Schema {
    Schema::new(DOCUMENT)
        .field(fields::ID, id)
        .field(fields::TITLE, title)
        .field(fields::DESCRIPTION, description)
        .field(fields::VIEW_COUNT, view_count)
        .field(fields::VIDEO_COUNT, video_count)
        .field(fields::UPDATED_AT_STRING, updated_at_string)
        .field(fields::VIDEOS, videos)
        .identity(fields::ID)
}

/// The `list` parameter of the page's `og:url`.
fn id(ctx: &FieldContext<'_>) -> FieldResult<String> {
    let selectors = &ctx.config().playlist;
    let url = ctx
        .document()
        .attr_of(&selectors.url_meta, "content")
        .ok_or_else(|| FieldError::missing("no og:url meta tag"))?;
    query_param(&url, &selectors.id_param)
        .ok_or_else(|| FieldError::malformed(format!("og:url `{url}` carries no playlist id")))
}

fn title(ctx: &FieldContext<'_>) -> FieldResult<String> {
    ctx.document()
        .text_of(&ctx.config().playlist.title)
        .ok_or_else(|| FieldError::missing("playlist title is empty"))
}

fn description(ctx: &FieldContext<'_>) -> FieldResult<String> {
    Ok(ctx
        .document()
        .text_of(&ctx.config().playlist.description)
        .unwrap_or_default())
}

/// A playlist nobody watched reads "No views"; that is a count of zero.
fn view_count(ctx: &FieldContext<'_>) -> FieldResult<u64> {
    Ok(stat_number(ctx, &ctx.config().playlist.view_count))
}

fn video_count(ctx: &FieldContext<'_>) -> FieldResult<u64> {
    Ok(stat_number(ctx, &ctx.config().playlist.video_count))
}

fn updated_at_string(ctx: &FieldContext<'_>) -> FieldResult<String> {
    ctx.document()
        .text_of(&ctx.config().playlist.updated_at)
        .ok_or_else(|| FieldError::missing("no last-updated label"))
}

fn videos(ctx: &FieldContext<'_>) -> FieldResult<Vec<ListItem>> {
    let config = ctx.config();
    let rows = ctx.document().select_all(&config.playlist.rows);
    Ok(extract_rows(
        &rows,
        &config.list_row,
        RowContext::Playlist,
        &config.placeholder_thumbnail_url,
    ))
}

fn stat_number(ctx: &FieldContext<'_>, selector: &str) -> u64 {
    ctx.document()
        .text_of(selector)
        .and_then(|text| extract_number(&text))
        .unwrap_or(0)
}
