//! Video watch page.
//!
//! Most metadata comes from the page's linked-data payload, which is more
//! stable than the rendered markup. The markup is still the only source for
//! the channel block, the vote counts, hashtags and the sidebar.

use crate::engine::{ErrorFilter, ExtractionResult, FieldContext, Schema};
use crate::errors::{ExtractionError, FieldError, FieldResult, LookupError};
use crate::linked_data::LinkedData;
use crate::normalize::{
    compact_duration_ms, extract_number, last_path_segment, machine_duration_ms,
    parse_percentage, query_param,
};
use crate::types::{Channel, RecommendedVideo};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;
use vidextract_html::{Node, Selectable};

pub const DOCUMENT: &str = "video-page";

pub mod fields {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const DURATION_MS: &str = "duration_ms";
    pub const CHANNEL: &str = "channel";
    pub const UPLOAD_DATE: &str = "upload_date";
    pub const VIEW_COUNT: &str = "view_count";
    pub const UPVOTES: &str = "upvotes";
    pub const DOWNVOTES: &str = "downvotes";
    pub const CATEGORY: &str = "category";
    pub const IS_LIVE: &str = "is_live";
    pub const WAS_LIVE: &str = "was_live";
    pub const HASHTAGS: &str = "hashtags";
    pub const CLARIFY_BOX: &str = "clarify_box";
    pub const RECOMMENDED_TAGS: &str = "recommended_tags";
    pub const RECOMMENDED_VIDEOS: &str = "recommended_videos";
}

/// A live stream has no duration yet, so its duration error is expected.
pub const SUPPRESS_LIVE_DURATION_ERROR: ErrorFilter = ErrorFilter {
    name: "suppress_live_duration_error",
    apply: suppress_live_duration_error,
};

pub fn schema() -> Schema {
    Schema::new(DOCUMENT)
        .field(fields::ID, id)
        .field(fields::TITLE, title)
        .field(fields::DESCRIPTION, description)
        .field(fields::DURATION_MS, duration_ms)
        .field(fields::CHANNEL, channel)
        .field(fields::UPLOAD_DATE, upload_date)
        .field(fields::VIEW_COUNT, view_count)
        .field(fields::UPVOTES, upvotes)
        .field(fields::DOWNVOTES, downvotes)
        .field(fields::CATEGORY, category)
        .field(fields::IS_LIVE, is_live)
        .field(fields::WAS_LIVE, was_live)
        .field(fields::HASHTAGS, hashtags)
        .field(fields::CLARIFY_BOX, clarify_box)
        .field(fields::RECOMMENDED_TAGS, recommended_tags)
        .field(fields::RECOMMENDED_VIDEOS, recommended_videos)
        .identity(fields::ID)
        .error_filter(SUPPRESS_LIVE_DURATION_ERROR)
}

fn suppress_live_duration_error(result: &ExtractionResult) -> Vec<ExtractionError> {
    let is_live = result.get::<bool>(fields::IS_LIVE).unwrap_or(false);
    result
        .errors
        .iter()
        .filter(|e| !(is_live && e.field == fields::DURATION_MS))
        .cloned()
        .collect()
}

fn id(ctx: &FieldContext<'_>) -> FieldResult<String> {
    let selectors = &ctx.config().video;
    let url = ctx
        .document()
        .attr_of(&selectors.canonical_link, "href")
        .ok_or_else(|| FieldError::missing("no canonical link"))?;
    query_param(&url, &selectors.id_param)
        .ok_or_else(|| FieldError::malformed(format!("invalid video id in `{url}`")))
}

fn title(ctx: &FieldContext<'_>) -> FieldResult<String> {
    Ok(ctx.linked_data()?.str_field("name")?.to_string())
}

fn description(ctx: &FieldContext<'_>) -> FieldResult<String> {
    Ok(ctx
        .linked_data()?
        .opt_str_field("description")?
        .unwrap_or_default()
        .to_string())
}

fn duration_ms(ctx: &FieldContext<'_>) -> FieldResult<u64> {
    let raw = ctx.linked_data()?.str_field("duration")?;
    match machine_duration_ms(raw) {
        0 => Err(FieldError::malformed(format!("invalid duration `{raw}`"))),
        ms => Ok(ms),
    }
}

fn channel(ctx: &FieldContext<'_>) -> FieldResult<Channel> {
    let selectors = &ctx.config().video;
    let document = ctx.document();
    let link = document
        .select_first(&selectors.channel_link)
        .ok_or_else(|| FieldError::missing("no channel link"))?;
    let url = link
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or_else(|| FieldError::missing("channel link has no href"))?;
    let id = last_path_segment(url)
        .ok_or_else(|| FieldError::malformed(format!("channel url `{url}` has no id")))?;

    Ok(Channel {
        id: id.to_string(),
        name: link.trimmed_text(),
        url: url.to_string(),
        thumbnail: document
            .attr_of(&selectors.channel_image, "src")
            .unwrap_or_default(),
    })
}

/// `uploadDate` is `YYYY-MM-DD`, sometimes followed by a time.
fn upload_date(ctx: &FieldContext<'_>) -> FieldResult<NaiveDate> {
    let raw = ctx.linked_data()?.str_field("uploadDate")?;
    let date = raw.trim().split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| FieldError::malformed(format!("invalid upload date `{raw}`: {e}")))
}

fn view_count(ctx: &FieldContext<'_>) -> FieldResult<u64> {
    Ok(ctx.linked_data()?.count_field("interactionCount")?)
}

fn category(ctx: &FieldContext<'_>) -> FieldResult<String> {
    Ok(ctx.linked_data()?.str_field("genre")?.to_string())
}

/// The like bar only carries an inline style when ratings are shown. When
/// they are, the tooltip reads `"<up> / <down>"`.
fn sentiment(ctx: &FieldContext<'_>) -> FieldResult<Option<Vec<String>>> {
    let selectors = &ctx.config().video;
    let document = ctx.document();

    let styled = document
        .select_first(&selectors.like_bar)
        .is_some_and(|bar| bar.attr("style").is_some());
    if !styled {
        return Ok(None);
    }

    let tooltip = document
        .select_first(&selectors.sentiment_tooltip)
        .ok_or_else(|| FieldError::missing("like bar is shown but has no sentiment tooltip"))?;
    Ok(Some(
        tooltip
            .text()
            .split(selectors.sentiment_separator.as_str())
            .map(|part| part.trim().to_string())
            .collect(),
    ))
}

fn vote_count(ctx: &FieldContext<'_>, index: usize, label: &str) -> FieldResult<Option<u64>> {
    let Some(parts) = sentiment(ctx)? else {
        return Ok(None);
    };
    let part = parts
        .get(index)
        .ok_or_else(|| FieldError::missing(format!("sentiment tooltip has no {label} count")))?;
    extract_number(part)
        .map(Some)
        .ok_or_else(|| FieldError::malformed(format!("{label} count `{part}` holds no number")))
}

fn upvotes(ctx: &FieldContext<'_>) -> FieldResult<Option<u64>> {
    vote_count(ctx, 0, "upvote")
}

fn downvotes(ctx: &FieldContext<'_>) -> FieldResult<Option<u64>> {
    vote_count(ctx, 1, "downvote")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Broadcast {
    live: bool,
    ended: bool,
}

/// The first `publication` entry declaring `isLiveBroadcast` decides. No
/// `publication` key at all means the video was never a broadcast.
fn broadcast(data: &LinkedData) -> FieldResult<Option<Broadcast>> {
    let publications = match data.array_field("publication") {
        Ok(items) => items,
        Err(LookupError::Absent(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    for publication in publications {
        let Some(flag) = publication.get("isLiveBroadcast") else {
            continue;
        };
        let live = match flag {
            Value::Bool(b) => *b,
            Value::String(s) if s.eq_ignore_ascii_case("true") => true,
            Value::String(s) if s.eq_ignore_ascii_case("false") => false,
            other => {
                return Err(FieldError::malformed(format!(
                    "isLiveBroadcast is not a boolean: {other}"
                )))
            }
        };
        return Ok(Some(Broadcast {
            live,
            ended: publication.get("endDate").is_some(),
        }));
    }

    Err(FieldError::malformed(
        "no publication entry declares isLiveBroadcast",
    ))
}

fn is_live(ctx: &FieldContext<'_>) -> FieldResult<bool> {
    Ok(broadcast(ctx.linked_data()?)?.is_some_and(|b| b.live && !b.ended))
}

fn was_live(ctx: &FieldContext<'_>) -> FieldResult<bool> {
    Ok(broadcast(ctx.linked_data()?)?.is_some_and(|b| b.live && b.ended))
}

/// Hashtag links whose first child is text, de-duplicated in page order.
fn hashtags(ctx: &FieldContext<'_>) -> FieldResult<Vec<String>> {
    let mut tags: Vec<String> = Vec::new();
    for link in ctx.document().select_all(&ctx.config().video.hashtag_links) {
        let Some(text) = link.first_child_text().map(str::trim) else {
            continue;
        };
        if text.is_empty() || tags.iter().any(|t| t == text) {
            continue;
        }
        tags.push(text.to_string());
    }
    Ok(tags)
}

fn clarify_box(ctx: &FieldContext<'_>) -> FieldResult<String> {
    Ok(ctx
        .document()
        .text_of(&ctx.config().video.clarify_box)
        .unwrap_or_default())
}

fn recommended_tags(ctx: &FieldContext<'_>) -> FieldResult<Vec<String>> {
    Ok(ctx
        .document()
        .select_all(&ctx.config().video.recommended_tags)
        .iter()
        .map(Node::trimmed_text)
        .collect())
}

/// The sidebar occasionally renders empty; that is not an error.
fn recommended_videos(ctx: &FieldContext<'_>) -> FieldResult<Vec<RecommendedVideo>> {
    let selectors = &ctx.config().video;
    let rows = ctx.document().select_all(&selectors.recommended_rows);

    let videos = rows
        .iter()
        .filter_map(|row| {
            let href = row.attr_of(&selectors.recommended_link, "href")?;
            let Some(id) = query_param(&href, &selectors.id_param) else {
                debug!(href = %href, "Skipping recommended video without id");
                return None;
            };

            let watched_percentage = row
                .select_first(&selectors.recommended_resume_bar)
                .and_then(|bar| bar.inline_style("width"))
                .map(|width| parse_percentage(&width))
                .filter(|p| p.is_finite())
                .unwrap_or(0.0);

            Some(RecommendedVideo {
                id,
                title: row.text_of(&selectors.recommended_title).unwrap_or_default(),
                duration_ms: row
                    .select_first(&selectors.recommended_duration)
                    .map(|node| compact_duration_ms(&node.text()))
                    .unwrap_or(0),
                channel_name: row
                    .text_of(&selectors.recommended_channel_name)
                    .unwrap_or_default(),
                watched_percentage,
                uploaded_at_string: row
                    .text_of(&selectors.recommended_uploaded_at)
                    .unwrap_or_default(),
            })
        })
        .collect();

    Ok(videos)
}
