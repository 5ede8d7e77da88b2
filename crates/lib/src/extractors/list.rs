//! # Repeated Video Rows
//!
//! Playlists and the watch history render the same kind of row. Each row is
//! read attribute by attribute, then classified:
//!
//! 1. an entry the platform removed (bracketed placeholder title, placeholder
//!    thumbnail, no duration and no channel) becomes `ListItem::Unavailable`;
//! 2. a row missing any required attribute is dropped, since rows that are
//!    still lazy-loading look exactly like that;
//! 3. everything else becomes `ListItem::Available`.

use crate::config::ListRowSelectors;
use crate::normalize::{compact_duration_ms, parse_percentage, query_param};
use crate::types::{AvailableItem, ListItem};
use tracing::debug;
use vidextract_html::{Node, Selectable};

/// What one row offered, before classification. Strings are trimmed and
/// blank values are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowReading {
    pub id: Option<String>,
    pub title: Option<String>,
    /// `0` when the duration badge is absent or unreadable.
    pub duration_ms: u64,
    pub channel_name: Option<String>,
    pub channel_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    /// `None` without a resume bar; `NaN` when its width is unreadable.
    pub watched_percentage: Option<f64>,
}

/// The list a row belongs to, which decides the extra attributes it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowContext<'a> {
    Playlist,
    /// A watch-history row under the date section labelled `watched_at`.
    History { watched_at: &'a str },
}

/// Reads every attribute of `row` independently.
pub fn read_row(row: &Node<'_>, selectors: &ListRowSelectors) -> RowReading {
    let channel = row.select_first(&selectors.channel_link);

    RowReading {
        id: row
            .attr_of(&selectors.link, "href")
            .and_then(|href| query_param(&href, &selectors.id_param)),
        title: row.text_of(&selectors.title),
        duration_ms: row
            .select_first(&selectors.duration)
            .map(|node| compact_duration_ms(&node.text()))
            .unwrap_or(0),
        channel_name: channel
            .map(|node| node.trimmed_text())
            .filter(|name| !name.is_empty()),
        channel_url: channel.and_then(|node| non_blank(node.attr("href"))),
        thumbnail_url: non_blank(
            row.attr_of(&selectors.thumbnail_image, "src").as_deref(),
        ),
        description: row.text_of(&selectors.description),
        watched_percentage: row
            .select_first(&selectors.resume_bar)
            .and_then(|bar| bar.inline_style("width"))
            .map(|width| parse_percentage(&width)),
    }
}

impl RowReading {
    /// The fingerprint of a removed entry. All four signals are required.
    pub fn is_placeholder(&self, placeholder_thumbnail: &str) -> bool {
        self.id.is_some()
            && self.duration_ms == 0
            && self.channel_name.is_none()
            && self.channel_url.is_none()
            && self.title.as_deref().is_some_and(|t| t.starts_with('['))
            && self.thumbnail_url.as_deref() == Some(placeholder_thumbnail)
    }
}

/// Classifies a row. `Err` names the first required attribute that was
/// missing; such rows are dropped by the caller.
pub fn classify(
    reading: RowReading,
    context: RowContext<'_>,
    placeholder_thumbnail: &str,
) -> Result<ListItem, &'static str> {
    if reading.is_placeholder(placeholder_thumbnail) {
        let id = reading.id.ok_or("id")?;
        return Ok(ListItem::Unavailable { id });
    }

    let id = reading.id.ok_or("id")?;
    let title = reading.title.ok_or("title")?;
    if reading.duration_ms == 0 {
        return Err("duration");
    }
    let channel_name = reading.channel_name.ok_or("channel name")?;
    let channel_url = reading.channel_url.ok_or("channel url")?;

    let mut item = AvailableItem {
        id,
        title,
        duration_ms: reading.duration_ms,
        channel_name,
        channel_url,
        thumbnail_url: reading.thumbnail_url,
        description: None,
        watched_at: None,
        watched_percentage: None,
    };

    if let RowContext::History { watched_at } = context {
        let percentage = reading
            .watched_percentage
            .filter(|p| p.is_finite() && *p != 0.0)
            .ok_or("watched percentage")?;
        item.description = Some(reading.description.unwrap_or_default());
        item.watched_at = Some(watched_at.trim().to_string());
        item.watched_percentage = Some(percentage);
    }

    Ok(ListItem::Available(item))
}

/// Reads and classifies every row, keeping document order. An empty list is
/// a valid outcome.
pub fn extract_rows(
    rows: &[Node<'_>],
    selectors: &ListRowSelectors,
    context: RowContext<'_>,
    placeholder_thumbnail: &str,
) -> Vec<ListItem> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            match classify(read_row(row, selectors), context, placeholder_thumbnail) {
                Ok(item) => Some(item),
                Err(missing) => {
                    debug!(index, missing, "Dropping incomplete list row");
                    None
                }
            }
        })
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PLACEHOLDER_THUMBNAIL_URL;
    use vidextract_html::Document;

    fn placeholder_reading() -> RowReading {
        RowReading {
            id: Some("abc".into()),
            title: Some("[Private video]".into()),
            thumbnail_url: Some(PLACEHOLDER_THUMBNAIL_URL.into()),
            ..Default::default()
        }
    }

    fn complete_reading() -> RowReading {
        RowReading {
            id: Some("abc".into()),
            title: Some("A title".into()),
            duration_ms: 308_000,
            channel_name: Some("Chan".into()),
            channel_url: Some("/channel/UC1".into()),
            thumbnail_url: Some("https://i.ytimg.com/vi/abc/hq.jpg".into()),
            description: Some("Desc".into()),
            watched_percentage: Some(42.0),
        }
    }

    #[test]
    fn test_placeholder_row_is_unavailable() {
        let item = classify(placeholder_reading(), RowContext::Playlist, PLACEHOLDER_THUMBNAIL_URL);
        assert_eq!(item, Ok(ListItem::Unavailable { id: "abc".into() }));
    }

    #[test]
    fn test_placeholder_title_with_real_thumbnail_is_dropped() {
        let mut reading = placeholder_reading();
        reading.thumbnail_url = Some("https://i.ytimg.com/vi/abc/hq.jpg".into());
        let item = classify(reading, RowContext::Playlist, PLACEHOLDER_THUMBNAIL_URL);
        assert_eq!(item, Err("duration"));
    }

    #[test]
    fn test_each_signal_is_required_for_unavailable() {
        let mut unbracketed = placeholder_reading();
        unbracketed.title = Some("Private video".into());
        let mut with_duration = placeholder_reading();
        with_duration.duration_ms = 1_000;
        let mut with_channel = placeholder_reading();
        with_channel.channel_name = Some("Chan".into());
        let mut with_channel_url = placeholder_reading();
        with_channel_url.channel_url = Some("/channel/UC1".into());

        for reading in [unbracketed, with_duration, with_channel, with_channel_url] {
            assert!(!reading.is_placeholder(PLACEHOLDER_THUMBNAIL_URL));
        }
    }

    #[test]
    fn test_complete_playlist_row_is_available_without_history_attributes() {
        let item = classify(complete_reading(), RowContext::Playlist, PLACEHOLDER_THUMBNAIL_URL)
            .unwrap();
        let available = item.as_available().unwrap();
        assert_eq!(available.duration_ms, 308_000);
        assert_eq!(available.watched_at, None);
        assert_eq!(available.watched_percentage, None);
        assert_eq!(available.description, None);
    }

    #[test]
    fn test_history_rows_need_a_watched_percentage() {
        let context = RowContext::History { watched_at: " Today " };

        let item = classify(complete_reading(), context, PLACEHOLDER_THUMBNAIL_URL).unwrap();
        let available = item.as_available().unwrap();
        assert_eq!(available.watched_at.as_deref(), Some("Today"));
        assert_eq!(available.watched_percentage, Some(42.0));
        assert_eq!(available.description.as_deref(), Some("Desc"));

        for pct in [None, Some(0.0), Some(f64::NAN)] {
            let mut reading = complete_reading();
            reading.watched_percentage = pct;
            assert_eq!(
                classify(reading, context, PLACEHOLDER_THUMBNAIL_URL),
                Err("watched percentage")
            );
        }
    }

    #[test]
    fn test_missing_attributes_drop_the_row() {
        let cases: [(fn(&mut RowReading), &str); 5] = [
            (|r| r.id = None, "id"),
            (|r| r.title = None, "title"),
            (|r| r.duration_ms = 0, "duration"),
            (|r| r.channel_name = None, "channel name"),
            (|r| r.channel_url = None, "channel url"),
        ];
        for (strip, missing) in cases {
            let mut reading = complete_reading();
            strip(&mut reading);
            assert_eq!(
                classify(reading, RowContext::Playlist, PLACEHOLDER_THUMBNAIL_URL),
                Err(missing)
            );
        }
    }

    #[test]
    fn test_read_row_trims_and_parses() {
        let doc = Document::parse(
            r#"<div class="row">
                <a id="thumbnail" href="/watch?v=xyz&amp;list=PL1"><img src=" https://i.ytimg.com/vi/xyz/hq.jpg "></a>
                <span class="ytd-thumbnail-overlay-time-status-renderer">
                    1:02:03
                </span>
                <span id="video-title">
                    Spaced title
                </span>
                <div class="ytd-channel-name"><a href="/channel/UC9"> Chan </a></div>
                <div class="ytd-thumbnail"><div class="ytd-thumbnail-overlay-resume-playback-renderer" style="width: 17%"></div></div>
            </div>"#,
        );
        let row = doc.select_first(".row").unwrap();
        let reading = read_row(&row, &ListRowSelectors::default());

        assert_eq!(reading.id.as_deref(), Some("xyz"));
        assert_eq!(reading.title.as_deref(), Some("Spaced title"));
        assert_eq!(reading.duration_ms, 3_723_000);
        assert_eq!(reading.channel_name.as_deref(), Some("Chan"));
        assert_eq!(reading.channel_url.as_deref(), Some("/channel/UC9"));
        assert_eq!(
            reading.thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/xyz/hq.jpg")
        );
        assert_eq!(reading.description, None);
        assert_eq!(reading.watched_percentage, Some(17.0));
    }
}
