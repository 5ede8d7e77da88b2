//! Subscribed-channels page.

use crate::engine::{FieldContext, Schema};
use crate::errors::FieldResult;
use crate::normalize::last_path_segment;
use crate::types::SubscribedChannel;
use tracing::debug;
use vidextract_html::{Node, Selectable};

pub const DOCUMENT: &str = "subscribed-channels";

pub mod fields {
    pub const CHANNELS: &str = "channels";
}

pub fn schema() -> Schema {
    Schema::new(DOCUMENT).field(fields::CHANNELS, channels)
}

fn channels(ctx: &FieldContext<'_>) -> FieldResult<Vec<SubscribedChannel>> {
    let selectors = &ctx.config().subscriptions;
    let rows = ctx.document().select_all(&selectors.rows);

    Ok(rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let channel = read_channel(row, ctx);
            if channel.is_none() {
                debug!(index, "Dropping channel row without name or link");
            }
            channel
        })
        .collect())
}

/// A row without a name or a link is still loading and is skipped.
fn read_channel(row: &Node<'_>, ctx: &FieldContext<'_>) -> Option<SubscribedChannel> {
    let selectors = &ctx.config().subscriptions;

    let channel_name = row.text_of(&selectors.channel_name)?;
    let channel_url = row
        .attr_of(&selectors.channel_link, "href")
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())?;
    let channel_id = last_path_segment(&channel_url)
        .unwrap_or_default()
        .to_string();

    let notifications_enabled = row
        .select_all(&selectors.notification_icon)
        .iter()
        .filter_map(|icon| icon.attr(&selectors.notification_icon_attr))
        .any(|name| name.trim() == selectors.notifications_active_icon);

    Some(SubscribedChannel {
        channel_id,
        channel_name,
        channel_url,
        thumbnail_url: row
            .attr_of(&selectors.avatar_image, "src")
            .map(|src| src.trim().to_string())
            .unwrap_or_default(),
        subscriber_count_string: row.text_of(&selectors.subscriber_count).unwrap_or_default(),
        notifications_enabled,
    })
}
