//! # Test Utilities
//!
//! Builders for HTML fixtures shaped like the pages the extractors read with
//! their default selectors, plus a one-shot tracing initializer.

use serde_json::Value;
use std::fmt::Write;
use std::sync::Once;

/// The generic thumbnail the platform shows for removed entries.
pub const PLACEHOLDER_THUMBNAIL: &str = "https://i.ytimg.com/img/no_thumbnail.jpg";

static INIT: Once = Once::new();

/// Initializes the tracing subscriber once per test binary. Honors `RUST_LOG`.
pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// --- List Rows ---

/// One video row of a playlist or of the watch history. Every attribute is
/// optional so lazy-loaded and removed rows can be rendered too.
#[derive(Debug, Clone, Default)]
pub struct RowFixture {
    pub id: Option<String>,
    pub title: Option<String>,
    pub duration: Option<String>,
    pub channel_name: Option<String>,
    pub channel_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub description: Option<String>,
    /// Inline `width` of the resume bar, e.g. `"42%"`.
    pub watched_width: Option<String>,
}

impl RowFixture {
    /// A complete row with a real thumbnail and a channel link derived from
    /// the channel name.
    pub fn available(id: &str, title: &str, duration: &str, channel_name: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            title: Some(title.to_string()),
            duration: Some(duration.to_string()),
            channel_name: Some(channel_name.to_string()),
            channel_url: Some(format!("/channel/UC-{}", channel_name.replace(' ', "-"))),
            thumbnail_url: Some(format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg")),
            description: None,
            watched_width: None,
        }
    }

    /// The rendering of a removed entry: bracketed title, placeholder
    /// thumbnail, no duration and no channel.
    pub fn unavailable(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            title: Some("[Private video]".to_string()),
            thumbnail_url: Some(PLACEHOLDER_THUMBNAIL.to_string()),
            ..Default::default()
        }
    }

    /// A row whose body has not been lazy-loaded: only the title exists.
    pub fn loading(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    pub fn watched(mut self, width: &str) -> Self {
        self.watched_width = Some(width.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_thumbnail(mut self, url: &str) -> Self {
        self.thumbnail_url = Some(url.to_string());
        self
    }

    fn render(&self, tag: &str, class: &str) -> String {
        let mut html = format!(r#"<{tag} class="style-scope {class}">"#);

        let href = match &self.id {
            Some(id) => format!("/watch?v={}&amp;list=PLfixture", escape(id)),
            None => "/watch?list=PLfixture".to_string(),
        };
        let img = self
            .thumbnail_url
            .as_ref()
            .map(|src| format!(r#"<img src="{}">"#, escape(src)))
            .unwrap_or_default();
        let _ = write!(html, r#"<a id="thumbnail" href="{href}">{img}</a>"#);

        let _ = write!(
            html,
            r#"<div class="style-scope ytd-thumbnail"><span class="style-scope ytd-thumbnail-overlay-time-status-renderer" hidden>0:01</span>"#
        );
        if let Some(duration) = &self.duration {
            let _ = write!(
                html,
                r#"<span class="style-scope ytd-thumbnail-overlay-time-status-renderer">{}</span>"#,
                escape(duration)
            );
        }
        if let Some(width) = &self.watched_width {
            let _ = write!(
                html,
                r#"<div class="style-scope ytd-thumbnail-overlay-resume-playback-renderer" style="width: {};"></div>"#,
                escape(width)
            );
        }
        html.push_str("</div>");

        if let Some(title) = &self.title {
            let _ = write!(html, r#"<span id="video-title">{}</span>"#, escape(title));
        }

        html.push_str(r#"<div class="style-scope ytd-channel-name">"#);
        match (&self.channel_name, &self.channel_url) {
            (Some(name), Some(url)) => {
                let _ = write!(html, r#"<a href="{}">{}</a>"#, escape(url), escape(name));
            }
            (Some(name), None) => {
                let _ = write!(html, "<a>{}</a>", escape(name));
            }
            (None, Some(url)) => {
                let _ = write!(html, r#"<a href="{}"></a>"#, escape(url));
            }
            (None, None) => {}
        }
        html.push_str("</div>");

        if let Some(description) = &self.description {
            let _ = write!(
                html,
                r#"<yt-formatted-string id="description-text">{}</yt-formatted-string>"#,
                escape(description)
            );
        }

        let _ = write!(html, "</{tag}>");
        html
    }
}

// --- Playlist Page ---

#[derive(Debug, Clone, Default)]
pub struct PlaylistFixture {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_count: Option<String>,
    pub view_count: Option<String>,
    pub updated_at: Option<String>,
    pub rows: Vec<RowFixture>,
}

impl PlaylistFixture {
    pub fn new(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            title: Some("Fixture playlist".to_string()),
            description: Some("A playlist used in tests".to_string()),
            video_count: Some("0 videos".to_string()),
            view_count: Some("1,234 views".to_string()),
            updated_at: Some("Last updated on Mar 4, 2021".to_string()),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, row: RowFixture) -> Self {
        self.rows.push(row);
        self.video_count = Some(format!("{} videos", self.rows.len()));
        self
    }

    pub fn render(&self) -> String {
        let mut html = String::from("<!DOCTYPE html><html><head>");
        if let Some(id) = &self.id {
            let _ = write!(
                html,
                r#"<meta property="og:url" content="https://www.youtube.com/playlist?list={}">"#,
                escape(id)
            );
        }
        html.push_str("<title>Playlist</title></head><body>");

        if let Some(title) = &self.title {
            let _ = write!(html, r#"<h1 id="title"><a>{}</a></h1>"#, escape(title));
        }
        if let Some(description) = &self.description {
            let _ = write!(html, r#"<div id="description">{}</div>"#, escape(description));
        }

        html.push_str(r#"<div id="stats">"#);
        for stat in [&self.video_count, &self.view_count, &self.updated_at] {
            let _ = write!(
                html,
                r#"<span class="style-scope ytd-playlist-sidebar-primary-info-renderer">{}</span>"#,
                stat.as_deref().map(escape).unwrap_or_default()
            );
        }
        html.push_str("</div>");

        html.push_str(r#"<div id="contents">"#);
        for row in &self.rows {
            html.push_str(&row.render(
                "ytd-playlist-video-renderer",
                "ytd-playlist-video-list-renderer",
            ));
        }
        html.push_str("</div></body></html>");
        html
    }
}

// --- Watch History Page ---

#[derive(Debug, Clone, Default)]
pub struct WatchHistoryFixture {
    pub sections: Vec<(String, Vec<RowFixture>)>,
}

impl WatchHistoryFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, label: &str, rows: Vec<RowFixture>) -> Self {
        self.sections.push((label.to_string(), rows));
        self
    }

    pub fn render(&self) -> String {
        let mut html =
            String::from(r#"<!DOCTYPE html><html><head><title>History</title></head><body><div id="contents">"#);
        for (label, rows) in &self.sections {
            let _ = write!(
                html,
                r#"<ytd-item-section-renderer class="style-scope ytd-section-list-renderer"><div id="header"><div id="title">{}</div></div><div class="rows">"#,
                escape(label)
            );
            for row in rows {
                html.push_str(&row.render("ytd-video-renderer", "ytd-item-section-renderer"));
            }
            html.push_str("</div></ytd-item-section-renderer>");
        }
        html.push_str("</div></body></html>");
        html
    }
}

// --- Video Page ---

/// A sidebar entry of a video page.
#[derive(Debug, Clone, Default)]
pub struct RecommendedFixture {
    pub id: String,
    pub title: String,
    pub channel_name: String,
    pub duration: Option<String>,
    pub watched_width: Option<String>,
    pub uploaded_at: String,
}

impl RecommendedFixture {
    pub fn new(id: &str, title: &str, channel_name: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            channel_name: channel_name.to_string(),
            duration: None,
            watched_width: None,
            uploaded_at: "2 days ago".to_string(),
        }
    }

    pub fn duration(mut self, duration: &str) -> Self {
        self.duration = Some(duration.to_string());
        self
    }

    pub fn watched(mut self, width: &str) -> Self {
        self.watched_width = Some(width.to_string());
        self
    }

    fn render(&self) -> String {
        let mut html = String::from("<ytd-compact-video-renderer>");
        html.push_str(r#"<div class="style-scope ytd-thumbnail">"#);
        if let Some(duration) = &self.duration {
            let _ = write!(
                html,
                r#"<span class="style-scope ytd-thumbnail-overlay-time-status-renderer">{}</span>"#,
                escape(duration)
            );
        }
        if let Some(width) = &self.watched_width {
            let _ = write!(
                html,
                r#"<div class="style-scope ytd-thumbnail-overlay-resume-playback-renderer" style="width: {};"></div>"#,
                escape(width)
            );
        }
        html.push_str("</div>");
        let _ = write!(
            html,
            r#"<div class="metadata"><a href="/watch?v={id}"><span id="video-title">{title}</span></a><div class="style-scope ytd-channel-name"><span id="text">{channel}</span></div><div id="metadata-line"><span class="style-scope ytd-video-meta-block">1K views</span><span class="style-scope ytd-video-meta-block">{uploaded}</span></div></div>"#,
            id = escape(&self.id),
            title = escape(&self.title),
            channel = escape(&self.channel_name),
            uploaded = escape(&self.uploaded_at),
        );
        html.push_str("</ytd-compact-video-renderer>");
        html
    }
}

#[derive(Debug, Clone)]
pub struct VideoFixture {
    pub id: Option<String>,
    /// Raw text of the linked-data `<script>`; `None` omits the script.
    pub linked_data: Option<String>,
    pub channel_url: Option<String>,
    pub channel_name: String,
    pub channel_thumbnail: Option<String>,
    /// Inline style of the like bar; `None` renders the bar unstyled.
    pub like_bar_style: Option<String>,
    pub sentiment: Option<String>,
    pub hashtags: Vec<String>,
    pub clarify_box: Option<String>,
    pub recommended_tags: Vec<String>,
    pub recommended: Vec<RecommendedFixture>,
}

impl VideoFixture {
    /// A regular, already published video with ratings shown.
    pub fn new(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            linked_data: Some(
                serde_json::json!({
                    "@type": "VideoObject",
                    "name": "Fixture video",
                    "description": "A video used in tests",
                    "duration": "PT4M13S",
                    "uploadDate": "2021-03-04",
                    "interactionCount": "12345",
                    "genre": "Science & Technology",
                })
                .to_string(),
            ),
            channel_url: Some("/channel/UCfixture".to_string()),
            channel_name: "Fixture Channel".to_string(),
            channel_thumbnail: Some("https://yt3.ggpht.com/fixture=s48".to_string()),
            like_bar_style: Some("width: 95%;".to_string()),
            sentiment: Some("1,024 / 56".to_string()),
            hashtags: Vec::new(),
            clarify_box: None,
            recommended_tags: Vec::new(),
            recommended: Vec::new(),
        }
    }

    /// A stream that is currently live: no duration, an open broadcast.
    pub fn live(id: &str) -> Self {
        Self::new(id).linked_data_value(serde_json::json!({
            "@type": "VideoObject",
            "name": "Live now",
            "description": "",
            "uploadDate": "2021-03-04",
            "interactionCount": "99",
            "genre": "Gaming",
            "publication": [{"@type": "BroadcastEvent", "isLiveBroadcast": true, "startDate": "2021-03-04T10:00:00+00:00"}],
        }))
    }

    pub fn linked_data_value(mut self, value: Value) -> Self {
        self.linked_data = Some(value.to_string());
        self
    }

    pub fn linked_data_raw(mut self, raw: &str) -> Self {
        self.linked_data = Some(raw.to_string());
        self
    }

    pub fn without_linked_data(mut self) -> Self {
        self.linked_data = None;
        self
    }

    pub fn hashtag(mut self, tag: &str) -> Self {
        self.hashtags.push(tag.to_string());
        self
    }

    pub fn recommended(mut self, video: RecommendedFixture) -> Self {
        self.recommended.push(video);
        self
    }

    pub fn render(&self) -> String {
        let mut html = String::from("<!DOCTYPE html><html><head><title>Video</title>");
        if let Some(id) = &self.id {
            let _ = write!(
                html,
                r#"<link rel="canonical" href="https://www.youtube.com/watch?v={}">"#,
                escape(id)
            );
        }
        if let Some(raw) = &self.linked_data {
            let _ = write!(
                html,
                r#"<script type="application/ld+json" id="scriptTag">{raw}</script>"#
            );
        }
        html.push_str("</head><body>");

        html.push_str(r#"<div id="upload-info">"#);
        if let Some(url) = &self.channel_url {
            let _ = write!(
                html,
                r#"<a href="{}">{}</a>"#,
                escape(url),
                escape(&self.channel_name)
            );
        }
        html.push_str("</div>");
        if let Some(src) = &self.channel_thumbnail {
            let _ = write!(html, r#"<div id="meta"><img id="img" src="{}"></div>"#, escape(src));
        }

        match &self.like_bar_style {
            Some(style) => {
                let _ = write!(html, r#"<div id="like-bar" style="{}"></div>"#, escape(style));
            }
            None => html.push_str(r#"<div id="like-bar"></div>"#),
        }
        if let Some(sentiment) = &self.sentiment {
            let _ = write!(
                html,
                r#"<div id="sentiment"><div id="tooltip">{}</div></div>"#,
                escape(sentiment)
            );
        }

        html.push_str(r#"<div id="description">"#);
        for tag in &self.hashtags {
            let _ = write!(
                html,
                r#"<a href="/hashtag/{}">{}</a> "#,
                escape(tag.trim_start_matches('#')),
                escape(tag)
            );
        }
        html.push_str("</div>");

        if let Some(text) = &self.clarify_box {
            let _ = write!(html, r#"<div id="clarify-box">{}</div>"#, escape(text));
        }

        html.push_str(r#"<div id="chips">"#);
        for tag in &self.recommended_tags {
            let _ = write!(html, r#"<span id="text">{}</span>"#, escape(tag));
        }
        html.push_str("</div>");

        html.push_str(r#"<div id="related">"#);
        for video in &self.recommended {
            html.push_str(&video.render());
        }
        html.push_str("</div></body></html>");
        html
    }
}

// --- Subscriptions Page ---

#[derive(Debug, Clone)]
pub struct ChannelFixture {
    pub name: Option<String>,
    pub url: Option<String>,
    pub avatar: String,
    pub subscribers: String,
    pub notifications: bool,
}

impl ChannelFixture {
    pub fn new(name: &str, notifications: bool) -> Self {
        Self {
            name: Some(name.to_string()),
            url: Some(format!("/channel/UC-{}", name.replace(' ', "-"))),
            avatar: format!("https://yt3.ggpht.com/{}=s88", name.replace(' ', "")),
            subscribers: "1.2M subscribers".to_string(),
            notifications,
        }
    }

    fn render(&self) -> String {
        let href = self
            .url
            .as_ref()
            .map(|url| format!(r#" href="{}""#, escape(url)))
            .unwrap_or_default();
        let name = self
            .name
            .as_ref()
            .map(|name| format!(r#"<div id="channel-title"><span id="text">{}</span></div>"#, escape(name)))
            .unwrap_or_default();
        let icon = if self.notifications {
            "notifications_active"
        } else {
            "notifications_none"
        };
        format!(
            r#"<ytd-channel-renderer class="style-scope ytd-expanded-shelf-contents-renderer"><a id="main-link"{href}><div id="avatar"><img src="{avatar}"></div>{name}<span id="subscribers">{subscribers}</span></a><div id="notification-preference-button"><yt-icon icon="{icon}"></yt-icon></div></ytd-channel-renderer>"#,
            avatar = escape(&self.avatar),
            subscribers = escape(&self.subscribers),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubscriptionsFixture {
    pub channels: Vec<ChannelFixture>,
}

impl SubscriptionsFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(mut self, channel: ChannelFixture) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn render(&self) -> String {
        let mut html = String::from(
            r#"<!DOCTYPE html><html><head><title>Subscriptions</title></head><body><div id="contents">"#,
        );
        for channel in &self.channels {
            html.push_str(&channel.render());
        }
        html.push_str("</div></body></html>");
        html
    }
}
