//! # Extraction Engine Tests
//!
//! Properties that hold for every schema: each declared field ends up either
//! in `fields` or in `errors`, never both, and repeated runs agree.

use std::collections::HashSet;
use vidextract::engine::{self, apply_error_filters};
use vidextract::extractors::{playlist, subscriptions, video, watch_history};
use vidextract::{
    Document, ExtractionResult, ExtractorConfig, FieldContext, FieldError, FieldErrorKind,
    FieldResult, Schema, Selectable,
};
use vidextract_test_utils::{
    setup_tracing, ChannelFixture, PlaylistFixture, RowFixture, SubscriptionsFixture,
    VideoFixture, WatchHistoryFixture,
};

fn assert_partition(schema: &Schema, result: &ExtractionResult) {
    let extracted: HashSet<&str> = result.field_names().collect();
    let failed: HashSet<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(failed.len(), result.errors.len(), "a field failed twice");

    for name in schema.field_names() {
        assert!(
            extracted.contains(name) ^ failed.contains(name),
            "{}: field `{name}` must be in exactly one of fields/errors",
            schema.document()
        );
    }
    assert_eq!(
        extracted.len() + failed.len(),
        schema.field_names().count(),
        "{}: result names an undeclared field",
        schema.document()
    );
}

fn pages() -> Vec<(Schema, String)> {
    let mut sparse_video = VideoFixture::new("sparse").without_linked_data();
    sparse_video.channel_url = None;
    sparse_video.sentiment = None;
    let mut sparse_playlist = PlaylistFixture::new("PLsparse");
    sparse_playlist.title = None;

    vec![
        (
            playlist::schema(),
            PlaylistFixture::new("PL1")
                .row(RowFixture::available("a", "A", "1:00", "C"))
                .render(),
        ),
        (playlist::schema(), sparse_playlist.render()),
        (video::schema(), VideoFixture::new("v1").render()),
        (video::schema(), VideoFixture::live("v2").render()),
        (video::schema(), sparse_video.render()),
        (
            watch_history::schema(),
            WatchHistoryFixture::new()
                .section("Today", vec![RowFixture::available("h", "H", "1:00", "C").watched("5%")])
                .render(),
        ),
        (
            subscriptions::schema(),
            SubscriptionsFixture::new()
                .channel(ChannelFixture::new("IGN", true))
                .render(),
        ),
        (video::schema(), "<html></html>".to_string()),
        (playlist::schema(), String::new()),
    ]
}

#[test]
fn test_every_field_is_extracted_or_reported() {
    setup_tracing();
    let config = ExtractorConfig::default();

    for (schema, html) in pages() {
        let document = Document::parse(&html);
        let result = engine::extract(&document, &schema, &config);
        assert_partition(&schema, &result);
    }
}

#[test]
fn test_extraction_is_deterministic() {
    setup_tracing();
    let config = ExtractorConfig::default();

    for (schema, html) in pages() {
        let document = Document::parse(&html);
        let first = engine::extract(&document, &schema, &config);
        let second = engine::extract(&Document::parse(&html), &schema, &config);
        assert_eq!(first, second, "{}", schema.document());
    }
}

#[test]
fn test_sparse_video_keeps_markup_fields() {
    setup_tracing();

    let mut fixture = VideoFixture::new("sparse").without_linked_data();
    fixture.channel_url = None;
    let document = Document::parse(&fixture.render());

    let result = engine::extract(&document, &video::schema(), &ExtractorConfig::default());

    assert_eq!(result.get::<String>(video::fields::ID).as_deref(), Some("sparse"));
    assert_eq!(
        result.error_for(video::fields::CHANNEL).map(|e| e.kind),
        Some(FieldErrorKind::FieldMissing)
    );
    assert!(result.get::<Vec<String>>(video::fields::HASHTAGS).is_some());
}

#[test]
fn test_filters_only_apply_through_extract_document() {
    setup_tracing();

    let html = VideoFixture::live("live").render();
    let schema = video::schema();
    let document = Document::parse(&html);

    let raw = engine::extract(&document, &schema, &ExtractorConfig::default());
    assert_eq!(
        raw.error_for(video::fields::DURATION_MS).map(|e| e.kind),
        Some(FieldErrorKind::FieldMissing)
    );

    let filtered = apply_error_filters(raw.clone(), &schema);
    assert!(filtered.error_for(video::fields::DURATION_MS).is_none());
    assert_eq!(filtered.fields, raw.fields);

    let full = engine::extract_document(&html, &schema, &ExtractorConfig::default()).unwrap();
    assert_eq!(full, filtered);
}

fn heading(ctx: &FieldContext<'_>) -> FieldResult<String> {
    ctx.document()
        .text_of("h1")
        .ok_or_else(|| FieldError::missing("no heading"))
}

#[test]
fn test_custom_schema_isolates_failures() {
    setup_tracing();

    // Arrange
    let schema = Schema::new("custom")
        .field("heading", heading)
        .field("paragraphs", |ctx: &FieldContext<'_>| {
            Ok(ctx.document().select_all("p").len())
        })
        .field("broken", |_: &FieldContext<'_>| -> FieldResult<String> {
            Err(FieldError::malformed("always broken"))
        })
        .field("exploding", |ctx: &FieldContext<'_>| -> FieldResult<String> {
            let first = ctx.document().select_all("section");
            Ok(first[0].trimmed_text())
        })
        .field("trailing", |_: &FieldContext<'_>| Ok(true));
    let html = "<html><body><h1> Title </h1><p>a</p><p>b</p></body></html>";

    // Act
    let result = engine::extract_document(html, &schema, &ExtractorConfig::default()).unwrap();

    // Assert
    assert_eq!(result.get::<String>("heading").as_deref(), Some("Title"));
    assert_eq!(result.get::<usize>("paragraphs"), Some(2));
    assert_eq!(result.get::<bool>("trailing"), Some(true));
    let kinds: Vec<(&str, FieldErrorKind)> = result
        .errors
        .iter()
        .map(|e| (e.field.as_str(), e.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("broken", FieldErrorKind::FieldMalformed),
            ("exploding", FieldErrorKind::Unexpected),
        ]
    );
    assert_partition(&schema, &result);
}

#[test]
fn test_custom_config_changes_selectors() {
    setup_tracing();

    let mut config = ExtractorConfig::default();
    config.playlist.title = "h2.name".to_string();
    let mut fixture = PlaylistFixture::new("PLcfg");
    fixture.title = None;
    let html = fixture.render().replace("<body>", r#"<body><h2 class="name">Renamed</h2>"#);

    let result = engine::extract_document(&html, &playlist::schema(), &config).unwrap();

    assert_eq!(
        result.get::<String>(playlist::fields::TITLE).as_deref(),
        Some("Renamed")
    );
}

#[test]
fn test_result_serializes_fields_in_declaration_order() {
    setup_tracing();

    let html = PlaylistFixture::new("PLjson").render();
    let result = vidextract::parse_playlist_page(&html).unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let back: ExtractionResult = serde_json::from_str(&json).unwrap();

    assert_eq!(back, result);
    let id_at = json.find("\"id\"").unwrap();
    let videos_at = json.find("\"videos\"").unwrap();
    assert!(id_at < videos_at);
}
