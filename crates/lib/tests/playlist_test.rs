//! # Playlist Page Tests
//!
//! Extraction of playlist pages built with `PlaylistFixture`.

use vidextract::extractors::playlist::fields;
use vidextract::{parse_playlist_page, DocumentError, FieldErrorKind, ListItem};
use vidextract_test_utils::{setup_tracing, PlaylistFixture, RowFixture};

fn videos(html: &str) -> Vec<ListItem> {
    parse_playlist_page(html)
        .expect("playlist should be identifiable")
        .get(fields::VIDEOS)
        .expect("videos should extract")
}

#[test]
fn test_complete_playlist_extracts_every_field() {
    setup_tracing();

    // Arrange
    let html = PlaylistFixture::new("PLabc123")
        .row(RowFixture::available("vid1", "First video", "5:08", "Chan One"))
        .row(RowFixture::available("vid2", "Second video", "1:02:03", "Chan Two"))
        .render();

    // Act
    let result = parse_playlist_page(&html).unwrap();

    // Assert
    assert!(result.is_complete(), "unexpected errors: {:?}", result.errors);
    assert_eq!(result.get::<String>(fields::ID).as_deref(), Some("PLabc123"));
    assert_eq!(result.get::<String>(fields::TITLE).as_deref(), Some("Fixture playlist"));
    assert_eq!(
        result.get::<String>(fields::DESCRIPTION).as_deref(),
        Some("A playlist used in tests")
    );
    assert_eq!(result.get::<u64>(fields::VIDEO_COUNT), Some(2));
    assert_eq!(result.get::<u64>(fields::VIEW_COUNT), Some(1234));
    assert_eq!(
        result.get::<String>(fields::UPDATED_AT_STRING).as_deref(),
        Some("Last updated on Mar 4, 2021")
    );

    let videos: Vec<ListItem> = result.get(fields::VIDEOS).unwrap();
    assert_eq!(videos.len(), 2);
    let first = videos[0].as_available().unwrap();
    assert_eq!(first.id, "vid1");
    assert_eq!(first.title, "First video");
    assert_eq!(first.duration_ms, 308_000);
    assert_eq!(first.channel_name, "Chan One");
    assert_eq!(first.channel_url, "/channel/UC-Chan-One");
    assert_eq!(
        first.thumbnail_url.as_deref(),
        Some("https://i.ytimg.com/vi/vid1/hqdefault.jpg")
    );
    assert_eq!(first.watched_at, None);
    assert_eq!(videos[1].as_available().unwrap().duration_ms, 3_723_000);
}

#[test]
fn test_removed_entries_become_unavailable() {
    setup_tracing();

    // Arrange: 3 well-formed rows and 2 removed ones, interleaved.
    let html = PlaylistFixture::new("PLmixed")
        .row(RowFixture::available("a", "A", "1:00", "Chan"))
        .row(RowFixture::unavailable("gone1"))
        .row(RowFixture::available("b", "B", "2:00", "Chan"))
        .row(RowFixture::unavailable("gone2"))
        .row(RowFixture::available("c", "C", "3:00", "Chan"))
        .render();

    // Act
    let videos = videos(&html);

    // Assert
    assert_eq!(videos.len(), 5);
    let unavailable: Vec<&str> = videos
        .iter()
        .filter(|v| v.is_unavailable())
        .map(ListItem::id)
        .collect();
    assert_eq!(unavailable, vec!["gone1", "gone2"]);
    let order: Vec<&str> = videos.iter().map(ListItem::id).collect();
    assert_eq!(order, vec!["a", "gone1", "b", "gone2", "c"]);
}

#[test]
fn test_unloaded_rows_are_dropped() {
    setup_tracing();

    let html = PlaylistFixture::new("PLlazy")
        .row(RowFixture::available("a", "A", "1:00", "Chan"))
        .row(RowFixture::loading("Still loading"))
        .render();

    let videos = videos(&html);

    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].id(), "a");
}

#[test]
fn test_bracketed_title_with_real_thumbnail_is_not_unavailable() {
    setup_tracing();

    let row = RowFixture::unavailable("odd").with_thumbnail("https://i.ytimg.com/vi/odd/hq.jpg");
    let html = PlaylistFixture::new("PLodd").row(row).render();

    assert!(videos(&html).is_empty());
}

#[test]
fn test_empty_playlist_has_no_videos_and_no_error() {
    setup_tracing();

    let html = PlaylistFixture::new("PLempty").render();

    let result = parse_playlist_page(&html).unwrap();

    assert_eq!(result.get::<Vec<ListItem>>(fields::VIDEOS), Some(vec![]));
    assert!(result.error_for(fields::VIDEOS).is_none());
}

#[test]
fn test_no_views_reads_as_zero() {
    setup_tracing();

    let mut fixture = PlaylistFixture::new("PLquiet");
    fixture.view_count = Some("No views".to_string());

    let result = parse_playlist_page(&fixture.render()).unwrap();

    assert_eq!(result.get::<u64>(fields::VIEW_COUNT), Some(0));
    assert!(result.error_for(fields::VIEW_COUNT).is_none());
}

#[test]
fn test_missing_title_fails_only_that_field() {
    setup_tracing();

    let mut fixture = PlaylistFixture::new("PLnotitle");
    fixture.title = None;
    fixture.updated_at = None;

    let result = parse_playlist_page(&fixture.render()).unwrap();

    let errors: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(errors, vec![fields::TITLE, fields::UPDATED_AT_STRING]);
    assert!(result
        .errors
        .iter()
        .all(|e| e.kind == FieldErrorKind::FieldMissing));
    assert_eq!(result.get::<String>(fields::ID).as_deref(), Some("PLnotitle"));
    assert_eq!(result.get::<Vec<ListItem>>(fields::VIDEOS), Some(vec![]));
}

#[test]
fn test_playlist_without_id_is_unidentifiable() {
    setup_tracing();

    let mut fixture = PlaylistFixture::new("unused");
    fixture.id = None;

    let err = parse_playlist_page(&fixture.render()).unwrap_err();

    let DocumentError::Unidentifiable { document, field, kind, .. } = err;
    assert_eq!(document, "playlist-page");
    assert_eq!(field, fields::ID);
    assert_eq!(kind, FieldErrorKind::FieldMissing);
}

#[test]
fn test_fields_follow_declaration_order() {
    setup_tracing();

    let html = PlaylistFixture::new("PLorder").render();

    let result = parse_playlist_page(&html).unwrap();

    let names: Vec<&str> = result.field_names().collect();
    assert_eq!(
        names,
        vec![
            fields::ID,
            fields::TITLE,
            fields::DESCRIPTION,
            fields::VIEW_COUNT,
            fields::VIDEO_COUNT,
            fields::UPDATED_AT_STRING,
            fields::VIDEOS,
        ]
    );
}
