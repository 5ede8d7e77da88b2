//! # Document Extractors
//!
//! One field schema per page type. Each module exposes `schema()`, its
//! `DOCUMENT` name and a `fields` module with the declared field names.
//! The shared row reading and "removed entry" heuristic lives in `list`.

pub mod list;
pub mod playlist;
pub mod subscriptions;
pub mod video;
pub mod watch_history;
