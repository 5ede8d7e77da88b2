//! # Value Normalizers
//!
//! Pure, total conversions from the decorated strings found in rendered pages
//! to plain numbers. None of these can fail: the platform legitimately omits
//! or zeroes values (a playlist with "no views", a live stream without a
//! duration), so each function degrades to a neutral result and leaves the
//! decision of whether that result is acceptable to the field extractor.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const SECOND_MS: u64 = 1_000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

static MACHINE_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^P(?:(\d*)D)?T(?:(\d*)H)?(?:(\d*)M)?(?:(\d*)S)?$")
        .expect("machine duration pattern is valid")
});

/// Converts a clock-style duration (`"5:08"`, `"46:11"`, `"19:33:49"`) to
/// milliseconds. Two parts are minutes and seconds, three are hours, minutes
/// and seconds. Any other shape, or a part that is not a number, gives `0`.
pub fn compact_duration_ms(text: &str) -> u64 {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return 0;
    }

    let mut numbers = Vec::with_capacity(parts.len());
    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            numbers.push(0);
            continue;
        }
        match part.parse::<u64>() {
            Ok(n) => numbers.push(n),
            Err(_) => return 0,
        }
    }

    let (hours, minutes, seconds) = match numbers.as_slice() {
        [m, s] => (0, *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return 0,
    };

    hours
        .saturating_mul(HOUR_MS)
        .saturating_add(minutes.saturating_mul(MINUTE_MS))
        .saturating_add(seconds.saturating_mul(SECOND_MS))
}

/// Converts a machine-readable duration such as `"P1DT6H11M55S"` or `"PT4M13S"`
/// to milliseconds. Missing components count as zero; input that does not
/// match the pattern gives `0`. A zero result is not an error here, callers
/// that need a real duration check for it themselves.
pub fn machine_duration_ms(text: &str) -> u64 {
    let Some(caps) = MACHINE_DURATION.captures(text.trim()) else {
        return 0;
    };

    let component = |index: usize| -> u64 {
        caps.get(index)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    component(1)
        .saturating_mul(DAY_MS)
        .saturating_add(component(2).saturating_mul(HOUR_MS))
        .saturating_add(component(3).saturating_mul(MINUTE_MS))
        .saturating_add(component(4).saturating_mul(SECOND_MS))
}

/// Pulls every digit out of a decorated string (`"12,345 views"`) and reads
/// them as one integer. Returns `None` when the text holds no digit at all
/// (`"no views"`) or when the digits do not fit in a `u64`; callers map both
/// to their own default.
pub fn extract_number(text: &str) -> Option<u64> {
    let mut found = false;
    let mut value: u64 = 0;
    for digit in text.chars().filter_map(|c| c.to_digit(10)) {
        found = true;
        value = value.checked_mul(10)?.checked_add(u64::from(digit))?;
    }
    found.then_some(value)
}

/// Parses `"42%"` or `"42"` into `42.0`. Blank, non-numeric or non-finite
/// input (`"inf%"`) gives `f64::NAN`; check with `is_nan` rather than
/// comparing.
pub fn parse_percentage(text: &str) -> f64 {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    if number.is_empty() {
        return f64::NAN;
    }
    number
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .unwrap_or(f64::NAN)
}

/// Reads a query parameter from an absolute or site-relative link
/// (`"/watch?v=abc&list=PL1"`). Blank values count as absent.
pub fn query_param(link: &str, key: &str) -> Option<String> {
    let (_, query) = link.split_once('?')?;
    let query = query.split_once('#').map_or(query, |(q, _)| q);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The last non-empty path segment of a link, ignoring query and fragment:
/// `"/channel/UC123"` gives `"UC123"`.
pub fn last_path_segment(link: &str) -> Option<&str> {
    let path = link.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

/// The canonical watch URL of a video.
pub fn video_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}

/// The well-known thumbnail URLs the image host serves for every video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnails {
    /// `default.jpg` first, then the three frame captures `1.jpg`..`3.jpg`.
    pub small: Vec<String>,
    pub mq: String,
    pub hq: String,
    pub sd: String,
    pub max_res: String,
}

pub fn thumbnails(id: &str) -> Thumbnails {
    let base = format!("https://img.youtube.com/vi/{id}");
    let mut small = vec![format!("{base}/default.jpg")];
    small.extend((1..=3).map(|n| format!("{base}/{n}.jpg")));

    Thumbnails {
        small,
        mq: format!("{base}/mqdefault.jpg"),
        hq: format!("{base}/hqdefault.jpg"),
        sd: format!("{base}/sddefault.jpg"),
        max_res: format!("{base}/maxresdefault.jpg"),
    }
}
