//! Typed parsers for integer, date and date-time cells

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::enquete::Clamp;

use super::lookup::Vocabularies;
use super::width::to_half_width;

/// Trailing weekday markers such as `(火)` or `（水曜日）`
static WEEKDAY_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*[(（]\s*[月火水木金土日](?:曜日?)?\s*[)）]").expect("weekday pattern is valid")
});

/// Offset-carrying formats, tried before the naive ones
const AWARE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y/%m/%d %H:%M:%S%.f%z",
    "%Y/%m/%d %H:%M:%S%.f %z",
];

/// Year-first formats with a time part, then month-first and 12-hour ones.
/// `%b` also accepts full month names when parsing.
const NAIVE_DATETIME_FORMATS: [&str; 19] = [
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y.%m.%d %H:%M:%S%.f",
    "%Y.%m.%d %H:%M",
    "%y/%m/%d %H:%M:%S",
    "%y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %I:%M:%S %p",
    "%Y/%m/%d %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%b %d, %Y %H:%M:%S",
    "%b %d %Y %H:%M",
    "%d %b %Y %H:%M",
];

const DATE_FORMATS: [&str; 11] = [
    "%Y/%m/%d",
    "%Y-%m-%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%y/%m/%d",
    "%y-%m-%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
    "%d-%b-%Y",
];

/// Zone attached to timestamps that carry none
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultZone {
    Named(Tz),
    /// The host's local zone
    HostLocal,
}

impl Default for DefaultZone {
    fn default() -> Self {
        DefaultZone::Named(chrono_tz::Asia::Tokyo)
    }
}

impl DefaultZone {
    /// Look up an IANA zone name, falling back to the host zone
    pub fn from_name(name: &str) -> Self {
        match name.trim().parse::<Tz>() {
            Ok(tz) => DefaultZone::Named(tz),
            Err(_) => {
                log::warn!(
                    "Unknown time zone '{}', falling back to the host local zone",
                    name
                );
                DefaultZone::HostLocal
            }
        }
    }

    /// Interpret a wall-clock time in this zone
    pub fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            DefaultZone::Named(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
            DefaultZone::HostLocal => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset()),
        }
    }

    /// Current time in this zone
    pub fn now(&self) -> DateTime<FixedOffset> {
        match self {
            DefaultZone::Named(tz) => Utc::now().with_timezone(tz).fixed_offset(),
            DefaultZone::HostLocal => Local::now().fixed_offset(),
        }
    }
}

impl std::fmt::Display for DefaultZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultZone::Named(tz) => write!(f, "{}", tz.name()),
            DefaultZone::HostLocal => write!(f, "host local"),
        }
    }
}

/// Immutable parser settings handed to the resolver and record builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseSettings {
    pub zone: DefaultZone,
    pub vocabularies: Vocabularies,
}

impl ParseSettings {
    pub fn with_zone(zone: DefaultZone) -> Self {
        ParseSettings {
            zone,
            ..Self::default()
        }
    }
}

/// Parse an integer cell.
///
/// Width-folds and strips thousands separators, then tries an integer and
/// falls back to a truncated float. Anything else is `None`. The clamp, if
/// any, applies after parsing.
pub fn parse_integer(value: &str, clamp: Option<Clamp>) -> Option<i64> {
    if value.is_empty() {
        return None;
    }

    let normalized = to_half_width(value).replace(',', "");
    let normalized = normalized.trim();

    let parsed = if !normalized.is_empty() && normalized.chars().all(|c| c.is_ascii_digit()) {
        normalized
            .parse::<i64>()
            .ok()
            .or_else(|| truncate_float(normalized))?
    } else {
        truncate_float(normalized)?
    };

    Some(match clamp {
        Some(clamp) => clamp.apply(parsed),
        None => parsed,
    })
}

fn truncate_float(value: &str) -> Option<i64> {
    let f = value.parse::<f64>().ok()?;
    if !f.is_finite() {
        return None;
    }
    let truncated = f.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

/// Rewrite Japanese date glyphs into a plain slash form.
///
/// `2024年3月5日(火)` becomes `2024/3/5`.
pub fn normalize_date_text(value: &str) -> String {
    let text = value.replace('\u{3000}', " ");
    let text = WEEKDAY_MARKER.replace_all(&text, "");
    let mut text = to_half_width(&text);
    if text.contains(['年', '月', '日']) {
        text = text.replace(['年', '月'], "/").replace('日', "");
    }
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches('/')
        .to_string()
}

/// Parse a date-time cell, attaching the default zone when none is given.
///
/// Empty cells and the literal `"0"` are `None`, as is anything that does
/// not parse.
pub fn parse_datetime(value: &str, settings: &ParseSettings) -> Option<DateTime<FixedOffset>> {
    let text = value.trim();
    if text.is_empty() || text == "0" {
        return None;
    }

    let text = normalize_date_text(text);
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Some(dt);
    }
    for format in AWARE_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&text, format) {
            return Some(dt);
        }
    }

    parse_naive(&text).and_then(|naive| settings.zone.localize(naive))
}

/// Parse a date cell; the calendar date of [`parse_datetime`]
pub fn parse_date(value: &str, settings: &ParseSettings) -> Option<NaiveDate> {
    parse_datetime(value, settings).map(|dt| dt.date_naive())
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    // %Y happily reads "24" as year 24; two-digit years go to the %y formats
    let plausible = |year: i32| year >= 1000;

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            if plausible(dt.year()) {
                return Some(dt);
            }
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            if plausible(date.year()) {
                return date.and_hms_opt(0, 0, 0);
            }
        }
    }
    None
}
