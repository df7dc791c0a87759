//! Normalization of feed text and dates.
//!
//! Feeds carry HTML in titles and descriptions and write publish dates in
//! whatever layout their generator prefers. This module turns both into
//! plain text and UTC timestamps.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use super::types::{NormalizedItem, RawItem};

static TAG_RE: OnceLock<Regex> = OnceLock::new();

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(r"(?s)<.*?>").expect("tag pattern is valid"))
}

/// Remove markup tags and decode HTML entities.
///
/// Tags are removed first, so an entity that decodes to `<` or `>` survives
/// as literal text.
pub fn strip_markup(text: &str) -> String {
    let without_tags = tag_re().replace_all(text, "");
    html_escape::decode_html_entities(&without_tags).into_owned()
}

type DateParser = fn(&str) -> Option<DateTime<Utc>>;

/// Layouts tried in order; the first that matches wins.
const DATE_PARSERS: &[DateParser] = &[
    rfc1123_numeric_zone,
    rfc1123_zone_name,
    rfc822_numeric_zone,
    rfc822_zone_name,
    rfc850,
    rfc3339,
    iso_numeric_zone,
    ansi_c,
];

/// Parse a feed publish date into UTC.
///
/// Returns `None` when the string matches none of the known layouts.
pub fn parse_publish_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_PARSERS.iter().find_map(|parse| parse(raw))
}

/// Normalize one raw item.
pub fn normalize_item(item: &RawItem) -> NormalizedItem {
    NormalizedItem {
        title: strip_markup(&item.title),
        link: item.link.clone(),
        description: strip_markup(&item.description),
        published_at: parse_publish_date(&item.pub_date),
    }
}

const SHORT_WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const LONG_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Split off a leading weekday name.
///
/// The weekday is checked for spelling only; feeds often get it wrong, so it
/// is not compared against the date.
fn strip_weekday<'a>(s: &'a str, names: &[&str], sep: &str) -> Option<&'a str> {
    let (day, rest) = s.split_once(sep)?;
    names
        .iter()
        .any(|name| name.eq_ignore_ascii_case(day))
        .then_some(rest)
}

/// Offset for an alphabetic zone name.
///
/// Unknown names are taken as UTC.
fn zone_offset(zone: &str) -> Option<FixedOffset> {
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let hours = match zone.to_ascii_uppercase().as_str() {
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        _ => 0,
    };
    FixedOffset::east_opt(hours * 3600)
}

fn with_numeric_zone(s: &str, fmt: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, fmt)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn with_zone_name(s: &str, fmt: &str) -> Option<DateTime<Utc>> {
    let (body, zone) = s.rsplit_once(' ')?;
    let offset = zone_offset(zone)?;
    let naive = NaiveDateTime::parse_from_str(body.trim_end(), fmt).ok()?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `Mon, 02 Jan 2006 15:04:05 -0700`
fn rfc1123_numeric_zone(s: &str) -> Option<DateTime<Utc>> {
    let rest = strip_weekday(s, &SHORT_WEEKDAYS, ", ")?;
    with_numeric_zone(rest, "%d %b %Y %H:%M:%S %z")
}

/// `Mon, 02 Jan 2006 15:04:05 MST`
fn rfc1123_zone_name(s: &str) -> Option<DateTime<Utc>> {
    let rest = strip_weekday(s, &SHORT_WEEKDAYS, ", ")?;
    with_zone_name(rest, "%d %b %Y %H:%M:%S")
}

/// `02 Jan 06 15:04 -0700`
fn rfc822_numeric_zone(s: &str) -> Option<DateTime<Utc>> {
    with_numeric_zone(s, "%d %b %y %H:%M %z")
}

/// `02 Jan 06 15:04 MST`
fn rfc822_zone_name(s: &str) -> Option<DateTime<Utc>> {
    with_zone_name(s, "%d %b %y %H:%M")
}

/// `Monday, 02-Jan-06 15:04:05 MST`
fn rfc850(s: &str) -> Option<DateTime<Utc>> {
    let rest = strip_weekday(s, &LONG_WEEKDAYS, ", ")?;
    with_zone_name(rest, "%d-%b-%y %H:%M:%S")
}

/// `2006-01-02T15:04:05Z07:00`
fn rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `2006-01-02 15:04:05 -0700`
fn iso_numeric_zone(s: &str) -> Option<DateTime<Utc>> {
    with_numeric_zone(s, "%Y-%m-%d %H:%M:%S %z")
}

/// `Mon Jan  2 15:04:05 2006`, taken as UTC.
fn ansi_c(s: &str) -> Option<DateTime<Utc>> {
    let rest = strip_weekday(s, &SHORT_WEEKDAYS, " ")?;
    let naive = NaiveDateTime::parse_from_str(rest.trim_start(), "%b %e %H:%M:%S %Y").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}
