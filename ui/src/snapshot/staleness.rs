//! Age bucketing and display formatting for the snapshot timestamp.

use time::{
    format_description::well_known::Rfc3339, macros::format_description, Month, OffsetDateTime,
    PrimitiveDateTime, UtcOffset,
};

/// How long ago the snapshot was produced, floored to the largest whole unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    JustNow,
    Minutes(i64),
    Hours(i64),
    Days(i64),
}

impl Staleness {
    pub fn between(updated: OffsetDateTime, now: OffsetDateTime) -> Self {
        let elapsed = now - updated;
        let minutes = elapsed.whole_minutes();
        let hours = elapsed.whole_hours();
        let days = hours / 24;

        if days > 0 {
            Staleness::Days(days)
        } else if hours > 0 {
            Staleness::Hours(hours)
        } else if minutes > 0 {
            Staleness::Minutes(minutes)
        } else {
            Staleness::JustNow
        }
    }

    pub fn label(&self) -> String {
        match *self {
            Staleness::JustNow => crate::t!("age-just-now"),
            Staleness::Minutes(count) => crate::t!("age-minutes", count = count),
            Staleness::Hours(count) => crate::t!("age-hours", count = count),
            Staleness::Days(count) => crate::t!("age-days", count = count),
        }
    }
}

/// Parse the producer's timestamp. RFC 3339 values keep their offset; naive
/// ISO-like values (`2026-10-18T09:00:00.123456`, `2026-10-18 09:00:00`) are
/// taken to be wall-clock time in `assumed_offset`.
pub fn parse_timestamp(raw: &str, assumed_offset: UtcOffset) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }

    let iso_t = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    let iso_space = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
    );

    PrimitiveDateTime::parse(raw, &iso_t)
        .or_else(|_| PrimitiveDateTime::parse(raw, &iso_space))
        .ok()
        .map(|naive| naive.assume_offset(assumed_offset))
}

/// Wall-clock time in the display offset, in the active language
/// (`18 Oct 2026, 09:00`, `18 ต.ค. 2026 09:00 น.`).
pub fn format_display(timestamp: OffsetDateTime, display_offset: UtcOffset) -> String {
    let local = timestamp.to_offset(display_offset);
    let time = local
        .format(&format_description!("[hour]:[minute]"))
        .unwrap_or_default();
    crate::t!(
        "updated-stamp",
        day = format!("{:02}", local.day()),
        month = month_name(local.month()),
        year = local.year().to_string(),
        time = time
    )
}

fn month_name(month: Month) -> String {
    match month {
        Month::January => crate::t!("month-jan"),
        Month::February => crate::t!("month-feb"),
        Month::March => crate::t!("month-mar"),
        Month::April => crate::t!("month-apr"),
        Month::May => crate::t!("month-may"),
        Month::June => crate::t!("month-jun"),
        Month::July => crate::t!("month-jul"),
        Month::August => crate::t!("month-aug"),
        Month::September => crate::t!("month-sep"),
        Month::October => crate::t!("month-oct"),
        Month::November => crate::t!("month-nov"),
        Month::December => crate::t!("month-dec"),
    }
}
