//! A module to parse the events the server sends

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::ValidationError;
use crate::event::{CalendarEvent, EventId};
use crate::wire::RawEvent;

/// Forms with a numeric offset that RFC 3339 refuses (basic `+0200` offsets, minute precision)
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];
/// Offset-less forms, that are read as UTC
const NAIVE_FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Parse the events of a server response into [`CalendarEvent`]s.
///
/// Order and length are preserved. A single invalid date fails the whole batch.
pub fn parse(raw_events: Vec<RawEvent>) -> Result<Vec<CalendarEvent>, ValidationError> {
    raw_events.into_iter()
        .map(parse_event)
        .collect()
}

pub fn parse_event(raw: RawEvent) -> Result<CalendarEvent, ValidationError> {
    let start = parse_instant("start", &raw.start)?;
    let end = parse_instant("end", &raw.end)?;

    Ok(CalendarEvent {
        id: raw.id.map(EventId::from),
        title: raw.title,
        notes: raw.notes.unwrap_or_default(),
        start,
        end,
        owner: raw.owner,
    })
}

/// Parse an ISO-8601 date-time.
///
/// Accepted forms are RFC 3339 (`2022-10-21T13:00:00.000Z`, `2022-10-21T15:00:00+02:00`),
/// basic-format offsets (`2022-10-21T15:00:00+0200`), minute precision (`2022-10-21T13:00Z`),
/// date-times without an offset (read as UTC), and bare dates (midnight UTC).
pub fn parse_instant(field: &'static str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let value = value.trim();

    let rfc3339_err = match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => return Ok(dt.with_timezone(&Utc)),
        Err(err) => err,
    };

    for format in OFFSET_FORMATS.iter() {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    // A trailing `Z` means UTC, which is how offset-less forms are read anyway
    let naive_value = value.strip_suffix('Z')
        .or_else(|| value.strip_suffix('z'))
        .unwrap_or(value);
    for format in NAIVE_FORMATS.iter() {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_value, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }

    Err(ValidationError::InvalidDate {
        field,
        value: value.to_string(),
        source: rfc3339_err,
    })
}
