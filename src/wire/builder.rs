//! A module to build the event bodies sent to the server

use chrono::{DateTime, SecondsFormat, Utc};

use crate::event::CalendarEvent;
use crate::wire::RawEventBody;

/// Create a request body from a [`CalendarEvent`]
pub fn build_from(event: &CalendarEvent) -> RawEventBody {
    RawEventBody {
        title: event.title.clone(),
        notes: event.notes.clone(),
        start: format_instant(&event.start),
        end: format_instant(&event.end),
    }
}

/// ISO-8601, UTC, millisecond precision (e.g. `2022-10-21T13:00:00.000Z`)
pub fn format_instant(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
