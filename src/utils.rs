//! Some utility functions

use std::sync::{Mutex, MutexGuard};

use crate::event::CalendarEvent;
use crate::event::User;

/// Lock a mutex, even if a previous holder panicked.
///
/// Every store transition replaces a whole value, so the data behind a poisoned lock is still consistent
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A debug utility that pretty-prints events
pub fn print_event_list(events: &[CalendarEvent], current_user: Option<&User>) {
    for event in events {
        print_event(event, current_user);
    }
}

pub fn print_event(event: &CalendarEvent, current_user: Option<&User>) {
    let mine = match current_user {
        Some(user) if event.is_owned_by(user) => "*",
        _ => " ",
    };
    let id = event.id.as_ref().map(|id| id.as_str()).unwrap_or("<unsaved>");
    println!("    {} {} -> {}\t{}\t{}",
        mine,
        event.start.format("%Y-%m-%d %H:%M"),
        event.end.format("%Y-%m-%d %H:%M"),
        event.title,
        id);
}
