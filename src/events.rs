//! The local collection of calendar events

use crate::error::StoreError;
use crate::event::{CalendarEvent, EventId};

/// Holds the events of the calendar, in the order the server sent (or confirmed) them, and the currently selected one.
///
/// Transitions that would break an invariant return a [`StoreError`] and leave the store unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct EventStore {
    events: Vec<CalendarEvent>,
    active_event: Option<CalendarEvent>,
    loading: bool,
}

impl Default for EventStore {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            active_event: None,
            loading: true,
        }
    }
}

impl EventStore {
    /// An empty store, waiting for its first load
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already contains `events` (useful for tests)
    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self { events, active_event: None, loading: false }
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn active_event(&self) -> Option<&CalendarEvent> {
        self.active_event.as_ref()
    }

    pub fn has_event_selected(&self) -> bool {
        self.active_event.is_some()
    }

    /// Whether the events have not been loaded yet
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn get(&self, id: &EventId) -> Option<&CalendarEvent> {
        self.events.iter().find(|e| e.id.as_ref() == Some(id))
    }

    /// Select an event. The store keeps its own copy of it
    pub fn set_active(&mut self, event: CalendarEvent) {
        self.active_event = Some(event);
    }

    pub fn unset_active(&mut self) {
        self.active_event = None;
    }

    /// Append an event the server has just stored
    pub fn add_new(&mut self, event: CalendarEvent) -> Result<(), StoreError> {
        let id = match &event.id {
            None => return Err(StoreError::MissingId),
            Some(id) => id,
        };
        if self.get(id).is_some() {
            return Err(StoreError::DuplicateId(id.clone()));
        }

        log::debug!("Adding event {}", id);
        self.events.push(event);
        Ok(())
    }

    /// Replace the event that has the same id. The active event is refreshed as well if it is this one
    pub fn update(&mut self, event: CalendarEvent) -> Result<(), StoreError> {
        let id = match &event.id {
            None => return Err(StoreError::MissingId),
            Some(id) => id.clone(),
        };
        let slot = match self.events.iter_mut().find(|e| e.id.as_ref() == Some(&id)) {
            None => return Err(StoreError::NotFound(id)),
            Some(slot) => slot,
        };

        log::debug!("Updating event {}", id);
        if self.active_event.as_ref().and_then(|active| active.id.as_ref()) == Some(&id) {
            self.active_event = Some(event.clone());
        }
        *slot = event;
        Ok(())
    }

    /// Remove the active event from the collection, and unselect it.
    ///
    /// Returns the removed event, or `None` in case nothing was selected (or it was not in the collection)
    pub fn delete(&mut self) -> Option<CalendarEvent> {
        let active = self.active_event.take()?;
        let id = active.id?;

        let index = self.events.iter().position(|e| e.id.as_ref() == Some(&id))?;
        log::debug!("Deleting event {}", id);
        Some(self.events.remove(index))
    }

    /// Remove the event that has this id, whether it is selected or not.
    /// It is unselected in case it was the active event
    pub fn remove(&mut self, id: &EventId) -> Option<CalendarEvent> {
        if self.active_event.as_ref().and_then(|active| active.id.as_ref()) == Some(id) {
            self.active_event = None;
        }
        let index = self.events.iter().position(|e| e.id.as_ref() == Some(id))?;
        log::debug!("Removing event {}", id);
        Some(self.events.remove(index))
    }

    /// Replace the whole collection. The active event is left untouched
    pub fn load(&mut self, events: Vec<CalendarEvent>) {
        log::debug!("Loading {} events", events.len());
        self.events = events;
        self.loading = false;
    }

    /// Go back to the state before the first load
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
