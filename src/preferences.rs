//! Display preferences that survive a restart

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::config::LAST_VIEW_KEY;
use crate::traits::KeyValueStore;

/// The ways the calendar can be displayed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalendarView {
    Month,
    Week,
    WorkWeek,
    Day,
    Agenda,
}

impl Default for CalendarView {
    fn default() -> Self {
        CalendarView::Week
    }
}

impl Display for CalendarView {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        let name = match self {
            CalendarView::Month => "month",
            CalendarView::Week => "week",
            CalendarView::WorkWeek => "work_week",
            CalendarView::Day => "day",
            CalendarView::Agenda => "agenda",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for CalendarView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(CalendarView::Month),
            "week" => Ok(CalendarView::Week),
            "work_week" => Ok(CalendarView::WorkWeek),
            "day" => Ok(CalendarView::Day),
            "agenda" => Ok(CalendarView::Agenda),
            other => Err(format!("Unknown calendar view {:?}", other)),
        }
    }
}


/// Reads and writes the last view the user picked
pub struct Preferences<'a, S: KeyValueStore> {
    storage: &'a S,
}

impl<'a, S: KeyValueStore> Preferences<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// The last view, or the default one in case none (or an unknown one) was stored
    pub fn last_view(&self) -> CalendarView {
        match self.storage.get(LAST_VIEW_KEY).map(|raw| raw.parse::<CalendarView>()) {
            None => CalendarView::default(),
            Some(Ok(view)) => view,
            Some(Err(err)) => {
                log::warn!("{}. Using the default view", err);
                CalendarView::default()
            },
        }
    }

    pub fn set_last_view(&self, view: CalendarView) {
        self.storage.set(LAST_VIEW_KEY, &view.to_string());
    }
}
