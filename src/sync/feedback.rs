//! Utilities to tell the user how their last operation went

use std::fmt::{Display, Error, Formatter};

/// A notification the user should see
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// Nothing to report
    None,
    /// Logging in, registering or re-validating the session failed
    AuthFailed { message: String },
    /// The events could not be loaded
    LoadFailed { details: Option<String> },
    /// An event could not be saved
    SaveFailed { details: Option<String> },
    /// An event could not be deleted
    DeleteFailed { details: Option<String> },
}

impl Notification {
    pub fn is_error(&self) -> bool {
        !matches!(self, Notification::None)
    }
}

impl Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let (title, details) = match self {
            Notification::None => return Ok(()),
            Notification::AuthFailed { message } => return write!(f, "{}", message),
            Notification::LoadFailed { details } => ("Error loading the events", details),
            Notification::SaveFailed { details } => ("Error saving the event", details),
            Notification::DeleteFailed { details } => ("Error deleting the event", details),
        };
        match details {
            None => write!(f, "{}", title),
            Some(details) => write!(f, "{}: {}", title, details),
        }
    }
}

impl Default for Notification {
    fn default() -> Self {
        Self::None
    }
}



/// See [`feedback_channel`]
pub type FeedbackSender = tokio::sync::watch::Sender<Notification>;
/// See [`feedback_channel`]
pub type FeedbackReceiver = tokio::sync::watch::Receiver<Notification>;

/// Create a feeback channel, that can be used to retrieve the latest notification
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    tokio::sync::watch::channel(Notification::default())
}




/// Logs what happens during a single operation, and forwards what the user must see to the feedback channel (if any)
pub struct Feedback<'a> {
    n_errors: u32,
    feedback_channel: Option<&'a FeedbackSender>,
}
impl<'a> Feedback<'a> {
    pub fn new() -> Self {
        Self { n_errors: 0, feedback_channel: None }
    }
    pub fn new_with_feedback_channel(channel: Option<&'a FeedbackSender>) -> Self {
        Self { n_errors: 0, feedback_channel: channel }
    }

    pub fn is_success(&self) -> bool {
        self.n_errors == 0
    }

    /// Log an error, and notify the user
    pub fn error(&mut self, notification: Notification, text: &str) {
        log::error!("{}", text);
        self.n_errors += 1;
        self.notify(notification);
    }
    /// Log a warning. This does not make the operation fail
    pub fn warn(&mut self, text: &str) {
        log::warn!("{}", text);
    }
    /// Log an info
    pub fn info(&mut self, text: &str) {
        log::info!("{}", text);
    }
    /// Log a debug message
    pub fn debug(&mut self, text: &str) {
        log::debug!("{}", text);
    }
    /// Send a notification to the listener (if any).
    pub fn notify(&mut self, notification: Notification) {
        if let Some(sender) = self.feedback_channel {
            sender.send_replace(notification);
        }
    }
}

impl<'a> Default for Feedback<'a> {
    fn default() -> Self {
        Self::new()
    }
}
