use chrono::NaiveDateTime;

pub const REMINDER_TITLE: &str = "Transaction reminder";

/// Hand-off to whatever schedules notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub at: NaiveDateTime,
    pub title: String,
    pub message: String,
}

impl Reminder {
    pub fn new(at: NaiveDateTime, message: &str) -> Self {
        Self {
            at,
            title: REMINDER_TITLE.to_string(),
            message: message.to_string(),
        }
    }
}
