use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

use super::reminder::Reminder;

/// Text format of every date crossing the storage or user boundary.
pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionType {
    Income,
    Expense,
    /// Any stored text that is neither of the two known kinds.
    Other(String),
}

impl TransactionType {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
            TransactionType::Other(raw) => raw,
        }
    }

    /// Maps stored text back to a type. Matching is exact, the way rows were written.
    pub fn from_stored(raw: &str) -> Self {
        match raw {
            "Income" => TransactionType::Income,
            "Expense" => TransactionType::Expense,
            other => TransactionType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alarm {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Alarm {
    pub fn at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Assigned by the store; `None` until inserted.
    pub id: Option<i64>,
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub alarm: Option<Alarm>,
}

impl Transaction {
    pub fn new(
        transaction_type: TransactionType,
        amount: f64,
        category: String,
        date: NaiveDate,
        note: Option<String>,
        alarm: Option<Alarm>,
    ) -> Self {
        Self {
            id: None,
            transaction_type,
            amount,
            category,
            date,
            note,
            alarm,
        }
    }

    pub fn date_text(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn note_text(&self) -> &str {
        self.note.as_deref().unwrap_or("")
    }

    /// What the reminder collaborator needs to fire a notification for this transaction.
    pub fn reminder(&self) -> Option<Reminder> {
        self.alarm.map(|alarm| Reminder::new(alarm.at(), self.note_text()))
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2} [{}] ({})",
            self.transaction_type,
            self.amount,
            self.category,
            self.date_text()
        )?;
        if let Some(note) = &self.note {
            write!(f, " - {}", note)?;
        }
        if let Some(alarm) = &self.alarm {
            write!(
                f,
                " (reminder {} {})",
                alarm.date.format(DATE_FORMAT),
                alarm.time.format(TIME_FORMAT)
            )?;
        }
        Ok(())
    }
}
