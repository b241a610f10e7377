use crate::db::repository;
use crate::error::AppError;
use crate::models::transaction::{Transaction, TransactionType};
use rusqlite::Connection;

/// Value the type and category pickers show when nothing is selected.
pub const ALL: &str = "All";

/// Conjunctive history filter; `None` means the field is not filtered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
    /// Exact `dd/MM/yyyy` text to match.
    pub date: Option<String>,
}

impl HistoryFilter {
    /// Builds a filter from picker values, treating "All" and blank input as unset.
    pub fn from_inputs(transaction_type: &str, category: &str, date: &str) -> Self {
        Self {
            transaction_type: selected(transaction_type).map(TransactionType::from_stored),
            category: selected(category).map(str::to_string),
            date: selected(date).map(str::to_string),
        }
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(t) = &self.transaction_type {
            if &transaction.transaction_type != t {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &transaction.category != category {
                return false;
            }
        }
        if let Some(date) = &self.date {
            if &transaction.date_text() != date {
                return false;
            }
        }
        true
    }
}

fn selected(input: &str) -> Option<&str> {
    let input = input.trim();
    if input.is_empty() || input == ALL {
        None
    } else {
        Some(input)
    }
}

/// Keeps the order of `transactions`.
pub fn filter_history(transactions: &[Transaction], filter: &HistoryFilter) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| filter.matches(transaction))
        .cloned()
        .collect()
}

pub fn transaction_history(conn: &Connection, filter: &HistoryFilter) -> Result<Vec<Transaction>, AppError> {
    let all = repository::get_all_transactions(conn)?;
    Ok(filter_history(&all, filter))
}
