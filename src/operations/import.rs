use super::add::{TransactionForm, create_transaction};
use crate::db::{category_repository, repository};
use crate::error::{AppError, StoreError, ValidationError};
use crate::models::transaction::Transaction;
use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use std::fs::File;
use std::io::Read;
use tracing::info;

#[derive(Debug)]
pub enum ImportFormat {
    CSV,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rows already present with the same type, amount, category, date and note.
    pub duplicates: usize,
}

/// Validates every row first, then stores them in one SQLite transaction.
pub fn import_transactions_to_db(
    conn: &Connection,
    format: ImportFormat,
    path: &str,
) -> Result<ImportSummary, AppError> {
    let file = File::open(path).map_err(|source| AppError::File {
        path: path.to_string(),
        source,
    })?;
    let transactions = match format {
        ImportFormat::CSV => read_csv(conn, file, Local::now().naive_local())?,
    };

    let tx = conn.unchecked_transaction()?;
    let mut summary = ImportSummary::default();
    for transaction in &transactions {
        match repository::add_transaction(&tx, transaction) {
            Ok(_) => summary.imported += 1,
            Err(StoreError::Duplicate(_)) => summary.duplicates += 1,
            Err(e) => return Err(e.into()),
        }
    }
    tx.commit()?;

    info!(path, imported = summary.imported, duplicates = summary.duplicates, "import finished");
    Ok(summary)
}

/// Rows are `type,amount,category,date,note`; the note column may be omitted.
fn read_csv<R: Read>(conn: &Connection, reader: R, now: NaiveDateTime) -> Result<Vec<Transaction>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut transactions = Vec::new();

    for (line_index, result) in reader.records().enumerate() {
        let line = line_index + 1;
        let at_line = |source: AppError| AppError::Import {
            line,
            source: Box::new(source),
        };

        let record = result.map_err(|e| at_line(e.into()))?;
        if record.len() != 4 && record.len() != 5 {
            return Err(at_line(
                ValidationError::WrongFieldCount {
                    expected: "4 or 5",
                    found: record.len(),
                }
                .into(),
            ));
        }

        let form = TransactionForm {
            transaction_type: record.get(0).unwrap_or("").to_string(),
            amount: record.get(1).unwrap_or("").to_string(),
            category: record.get(2).unwrap_or("").to_string(),
            date: record.get(3).unwrap_or("").to_string(),
            note: record.get(4).unwrap_or("").to_string(),
            ..Default::default()
        };

        let transaction = create_transaction(&form, now).map_err(|e| at_line(e.into()))?;
        let known = category_repository::category_exists(conn, &transaction.category)
            .map_err(|e| at_line(e.into()))?;
        if !known {
            return Err(at_line(
                ValidationError::UnknownCategory(transaction.category).into(),
            ));
        }

        transactions.push(transaction);
    }

    Ok(transactions)
}
