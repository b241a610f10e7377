use crate::error::StoreError;
use crate::models::summary::MonthlyCategoryTotal;
use crate::models::transaction::{Alarm, DATE_FORMAT, TIME_FORMAT, Transaction, TransactionType};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{Connection, Row};
use tracing::{debug, warn};

const SELECT_COLUMNS: &str =
    "SELECT id, type, amount, category, date, note, isAlarmEnabled, alarmDate, alarmTime FROM transactions";

pub fn add_transaction(conn: &Connection, transaction: &Transaction) -> Result<i64, StoreError> {
    let (alarm_date, alarm_time) = match &transaction.alarm {
        Some(alarm) => (
            alarm.date.format(DATE_FORMAT).to_string(),
            alarm.time.format(TIME_FORMAT).to_string(),
        ),
        None => (String::new(), String::new()),
    };

    conn.execute(
        "INSERT INTO transactions (type, amount, category, date, note, isAlarmEnabled, alarmDate, alarmTime) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            transaction.transaction_type.as_str(),
            transaction.amount,
            &transaction.category,
            transaction.date_text(),
            transaction.note_text(),
            transaction.alarm.is_some(),
            alarm_date,
            alarm_time,
        ],
    )
    .map_err(|e| StoreError::from_insert(e, "transaction"))
    .inspect_err(|e| warn!(error = %e, "transaction not saved"))?;

    let id = conn.last_insert_rowid();
    debug!(id, category = %transaction.category, "transaction saved");
    Ok(id)
}

/// Every stored transaction, most recently inserted first.
pub fn get_all_transactions(conn: &Connection) -> Result<Vec<Transaction>, StoreError> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY id DESC", SELECT_COLUMNS))?;
    let rows = stmt.query_map([], read_raw)?;

    let mut transactions = Vec::new();
    for raw in rows {
        transactions.push(raw?.into_transaction()?);
    }
    Ok(transactions)
}

/// Sums per (category, type) for one calendar month.
///
/// Matching reads the stored `dd/MM/yyyy` text at fixed offsets (month at
/// characters 4-5, year at 7-10), so rows written in another layout never match.
pub fn get_monthly_totals_by_category(
    conn: &Connection,
    month: u32,
    year: i32,
) -> Result<Vec<MonthlyCategoryTotal>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT category, type, SUM(amount) AS total, COUNT(*) AS count \
         FROM transactions \
         WHERE substr(date, 4, 2) = ?1 AND substr(date, 7, 4) = ?2 \
         GROUP BY category, type \
         ORDER BY MIN(id) ASC",
    )?;

    let iter = stmt.query_map(
        [format!("{:02}", month), format!("{:04}", year)],
        |row| {
            let transaction_type: String = row.get(1)?;
            Ok(MonthlyCategoryTotal {
                category: row.get(0)?,
                transaction_type: TransactionType::from_stored(&transaction_type),
                total: row.get(2)?,
                count: row.get(3)?,
            })
        },
    )?;

    let mut totals = Vec::new();
    for total in iter {
        totals.push(total?);
    }
    Ok(totals)
}

/// Column values as stored, before date and alarm text is parsed.
struct RawTransaction {
    id: i64,
    transaction_type: String,
    amount: f64,
    category: String,
    date: String,
    note: String,
    alarm_enabled: bool,
    alarm_date: String,
    alarm_time: String,
}

fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawTransaction> {
    Ok(RawTransaction {
        id: row.get(0)?,
        transaction_type: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        date: row.get(4)?,
        note: row.get(5)?,
        alarm_enabled: row.get(6)?,
        alarm_date: row.get(7)?,
        alarm_time: row.get(8)?,
    })
}

impl RawTransaction {
    fn into_transaction(self) -> Result<Transaction, StoreError> {
        let corrupt = |what: &str, value: &str| {
            StoreError::CorruptRow(format!("transaction {}: {} '{}'", self.id, what, value))
        };

        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .map_err(|_| corrupt("date", &self.date))?;

        let alarm = if self.alarm_enabled {
            Some(Alarm {
                date: NaiveDate::parse_from_str(&self.alarm_date, DATE_FORMAT)
                    .map_err(|_| corrupt("alarm date", &self.alarm_date))?,
                time: NaiveTime::parse_from_str(&self.alarm_time, TIME_FORMAT)
                    .map_err(|_| corrupt("alarm time", &self.alarm_time))?,
            })
        } else {
            None
        };

        Ok(Transaction {
            id: Some(self.id),
            transaction_type: TransactionType::from_stored(&self.transaction_type),
            amount: self.amount,
            category: self.category,
            date,
            note: if self.note.is_empty() { None } else { Some(self.note) },
            alarm,
        })
    }
}
