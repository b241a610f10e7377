use crate::db::repository;
use crate::error::{AppError, ValidationError};
use crate::models::summary::{IncomeExpense, MonthlyCategoryTotal};
use crate::models::transaction::TransactionType;
use rusqlite::Connection;
use std::collections::BTreeMap;

/// Rows typed neither Income nor Expense count toward neither total.
pub fn split_income_expense(rows: &[MonthlyCategoryTotal]) -> IncomeExpense {
    rows.iter().fold(IncomeExpense::default(), |mut acc, row| {
        match row.transaction_type {
            TransactionType::Income => acc.income += row.total,
            TransactionType::Expense => acc.expense += row.total,
            TransactionType::Other(_) => {}
        }
        acc
    })
}

pub fn category_totals(rows: &[MonthlyCategoryTotal], transaction_type: &TransactionType) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for row in rows.iter().filter(|r| &r.transaction_type == transaction_type) {
        *totals.entry(row.category.clone()).or_insert(0.0) += row.total;
    }
    totals
}

/// Everything the monthly chart and summary cards need.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    pub month: u32,
    pub year: i32,
    pub rows: Vec<MonthlyCategoryTotal>,
    pub totals: IncomeExpense,
    pub income_by_category: BTreeMap<String, f64>,
    pub expense_by_category: BTreeMap<String, f64>,
}

pub fn monthly_report(conn: &Connection, month: u32, year: i32) -> Result<MonthlyReport, AppError> {
    let rows = repository::get_monthly_totals_by_category(conn, month, year)?;
    Ok(MonthlyReport {
        month,
        year,
        totals: split_income_expense(&rows),
        income_by_category: category_totals(&rows, &TransactionType::Income),
        expense_by_category: category_totals(&rows, &TransactionType::Expense),
        rows,
    })
}

/// Parses `MM YYYY` style arguments for `monthly_report`.
pub fn parse_month_year(month: &str, year: &str) -> Result<(u32, i32), ValidationError> {
    let month_value = month
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| ValidationError::InvalidMonth(month.to_string()))?;
    let year_value = year
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|y| (0..=9999).contains(y))
        .ok_or_else(|| ValidationError::InvalidYear(year.to_string()))?;
    Ok((month_value, year_value))
}

/// Income, expense and balance across the whole store, recomputed on every call.
pub fn overall_summary(conn: &Connection) -> Result<IncomeExpense, AppError> {
    let all = repository::get_all_transactions(conn)?;
    Ok(all.iter().fold(IncomeExpense::default(), |mut acc, tx| {
        match tx.transaction_type {
            TransactionType::Income => acc.income += tx.amount,
            TransactionType::Expense => acc.expense += tx.amount,
            TransactionType::Other(_) => {}
        }
        acc
    }))
}
