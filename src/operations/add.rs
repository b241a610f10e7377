use crate::db::{category_repository, repository};
use crate::error::{AppError, ValidationError};
use crate::models::transaction::{Alarm, DATE_FORMAT, TIME_FORMAT, Transaction, TransactionType};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;
use std::sync::LazyLock;

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|[12][0-9]|3[01])/(0[1-9]|1[012])/(19|20)\d\d$")
        .expect("date pattern is valid")
});

static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern is valid"));

/// Raw entry-form fields, exactly as typed.
#[derive(Debug, Clone, Default)]
pub struct TransactionForm {
    pub transaction_type: String,
    pub amount: String,
    pub category: String,
    pub date: String,
    pub note: String,
    pub alarm_enabled: bool,
    pub alarm_date: String,
    pub alarm_time: String,
}

impl TransactionForm {
    /// Parses `type, amount, category, date[, note[, alarm date, alarm time]]`.
    pub fn from_line(input: &str) -> Result<Self, ValidationError> {
        let parts: Vec<&str> = input.split(',').map(|s| s.trim()).collect();
        let mut form = match parts.as_slice() {
            [transaction_type, amount, category, date, rest @ ..] if rest.len() <= 1 || rest.len() == 3 => {
                TransactionForm {
                    transaction_type: transaction_type.to_string(),
                    amount: amount.to_string(),
                    category: category.to_string(),
                    date: date.to_string(),
                    note: rest.first().map(|s| s.to_string()).unwrap_or_default(),
                    ..Default::default()
                }
            }
            _ => {
                return Err(ValidationError::WrongFieldCount {
                    expected: "4, 5 or 7",
                    found: parts.len(),
                });
            }
        };
        if parts.len() == 7 {
            form.alarm_enabled = true;
            form.alarm_date = parts[5].to_string();
            form.alarm_time = parts[6].to_string();
        }
        Ok(form)
    }
}

/// Validates a form against the clock value `now`. Nothing is written.
pub fn create_transaction(form: &TransactionForm, now: NaiveDateTime) -> Result<Transaction, ValidationError> {
    let amount_text = form.amount.trim();
    let type_text = form.transaction_type.trim();
    let date_text = form.date.trim();
    let category = form.category.trim();

    if amount_text.is_empty() {
        return Err(ValidationError::MissingField("amount"));
    }
    if type_text.is_empty() {
        return Err(ValidationError::MissingField("type"));
    }
    if date_text.is_empty() {
        return Err(ValidationError::MissingField("date"));
    }
    if category.is_empty() {
        return Err(ValidationError::MissingField("category"));
    }

    let transaction_type = parse_type(type_text)?;
    let date = parse_date(date_text)?;

    let alarm = if form.alarm_enabled {
        Some(parse_alarm(form.alarm_date.trim(), form.alarm_time.trim(), now)?)
    } else {
        None
    };

    let amount = parse_amount(amount_text)?;
    let note = form.note.trim();

    Ok(Transaction::new(
        transaction_type,
        amount,
        category.to_string(),
        date,
        if note.is_empty() { None } else { Some(note.to_string()) },
        alarm,
    ))
}

/// Validates one input line, checks the category is known and stores it.
pub fn add_transaction_to_db(conn: &Connection, input: &str) -> Result<Transaction, AppError> {
    let form = TransactionForm::from_line(input)?;
    let mut transaction = create_transaction(&form, Local::now().naive_local())?;
    if !category_repository::category_exists(conn, &transaction.category)? {
        return Err(ValidationError::UnknownCategory(transaction.category).into());
    }
    let id = repository::add_transaction(conn, &transaction)?;
    transaction.id = Some(id);
    Ok(transaction)
}

pub fn parse_type(input: &str) -> Result<TransactionType, ValidationError> {
    match input.to_lowercase().as_str() {
        "income" => Ok(TransactionType::Income),
        "expense" => Ok(TransactionType::Expense),
        _ => Err(ValidationError::InvalidType(input.to_string())),
    }
}

/// Accepts `dd/MM/yyyy` only, then rejects days the calendar does not have.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    if !DATE_PATTERN.is_match(input) {
        return Err(ValidationError::InvalidDateFormat(input.to_string()));
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| ValidationError::NonexistentDate(input.to_string()))
}

pub fn parse_time(input: &str) -> Result<NaiveTime, ValidationError> {
    if !TIME_PATTERN.is_match(input) {
        return Err(ValidationError::InvalidTimeFormat(input.to_string()));
    }
    NaiveTime::parse_from_str(input, TIME_FORMAT)
        .map_err(|_| ValidationError::InvalidTimeFormat(input.to_string()))
}

fn parse_alarm(date: &str, time: &str, now: NaiveDateTime) -> Result<Alarm, ValidationError> {
    if date.is_empty() {
        return Err(ValidationError::MissingField("alarm date"));
    }
    let date = parse_date(date)?;
    if time.is_empty() {
        return Err(ValidationError::MissingField("alarm time"));
    }
    let alarm = Alarm {
        date,
        time: parse_time(time)?,
    };
    if alarm.at() <= now {
        return Err(ValidationError::AlarmNotInFuture);
    }
    Ok(alarm)
}

fn parse_amount(input: &str) -> Result<f64, ValidationError> {
    let invalid = || ValidationError::InvalidAmount(input.to_string());
    let amount = Decimal::from_str(input).map_err(|_| invalid())?;
    if amount <= Decimal::ZERO {
        return Err(invalid());
    }
    amount.to_f64().ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn valid_form() -> TransactionForm {
        TransactionForm {
            transaction_type: "Expense".to_string(),
            amount: "50.00".to_string(),
            category: "Food".to_string(),
            date: "05/03/2024".to_string(),
            note: " lunch ".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_transaction_success() {
        let tx = create_transaction(&valid_form(), now()).unwrap();

        assert_eq!(tx.transaction_type, TransactionType::Expense);
        assert_eq!(tx.amount, 50.0);
        assert_eq!(tx.category, "Food");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(tx.note.as_deref(), Some("lunch"));
        assert!(tx.alarm.is_none());
        assert!(tx.id.is_none());
    }

    #[test]
    fn test_create_transaction_blank_note_is_none() {
        let form = TransactionForm { note: "   ".to_string(), ..valid_form() };
        assert!(create_transaction(&form, now()).unwrap().note.is_none());
    }

    #[test]
    fn test_create_transaction_missing_fields() {
        let form = TransactionForm { amount: String::new(), ..valid_form() };
        assert_eq!(create_transaction(&form, now()), Err(ValidationError::MissingField("amount")));

        let form = TransactionForm { category: " ".to_string(), ..valid_form() };
        assert_eq!(create_transaction(&form, now()), Err(ValidationError::MissingField("category")));
    }

    #[test]
    fn test_create_transaction_invalid_amount() {
        let form = TransactionForm { amount: "abc".to_string(), ..valid_form() };
        assert_eq!(
            create_transaction(&form, now()),
            Err(ValidationError::InvalidAmount("abc".to_string()))
        );
    }

    #[test]
    fn test_create_transaction_rejects_non_finite_and_negative_amounts() {
        for amount in ["NaN", "inf", "-5", "0"] {
            let form = TransactionForm { amount: amount.to_string(), ..valid_form() };
            assert!(
                matches!(create_transaction(&form, now()), Err(ValidationError::InvalidAmount(_))),
                "{} should be rejected",
                amount
            );
        }
    }

    #[test]
    fn test_create_transaction_type_is_case_insensitive() {
        let form = TransactionForm { transaction_type: "income".to_string(), ..valid_form() };
        assert_eq!(create_transaction(&form, now()).unwrap().transaction_type, TransactionType::Income);

        let form = TransactionForm { transaction_type: "Transfer".to_string(), ..valid_form() };
        assert_eq!(
            create_transaction(&form, now()),
            Err(ValidationError::InvalidType("Transfer".to_string()))
        );
    }

    #[test]
    fn test_parse_date_format_and_calendar() {
        assert!(parse_date("29/02/2024").is_ok());
        assert_eq!(
            parse_date("2024-03-01"),
            Err(ValidationError::InvalidDateFormat("2024-03-01".to_string()))
        );
        assert_eq!(
            parse_date("5/3/2024"),
            Err(ValidationError::InvalidDateFormat("5/3/2024".to_string()))
        );
        assert_eq!(
            parse_date("31/02/2024"),
            Err(ValidationError::NonexistentDate("31/02/2024".to_string()))
        );
        assert_eq!(
            parse_date("29/02/2023"),
            Err(ValidationError::NonexistentDate("29/02/2023".to_string()))
        );
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("23:59").unwrap(), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
        assert!(matches!(parse_time("24:00"), Err(ValidationError::InvalidTimeFormat(_))));
        assert!(matches!(parse_time("9:30"), Err(ValidationError::InvalidTimeFormat(_))));
    }

    #[test]
    fn test_alarm_in_future_accepted() {
        let form = TransactionForm {
            alarm_enabled: true,
            alarm_date: "10/03/2024".to_string(),
            alarm_time: "12:01".to_string(),
            ..valid_form()
        };
        let alarm = create_transaction(&form, now()).unwrap().alarm.unwrap();
        assert_eq!(alarm.at(), now() + chrono::Duration::minutes(1));
    }

    #[test]
    fn test_alarm_in_past_rejected() {
        let form = TransactionForm {
            alarm_enabled: true,
            alarm_date: "01/03/2024".to_string(),
            alarm_time: "08:00".to_string(),
            ..valid_form()
        };
        assert_eq!(create_transaction(&form, now()), Err(ValidationError::AlarmNotInFuture));

        let form = TransactionForm { alarm_time: "12:00".to_string(), alarm_date: "10/03/2024".to_string(), ..form };
        assert_eq!(create_transaction(&form, now()), Err(ValidationError::AlarmNotInFuture));
    }

    #[test]
    fn test_alarm_missing_time_rejected() {
        let form = TransactionForm {
            alarm_enabled: true,
            alarm_date: "11/03/2024".to_string(),
            ..valid_form()
        };
        assert_eq!(create_transaction(&form, now()), Err(ValidationError::MissingField("alarm time")));
    }

    #[test]
    fn test_alarm_fields_ignored_when_disabled() {
        let form = TransactionForm {
            alarm_date: "garbage".to_string(),
            alarm_time: "garbage".to_string(),
            ..valid_form()
        };
        assert!(create_transaction(&form, now()).unwrap().alarm.is_none());
    }

    #[test]
    fn test_form_from_line_field_counts() {
        let form = TransactionForm::from_line("Income, 3000, Salary, 01/03/2024").unwrap();
        assert_eq!(form.category, "Salary");
        assert!(form.note.is_empty());

        let form = TransactionForm::from_line("Expense, 9, Food, 02/03/2024, snack, 03/03/2024, 10:00").unwrap();
        assert!(form.alarm_enabled);
        assert_eq!(form.alarm_time, "10:00");

        assert_eq!(
            TransactionForm::from_line("Expense, 9, Food").unwrap_err(),
            ValidationError::WrongFieldCount { expected: "4, 5 or 7", found: 3 }
        );
        assert!(TransactionForm::from_line("Expense, 9, Food, 02/03/2024, a, b").is_err());
    }

    #[test]
    fn test_add_transaction_to_db_success() {
        let conn = establish_test_connection().unwrap();

        let stored = add_transaction_to_db(&conn, "Expense, 50.00, Food, 05/03/2024, lunch").unwrap();

        let all = repository::get_all_transactions(&conn).unwrap();
        assert_eq!(all, vec![stored]);
    }

    #[test]
    fn test_add_transaction_to_db_invalid_amount_writes_nothing() {
        let conn = establish_test_connection().unwrap();

        let result = add_transaction_to_db(&conn, "Expense, abc, Food, 05/03/2024");

        assert!(matches!(result, Err(AppError::Validation(ValidationError::InvalidAmount(_)))));
        assert!(repository::get_all_transactions(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_add_transaction_to_db_past_alarm_writes_nothing() {
        let conn = establish_test_connection().unwrap();

        let result = add_transaction_to_db(&conn, "Expense, 5, Food, 05/03/2024, rent, 01/01/2000, 08:00");

        assert!(matches!(result, Err(AppError::Validation(ValidationError::AlarmNotInFuture))));
        assert!(repository::get_all_transactions(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_add_transaction_to_db_unknown_category() {
        let conn = establish_test_connection().unwrap();

        let result = add_transaction_to_db(&conn, "Expense, 5, Groceries, 05/03/2024");

        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::UnknownCategory(name))) if name == "Groceries"
        ));
    }

    #[test]
    fn test_add_transaction_to_db_duplicate() {
        let conn = establish_test_connection().unwrap();
        add_transaction_to_db(&conn, "Income, 3000, Salary, 01/03/2024").unwrap();

        let result = add_transaction_to_db(&conn, "Income, 3000.00, Salary, 01/03/2024");

        assert!(matches!(result, Err(AppError::Store(e)) if e.is_duplicate()));
        assert_eq!(repository::get_all_transactions(&conn).unwrap().len(), 1);
    }
}
