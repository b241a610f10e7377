mod db;
mod error;
mod models;
mod operations;
mod settings;

use clap::Parser;
use error::AppError;
use models::summary::IncomeExpense;
use operations::add::add_transaction_to_db;
use operations::categories::{add_category_db, delete_category_db, list_categories_db};
use operations::history::{ALL, HistoryFilter, transaction_history};
use operations::import::{ImportFormat, import_transactions_to_db};
use operations::summary::{monthly_report, overall_summary, parse_month_year};
use rusqlite::Connection;
use settings::Settings;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

static APP_NAME: &str = "budget-tracker";

#[derive(Debug, Parser)]
#[command(name = "budget", version, about = "Records income and expenses and summarises them by month")]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,
    /// Database file to use instead of the configured one
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

pub enum UserCommands {
    Add,
    Import,
    Print,
    History,
    Report,
    Summary,
    Categories,
    AddCategory,
    RemoveCategory,
    Reset,
    Help,
    Exit,
    Unknown,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = match Settings::new(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "failed to load settings");
            println!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let db_path = cli.db.unwrap_or_else(|| PathBuf::from(&settings.db_file));

    let conn = match db::connection::establish_connection(&db_path) {
        Ok(conn) => conn,
        Err(e) => {
            error!(path = %db_path.display(), error = %e, "failed to open database");
            println!("Could not open the budget database at {}: {}", db_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    println!("Welcome to the budget tracker! Type 'help' for the list of commands.");
    print_summary(&conn, &settings.currency);

    loop {
        println!("Please enter a command (add, import, print, history, report, summary, categories, add-category, remove-category, reset, help, exit):");

        let input = match read_user_input() {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("Error reading input: {}", e);
                continue;
            }
        };
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        match check_for_command(parts[0]) {
            UserCommands::Add => {
                println!("Enter transaction details in the format:\ntype(Income/Expense), amount, category, date(dd/MM/yyyy)[, note[, reminder date(dd/MM/yyyy), reminder time(HH:mm)]]");
                let Some(details) = prompt() else { continue };
                match add_transaction_to_db(&conn, &details) {
                    Ok(transaction) => {
                        println!("Transaction saved.");
                        if let Some(reminder) = transaction.reminder() {
                            println!(
                                "{} set for {}: {}",
                                reminder.title,
                                reminder.at.format("%d/%m/%Y %H:%M"),
                                reminder.message
                            );
                        }
                        print_summary(&conn, &settings.currency);
                    }
                    Err(e) => {
                        println!("Error saving transaction: {}", e);
                        println!("Please try again.");
                    }
                }
            }
            UserCommands::Import => {
                println!("Enter the path of the CSV file to import (type,amount,category,date[,note] per line):");
                let Some(path) = prompt() else { continue };
                match import_transactions_to_db(&conn, ImportFormat::CSV, &path) {
                    Ok(summary) => {
                        println!(
                            "Imported {} transactions, skipped {} duplicates.",
                            summary.imported, summary.duplicates
                        );
                        print_summary(&conn, &settings.currency);
                    }
                    Err(e) => println!("Error importing transactions: {}", e),
                }
            }
            UserCommands::Print => {
                print_history(&conn, &HistoryFilter::default());
            }
            UserCommands::History => {
                if let Ok(names) = db::category_repository::get_all_category_names(&conn) {
                    println!("Categories: {}", names.join(", "));
                }
                println!("Enter filters as: type, category, date (use '{}' or leave empty for no filter):", ALL);
                let Some(details) = prompt() else { continue };
                let fields: Vec<&str> = details.split(',').collect();
                let field = |i: usize| fields.get(i).copied().unwrap_or("");
                let filter = HistoryFilter::from_inputs(field(0), field(1), field(2));
                print_history(&conn, &filter);
            }
            UserCommands::Report => {
                let (month, year) = match (parts.get(1), parts.get(2)) {
                    (Some(month), Some(year)) => (month.to_string(), year.to_string()),
                    _ => {
                        println!("Enter month and year (MM YYYY):");
                        let Some(details) = prompt() else { continue };
                        let mut fields = details.split_whitespace();
                        (
                            fields.next().unwrap_or("").to_string(),
                            fields.next().unwrap_or("").to_string(),
                        )
                    }
                };
                if let Err(e) = print_report(&conn, &month, &year, &settings.currency) {
                    println!("Error building report: {}", e);
                }
            }
            UserCommands::Summary => print_summary(&conn, &settings.currency),
            UserCommands::Categories => match list_categories_db(&conn) {
                Ok(categories) => {
                    for category in categories {
                        println!("  {}", category.name);
                    }
                }
                Err(e) => println!("Error listing categories: {}", e),
            },
            UserCommands::AddCategory => {
                println!("Enter the new category name:");
                let Some(name) = prompt() else { continue };
                match add_category_db(&conn, &name) {
                    Ok(_) => println!("Category added."),
                    Err(AppError::Store(e)) if e.is_duplicate() => {
                        println!("Error: category already exists.")
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            UserCommands::RemoveCategory => {
                println!("Enter the category name to remove:");
                let Some(name) = prompt() else { continue };
                match delete_category_db(&conn, &name) {
                    Ok(true) => println!("Category removed. Existing transactions keep their category."),
                    Ok(false) => println!("No category named '{}'.", name),
                    Err(e) => println!("Error: {}", e),
                }
            }
            UserCommands::Reset => {
                println!("This deletes every transaction and custom category. Type 'yes' to confirm:");
                let Some(answer) = prompt() else { continue };
                if answer != "yes" {
                    println!("Reset cancelled.");
                    continue;
                }
                match db::connection::reset(&conn) {
                    Ok(()) => println!("All data removed, default categories restored."),
                    Err(e) => println!("Error resetting database: {}", e),
                }
            }
            UserCommands::Help => print_help(),
            UserCommands::Exit => {
                println!("Exiting the application.");
                break;
            }
            UserCommands::Unknown => println!("Unknown command '{}'. Type 'help' for the list of commands.", parts[0]),
        }
    }

    ExitCode::SUCCESS
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();
}

fn read_user_input() -> Result<String, String> {
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|_| "Failed to read line".to_string())?;
    Ok(input.trim().to_string())
}

fn prompt() -> Option<String> {
    match read_user_input() {
        Ok(details) => Some(details),
        Err(e) => {
            println!("Error reading input: {}", e);
            None
        }
    }
}

fn check_for_command(input: &str) -> UserCommands {
    match input {
        "add" => UserCommands::Add,
        "import" => UserCommands::Import,
        "print" => UserCommands::Print,
        "history" => UserCommands::History,
        "report" => UserCommands::Report,
        "summary" => UserCommands::Summary,
        "categories" => UserCommands::Categories,
        "add-category" => UserCommands::AddCategory,
        "remove-category" => UserCommands::RemoveCategory,
        "reset" => UserCommands::Reset,
        "help" => UserCommands::Help,
        "exit" | "quit" => UserCommands::Exit,
        _ => UserCommands::Unknown,
    }
}

fn print_help() {
    println!("  add              record an income or expense");
    println!("  import           load transactions from a CSV file");
    println!("  print            list every transaction, newest first");
    println!("  history          list transactions filtered by type, category and date");
    println!("  report [MM YYYY] income and expense per category for one month");
    println!("  summary          total income, expenses and balance");
    println!("  categories       list categories");
    println!("  add-category     create a category");
    println!("  remove-category  delete a category");
    println!("  reset            delete all data");
    println!("  exit             leave");
}

fn print_summary(conn: &Connection, currency: &str) {
    match overall_summary(conn) {
        Ok(totals) => print_totals(&totals, currency),
        Err(e) => println!("Error computing totals: {}", e),
    }
}

fn print_totals(totals: &IncomeExpense, currency: &str) {
    println!(
        "Income: {:.2} {c} | Expenses: {:.2} {c} | Balance: {:.2} {c}",
        totals.income,
        totals.expense,
        totals.balance(),
        c = currency
    );
}

fn print_history(conn: &Connection, filter: &HistoryFilter) {
    match transaction_history(conn, filter) {
        Ok(transactions) if transactions.is_empty() => println!("No transactions found."),
        Ok(transactions) => {
            for transaction in transactions {
                println!("  #{} {}", transaction.id.unwrap_or_default(), transaction);
            }
        }
        Err(e) => println!("Error loading transactions: {}", e),
    }
}

fn print_report(conn: &Connection, month: &str, year: &str, currency: &str) -> Result<(), AppError> {
    let (month, year) = parse_month_year(month, year)?;
    let report = monthly_report(conn, month, year)?;

    let entries: i64 = report.rows.iter().map(|row| row.count).sum();
    println!("Report for {:02}/{:04} ({} transactions)", report.month, report.year, entries);
    println!("Incomes:");
    for (category, total) in &report.income_by_category {
        println!("  {:15} {:>12.2} {}", category, total, currency);
    }
    println!("Expenses:");
    for (category, total) in &report.expense_by_category {
        println!("  {:15} {:>12.2} {}", category, total, currency);
    }
    print_totals(&report.totals, currency);

    let overall = report.totals.income + report.totals.expense;
    if overall > 0.0 {
        println!(
            "Share: {:.1}% expenses / {:.1}% income",
            report.totals.expense / overall * 100.0,
            report.totals.income / overall * 100.0
        );
    }
    Ok(())
}
