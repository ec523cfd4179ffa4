//! travel-ledger - record and review trip expenses from the command line
//!
//! Every command opens the ledger from the data directory, applies at most
//! one change (which is saved before the command exits) and prints the result.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use log::{error, info};
use shared::{format_currency, Category, CategoryFilter, Currency, ExpenseForm};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use travel_ledger::backend::domain::{DeleteConfirmation, ExpenseRecord, LedgerError, LedgerStatistics};
use travel_ledger::backend::storage::{FileConnection, LedgerConfigRepository};
use travel_ledger::Backend;

#[derive(Parser)]
#[command(name = "travel-ledger")]
#[command(about = "Travel expense ledger with statistics and export", long_about = None)]
struct Cli {
    /// Directory holding the ledger and its config
    #[arg(long, global = true, env = "TRAVEL_LEDGER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add an expense
    Add(AddArgs),

    /// Edit an expense; fields not given keep their current value
    Edit(EditArgs),

    /// Delete an expense
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List expenses, most recent first
    List {
        /// Category tag (transportation, accommodation, food, shopping, activity, other) or "all"
        #[arg(short, long, default_value = "all")]
        category: CategoryFilter,
    },

    /// Show totals and the daily average
    Stats,

    /// Write the ledger to <prefix>_<date>.csv
    Export {
        /// Target directory (default: Documents)
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Show the active configuration and where it is stored
    Config,
}

#[derive(clap::Args)]
struct AddArgs {
    /// Date as YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<String>,

    #[arg(short, long)]
    category: String,

    #[arg(short, long)]
    description: String,

    /// card or cash
    #[arg(short, long, default_value = "card")]
    payment: String,

    #[arg(short, long)]
    amount: String,

    #[arg(long, default_value = "KRW")]
    currency: String,
}

#[derive(clap::Args)]
struct EditArgs {
    id: String,

    #[arg(long)]
    date: Option<String>,

    #[arg(short, long)]
    category: Option<String>,

    #[arg(short, long)]
    description: Option<String>,

    #[arg(short, long)]
    payment: Option<String>,

    #[arg(short, long)]
    amount: Option<String>,

    #[arg(long)]
    currency: Option<String>,
}

impl AddArgs {
    /// Amounts are passed through as typed so the validator sees signs and
    /// exponents instead of silently dropping them
    fn into_form(self) -> ExpenseForm {
        ExpenseForm {
            date: self
                .date
                .unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string()),
            category: self.category,
            description: self.description,
            payment: self.payment,
            amount: self.amount,
            currency: self.currency.to_uppercase(),
        }
    }
}

impl EditArgs {
    /// Overlay the given fields on the pre-filled form
    fn apply_to(self, mut form: ExpenseForm) -> ExpenseForm {
        if let Some(date) = self.date {
            form.date = date;
        }
        if let Some(category) = self.category {
            form.category = category;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(payment) = self.payment {
            form.payment = payment;
        }
        if let Some(amount) = self.amount {
            form.amount = amount;
        }
        if let Some(currency) = self.currency {
            form.currency = currency.to_uppercase();
        }
        form
    }
}

/// Asks on stdin before deleting
struct PromptConfirmation;

impl DeleteConfirmation for PromptConfirmation {
    fn confirm_delete(&self, expense: &ExpenseRecord) -> bool {
        print!(
            "{} {} {} - 정말로 이 지출 내역을 삭제하시겠습니까? [y/N] ",
            expense.date.format("%Y-%m-%d"),
            expense.description,
            format_currency(expense.amount, &expense.currency)
        );
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

struct AlwaysConfirm;

impl DeleteConfirmation for AlwaysConfirm {
    fn confirm_delete(&self, _expense: &ExpenseRecord) -> bool {
        true
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Config => show_config(cli.data_dir),
        command => run_ledger_command(cli.data_dir, command),
    }
}

fn run_ledger_command(data_dir: Option<PathBuf>, command: Command) -> Result<()> {
    let mut backend = Backend::open(data_dir.as_deref()).context("Failed to open the ledger")?;

    match command {
        Command::Add(args) => {
            let submission = backend.expense_service.submit(&args.into_form())?;
            println!("{} ({})", submission.success_message(), submission.record().id);
        }
        Command::Edit(args) => {
            let form = backend.expense_service.begin_edit(&args.id)?;
            let form = args.apply_to(form);
            let submission = backend.expense_service.submit(&form)?;
            println!("{}", submission.success_message());
        }
        Command::Delete { id, yes } => {
            let confirmation: &dyn DeleteConfirmation = if yes { &AlwaysConfirm } else { &PromptConfirmation };
            match backend.expense_service.delete(&id, confirmation) {
                Ok(removed) => println!("지출 내역을 삭제했습니다. ({})", removed.description),
                Err(LedgerError::DeleteDeclined) => {
                    println!("삭제를 취소했습니다.");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::List { category } => {
            backend.expense_service.set_filter(category);
            print_rows(&backend, category);
        }
        Command::Stats => print_statistics(&backend.statistics()),
        Command::Export { dir } => {
            let written = backend.export_to_path(dir.as_deref())?;
            println!("{} ({}건)", written.file_path.display(), written.record_count);
        }
        Command::Config => return show_config(data_dir),
    }

    if backend.expense_service.last_persist_failed() {
        eprintln!("경고: 변경 내용을 저장하지 못했습니다.");
    }
    info!("Done");
    Ok(())
}

fn show_config(data_dir: Option<PathBuf>) -> Result<()> {
    let connection = match data_dir {
        Some(dir) => FileConnection::new(dir)?,
        None => FileConnection::new_default()?,
    };
    let repository = LedgerConfigRepository::new(connection.clone());
    let config = repository.load_or_create()?;

    println!("# data directory: {}", connection.base_directory().display());
    println!("# config file:    {}", repository.config_path().display());
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}

fn print_rows(backend: &Backend, filter: CategoryFilter) {
    let rows = backend.expense_service.visible_rows();
    println!("[{}] {}건", filter.display_name(), rows.len());
    for row in rows {
        println!(
            "{}  {}  {:<4}  {:<24}  {:<2}  {:>14}",
            row.id, row.date, row.category_name, row.description, row.payment_name, row.formatted_amount
        );
    }
}

fn print_statistics(stats: &LedgerStatistics) {
    println!("총 지출:   {}", format_currency(stats.total_expenses, &Currency::Krw));
    println!("여행 일수: {}일", stats.total_days);
    println!("일 평균:   {}", format_currency(stats.average_daily, &Currency::Krw));

    if !stats.total_by_category.is_empty() {
        println!();
        for category in Category::ALL {
            if let Some(total) = stats.total_by_category.get(&category) {
                println!("{:<4} {}", category.display_name(), group_amount(*total));
            }
        }
    }

    if !stats.total_by_currency.is_empty() {
        println!();
        for (currency, total) in &stats.total_by_currency {
            println!("{:<4} {}", currency.code(), format_currency(*total, currency));
        }
    }
}

/// Category totals mix currencies, so they are shown without a symbol
fn group_amount(amount: f64) -> String {
    let formatted = format_currency(amount, &Currency::Krw);
    formatted.trim_start_matches('₩').to_string()
}
