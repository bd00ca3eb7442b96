//! Command-line consumer of the worknotes data store.
//!
//! # Responsibility
//! - Construct and hydrate a `DataStore` explicitly, apply one command and
//!   print the resulting state.
//! - Report storage notices as warnings without failing the command.

use clap::{Parser, Subcommand};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::broadcast;
use worknotes_core::query::{
    insights, messages_chronological, recent_messages, resolve_employee_notes, top_employees,
};
use worknotes_core::{
    init_logging, AppConfig, CollectionStorage, DataStore, Employee, SqliteKeyValueStore,
    StoreNotice, StoreSnapshot,
};

const RECENT_MESSAGES_LIMIT: usize = 5;
const TOP_EMPLOYEES_LIMIT: usize = 3;

#[derive(Debug, Parser)]
#[command(name = "worknotes", version, about = "Chat messages with per-employee notes")]
struct Cli {
    /// SQLite database file (overrides WORKNOTES_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log level (overrides WORKNOTES_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute log directory (overrides WORKNOTES_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Post a chat message.
    AddMessage { text: String },
    /// Create an employee, optionally with a first note.
    AddEmployee {
        name: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Attach a message to an employee as a note.
    Attach { employee: String, message: String },
    /// Rename an employee.
    Rename { employee: String, name: String },
    /// Remove a note from an employee.
    Detach { employee: String, message: String },
    /// List messages (oldest first) and employees.
    List,
    /// Show one employee with resolved notes.
    Show { employee: String },
    /// Print summary counters.
    Insights,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(db) = cli.db {
        config = config.with_db_path(db);
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(dir) = cli.log_dir {
        config.log_dir = Some(dir);
    }

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let kv = match SqliteKeyValueStore::open(&config.db_path) {
        Ok(kv) => kv,
        Err(err) => {
            error!("event=cli_open module=cli status=error error={err}");
            eprintln!("error: cannot open {}: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };

    let store = DataStore::new(CollectionStorage::new(Arc::new(kv)));
    let mut notices = store.notices();
    store.reload().await;

    run(&store, cli.command);

    store.close().await;
    drain_notices(&mut notices);
    ExitCode::SUCCESS
}

fn run(store: &DataStore, command: Command) {
    match command {
        Command::AddMessage { text } => match store.add_message(&text) {
            Some(message) => println!("{}", message.id),
            None => eprintln!("nothing to send: message is empty"),
        },
        Command::AddEmployee { name, note } => match store.add_employee(&name, note.as_deref()) {
            Some(employee) => println!("{}", employee.id),
            None => eprintln!("name is required"),
        },
        Command::Attach { employee, message } => {
            store.attach_note_to_employee(&employee, &message);
            print_employee(&store.snapshot(), &employee);
        }
        Command::Rename { employee, name } => {
            if name.trim().is_empty() {
                eprintln!("name is required; keeping the current one");
            }
            store.update_employee_name(&employee, &name);
            print_employee(&store.snapshot(), &employee);
        }
        Command::Detach { employee, message } => {
            store.remove_note_from_employee(&employee, &message);
            print_employee(&store.snapshot(), &employee);
        }
        Command::List => {
            let snapshot = store.snapshot();
            println!("messages:");
            for message in messages_chronological(&snapshot.messages) {
                println!(
                    "  {}  {}  {}",
                    message.id,
                    message.created_at.format("%Y-%m-%d %H:%M"),
                    message.text
                );
            }
            println!("employees:");
            for employee in snapshot.employees.iter() {
                println!("  {}", employee_line(employee));
            }
        }
        Command::Show { employee } => print_employee(&store.snapshot(), &employee),
        Command::Insights => {
            let snapshot = store.snapshot();
            let summary = insights(&snapshot);
            println!(
                "{} messages, {} employees, {} notes ({} references)",
                summary.message_count,
                summary.employee_count,
                summary.distinct_note_count,
                summary.note_reference_count
            );
            println!("recent:");
            for message in recent_messages(&snapshot.messages, RECENT_MESSAGES_LIMIT) {
                println!("  {}", message.text);
            }
            println!("most noted:");
            for employee in top_employees(&snapshot.employees, TOP_EMPLOYEES_LIMIT) {
                println!("  {}", employee_line(employee));
            }
        }
    }
}

fn print_employee(snapshot: &StoreSnapshot, employee_id: &str) {
    let Some(employee) = snapshot.find_employee(employee_id) else {
        eprintln!("employee not found: {employee_id}");
        return;
    };
    println!("{}", employee_line(employee));
    for message in resolve_employee_notes(employee, &snapshot.messages) {
        println!("  - {}  {}", message.id, message.text);
    }
}

fn employee_line(employee: &Employee) -> String {
    let count = employee.notes.len();
    let noun = if count == 1 { "note" } else { "notes" };
    format!("{}  {}  ({count} {noun})", employee.id, employee.name)
}

fn drain_notices(notices: &mut broadcast::Receiver<StoreNotice>) {
    while let Ok(notice) = notices.try_recv() {
        eprintln!("warning: {} ({})", notice.user_message(), notice_detail(&notice));
    }
}

fn notice_detail(notice: &StoreNotice) -> &str {
    match notice {
        StoreNotice::LoadFailed { message, .. } | StoreNotice::SaveFailed { message, .. } => {
            message
        }
    }
}
