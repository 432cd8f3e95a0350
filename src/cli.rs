//! CLI definition and dispatch.

use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::csv_export_adapter::export_trades_csv;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::file_replica_adapter::FileReplicaAdapter;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::calendar::{month_calendar, DayOutcome, MonthCalendar};
use crate::domain::config_validation::{
    validate_storage_config, validate_sync_config, SyncBackend,
};
use crate::domain::error::AlphaTrackError;
use crate::domain::journal::JournalDraft;
use crate::domain::ledger_store::LedgerStore;
use crate::domain::metrics::{recent_trades, TradeStats};
use crate::domain::review::{PeriodReview, ReviewPeriod};
use crate::domain::sync::SyncReconciler;
use crate::domain::trade::{Trade, TradeDraft};
use crate::logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;
use crate::ports::storage_port::LocalStoragePort;

#[derive(Parser, Debug)]
#[command(name = "alphatrack", about = "Trading journal with stats and optional sync")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true, default_value = "alphatrack.ini")]
    pub config: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record, edit and list trades
    Trade {
        #[command(subcommand)]
        action: TradeAction,
    },
    /// Manage the pre-trade checklist
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Write and browse journal entries
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },
    /// Print trade statistics
    Stats {
        /// How many recent trades to show
        #[arg(long, default_value_t = 5)]
        recent: usize,
    },
    /// Print a month of daily net P/L
    Calendar {
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Export all trades as CSV
    Export {
        #[arg(short, long, default_value = "AlphaTrack_Export.csv")]
        output: PathBuf,
    },
    /// Write a daily, weekly or monthly review as a Typst document
    Report {
        period: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Talk to the remote replica directly
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
    /// Sync under the given user id from now on
    Login { uid: String },
    /// Forget the stored user id
    Logout,
}

#[derive(Args, Debug, Default)]
pub struct TradeFields {
    /// Trade date as YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub asset: Option<String>,
    /// forex or stock
    #[arg(long = "type")]
    pub asset_type: Option<String>,
    /// long or short; "-" clears it
    #[arg(long)]
    pub side: Option<String>,
    #[arg(long)]
    pub entry: Option<String>,
    #[arg(long)]
    pub exit: Option<String>,
    /// Gross profit or loss
    #[arg(long, allow_hyphen_values = true)]
    pub pl: Option<String>,
    #[arg(long)]
    pub commission: Option<String>,
    #[arg(long)]
    pub reason: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TradeAction {
    Add(TradeFields),
    Edit {
        id: u64,
        #[command(flatten)]
        fields: TradeFields,
    },
    Delete { id: u64 },
    List,
}

#[derive(Subcommand, Debug)]
pub enum TaskAction {
    Add { text: String },
    Toggle { id: u64 },
    Edit { id: u64, text: String },
    Delete { id: u64 },
    List,
}

#[derive(Subcommand, Debug)]
pub enum JournalAction {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "")]
        content: String,
    },
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    Delete { id: u64 },
    List,
}

#[derive(Subcommand, Debug)]
pub enum SyncAction {
    /// Replace the local ledger with the remote copy
    Pull,
    /// Merge the local ledger into the remote copy and wait for it
    Push,
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn execute(cli: Cli) -> Result<(), AlphaTrackError> {
    let config = load_config(&cli.config)?;
    if let Err(e) = logging::init_tracing(config.get_non_empty("log", "filter")) {
        eprintln!("warning: {e}");
    }

    let mut store = open_store(&config)?;
    let today = today();

    match cli.command {
        Command::Trade { action } => run_trade(&mut store, action, today)?,
        Command::Task { action } => run_task(&mut store, action)?,
        Command::Journal { action } => run_journal(&mut store, action, today)?,
        Command::Stats { recent } => print_stats(&store, recent),
        Command::Calendar { month } => {
            let (year, month) = match month {
                Some(m) => parse_month(&m)?,
                None => (today.year(), today.month()),
            };
            let calendar = month_calendar(store.trades(), year, month)
                .ok_or_else(|| AlphaTrackError::validation("month", "no such month"))?;
            print!("{}", render_calendar(&calendar));
        }
        Command::Export { output } => {
            export_trades_csv(store.trades(), &output)?;
            eprintln!("Exported {} trades to {}", store.trades().len(), output.display());
        }
        Command::Report { period, output } => {
            let period: ReviewPeriod = period.parse()?;
            let output = output
                .unwrap_or_else(|| PathBuf::from(format!("AlphaTrack_{period}_Review.typ")));
            let review = PeriodReview::build(period, store.ledger(), today);
            TypstReportAdapter::from_config(&config).write(&review, &output)?;
            eprintln!("Report written to: {}", output.display());
        }
        Command::Sync { action } => match action {
            SyncAction::Pull => {
                if store.pull()? {
                    eprintln!("Local ledger replaced by the remote copy");
                } else {
                    eprintln!("Nothing pulled (no remote copy, or sync unavailable)");
                }
            }
            SyncAction::Push => {
                store.push_now()?;
                eprintln!("Ledger pushed");
            }
        },
        Command::Login { uid } => {
            store.set_identity(&uid)?;
            eprintln!("Signed in as {}", uid.trim());
            if store.pull()? {
                eprintln!("Loaded ledger from the remote copy");
            }
        }
        Command::Logout => {
            store.clear_identity()?;
            eprintln!("Signed out");
        }
    }

    store.sync().wait_idle();
    Ok(())
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, AlphaTrackError> {
    FileConfigAdapter::from_file(path)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Build the reconciler for the configured `[sync] backend`.
pub fn build_sync_reconciler(config: &dyn ConfigPort) -> Result<SyncReconciler, AlphaTrackError> {
    match validate_sync_config(config)? {
        SyncBackend::None => Ok(SyncReconciler::disabled()),
        SyncBackend::File => Ok(SyncReconciler::new(Arc::new(
            FileReplicaAdapter::from_config(config)?,
        ))),
        SyncBackend::Postgres => postgres_reconciler(config),
    }
}

#[cfg(feature = "postgres")]
fn postgres_reconciler(config: &dyn ConfigPort) -> Result<SyncReconciler, AlphaTrackError> {
    use crate::adapters::postgres_replica_adapter::PostgresReplicaAdapter;

    Ok(SyncReconciler::new(Arc::new(
        PostgresReplicaAdapter::from_config(config)?,
    )))
}

#[cfg(not(feature = "postgres"))]
fn postgres_reconciler(_config: &dyn ConfigPort) -> Result<SyncReconciler, AlphaTrackError> {
    Err(AlphaTrackError::ConfigInvalid {
        section: "sync".into(),
        key: "backend".into(),
        reason: "postgres feature is required for the postgres backend".into(),
    })
}

#[cfg(feature = "sqlite")]
pub fn open_local_storage(
    config: &dyn ConfigPort,
) -> Result<Box<dyn LocalStoragePort>, AlphaTrackError> {
    use crate::adapters::sqlite_storage_adapter::SqliteStorageAdapter;

    Ok(Box::new(SqliteStorageAdapter::from_config(config)?))
}

#[cfg(not(feature = "sqlite"))]
pub fn open_local_storage(
    _config: &dyn ConfigPort,
) -> Result<Box<dyn LocalStoragePort>, AlphaTrackError> {
    Err(AlphaTrackError::Storage {
        reason: "sqlite feature is required for local storage".into(),
    })
}

/// Validate the config, open local storage and load the ledger (pulling
/// from the remote replica when one is configured).
pub fn open_store(config: &dyn ConfigPort) -> Result<LedgerStore, AlphaTrackError> {
    validate_storage_config(config)?;
    let sync = build_sync_reconciler(config)?;
    let storage = open_local_storage(config)?;
    LedgerStore::load(storage, sync)
}

/// Draft for `trade add`: unset date means today, other unset fields are
/// left blank for validation to reject.
pub fn new_trade_draft(fields: TradeFields, today: NaiveDate) -> TradeDraft {
    TradeDraft {
        date: fields
            .date
            .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
        asset: fields.asset.unwrap_or_default(),
        asset_type: fields.asset_type.unwrap_or_default(),
        side: fields.side,
        entry: fields.entry.unwrap_or_default(),
        exit: fields.exit.unwrap_or_default(),
        pl: fields.pl.unwrap_or_default(),
        commission: fields.commission,
        reason: fields.reason,
    }
}

/// Draft for `trade edit`: the stored trade with the given fields replaced.
pub fn edited_trade_draft(existing: &Trade, fields: TradeFields) -> TradeDraft {
    let mut draft = TradeDraft::from(existing);
    if let Some(date) = fields.date {
        draft.date = date;
    }
    if let Some(asset) = fields.asset {
        draft.asset = asset;
    }
    if let Some(asset_type) = fields.asset_type {
        draft.asset_type = asset_type;
    }
    if fields.side.is_some() {
        draft.side = fields.side;
    }
    if let Some(entry) = fields.entry {
        draft.entry = entry;
    }
    if let Some(exit) = fields.exit {
        draft.exit = exit;
    }
    if let Some(pl) = fields.pl {
        draft.pl = pl;
    }
    if fields.commission.is_some() {
        draft.commission = fields.commission;
    }
    if fields.reason.is_some() {
        draft.reason = fields.reason;
    }
    draft
}

fn run_trade(
    store: &mut LedgerStore,
    action: TradeAction,
    today: NaiveDate,
) -> Result<(), AlphaTrackError> {
    match action {
        TradeAction::Add(fields) => {
            let id = store.add_trade(&new_trade_draft(fields, today))?;
            eprintln!("Added trade {id}");
        }
        TradeAction::Edit { id, fields } => {
            let existing = store.ledger().trade(id).cloned().ok_or(AlphaTrackError::NotFound {
                kind: crate::domain::error::EntryKind::Trade,
                id,
            })?;
            store.update_trade(id, &edited_trade_draft(&existing, fields))?;
            eprintln!("Updated trade {id}");
        }
        TradeAction::Delete { id } => {
            let removed = store.delete_trade(id)?;
            eprintln!("Deleted trade {id} ({} on {})", removed.asset, removed.date);
        }
        TradeAction::List => {
            for trade in store.trades().iter().rev() {
                println!("{}", format_trade_line(trade));
            }
        }
    }
    Ok(())
}

fn run_task(store: &mut LedgerStore, action: TaskAction) -> Result<(), AlphaTrackError> {
    match action {
        TaskAction::Add { text } => {
            let id = store.add_task(&text)?;
            eprintln!("Added task {id}");
        }
        TaskAction::Toggle { id } => {
            let completed = store.toggle_task(id)?;
            eprintln!(
                "Task {id} marked {}",
                if completed { "done" } else { "not done" }
            );
        }
        TaskAction::Edit { id, text } => {
            store.edit_task(id, &text)?;
            eprintln!("Updated task {id}");
        }
        TaskAction::Delete { id } => {
            store.delete_task(id)?;
            eprintln!("Deleted task {id}");
        }
        TaskAction::List => {
            for task in store.tasks() {
                let mark = if task.completed { "x" } else { " " };
                println!("{:>4}  [{mark}] {}", task.id, task.text);
            }
        }
    }
    Ok(())
}

fn run_journal(
    store: &mut LedgerStore,
    action: JournalAction,
    today: NaiveDate,
) -> Result<(), AlphaTrackError> {
    match action {
        JournalAction::Add {
            title,
            date,
            content,
        } => {
            let draft = JournalDraft {
                title,
                date: date.unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
                content,
            };
            let id = store.add_journal(&draft)?;
            eprintln!("Added journal entry {id}");
        }
        JournalAction::Edit {
            id,
            title,
            date,
            content,
        } => {
            let existing =
                store
                    .ledger()
                    .journal_entry(id)
                    .ok_or(AlphaTrackError::NotFound {
                        kind: crate::domain::error::EntryKind::Journal,
                        id,
                    })?;
            let mut draft = JournalDraft::from(existing);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(date) = date {
                draft.date = date;
            }
            if let Some(content) = content {
                draft.content = content;
            }
            store.update_journal(id, &draft)?;
            eprintln!("Updated journal entry {id}");
        }
        JournalAction::Delete { id } => {
            store.delete_journal(id)?;
            eprintln!("Deleted journal entry {id}");
        }
        JournalAction::List => {
            for entry in store.journal() {
                println!("{:>4}  {}  {}", entry.id, entry.date, entry.title);
                for line in entry.content.lines() {
                    println!("        {line}");
                }
            }
        }
    }
    Ok(())
}

pub fn format_money(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", value.abs())
    } else {
        format!("${value:.2}")
    }
}

fn format_trade_line(trade: &Trade) -> String {
    format!(
        "{:>4}  {}  {:<10} {:<6} {:<5} {:>10} -> {:<10} net {:>12}  {}",
        trade.id,
        trade.date,
        trade.asset,
        trade.asset_type,
        trade.side.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
        trade.entry,
        trade.exit,
        format_money(trade.net_pl()),
        trade.reason
    )
}

pub fn render_stats(stats: &TradeStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total Trades:     {}\n", stats.total_trades));
    out.push_str(&format!("Gross P/L:        {}\n", format_money(stats.gross_pl)));
    out.push_str(&format!(
        "Commission:       {}\n",
        format_money(stats.total_commission)
    ));
    out.push_str(&format!("Net P/L:          {}\n", format_money(stats.net_pl)));
    out.push_str(&format!("Win Rate:         {:.1}%\n", stats.win_rate * 100.0));
    out.push_str(&format!("Profit Factor:    {}\n", stats.profit_factor));
    out.push_str(&format!("Avg Win:          {}\n", format_money(stats.avg_win)));
    out.push_str(&format!("Avg Loss:         {}\n", format_money(stats.avg_loss)));
    out.push_str(&format!(
        "Max Drawdown:     {}\n",
        format_money(stats.max_drawdown)
    ));
    out.push_str(&format!(
        "Checklist:        {}/{} done\n",
        stats.tasks_completed, stats.tasks_total
    ));
    out
}

fn print_stats(store: &LedgerStore, recent: usize) {
    print!("{}", render_stats(&store.stats()));

    let latest = recent_trades(store.trades(), recent);
    if !latest.is_empty() {
        println!("\n=== Recent Trades ===");
        for trade in latest {
            println!("{}", format_trade_line(trade));
        }
    }
}

pub fn parse_month(raw: &str) -> Result<(i32, u32), AlphaTrackError> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map_err(|_| AlphaTrackError::validation("month", format!("expected YYYY-MM, got {raw:?}")))?;
    Ok((first.year(), first.month()))
}

/// Sunday-first month grid: one row of day numbers and one row of rounded
/// net P/L per week. Profitable days are marked `+`, losing days `-`.
pub fn render_calendar(calendar: &MonthCalendar) -> String {
    const CELL: usize = 8;

    let title = NaiveDate::from_ymd_opt(calendar.year, calendar.month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_default();
    let mut out = format!("{title}\n");
    for name in ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"] {
        out.push_str(&format!("{name:>w$}", w = CELL));
    }
    out.push('\n');

    let blanks = calendar.leading_blanks as usize;
    let mut cells: Vec<Option<&crate::domain::calendar::CalendarDay>> = vec![None; blanks];
    cells.extend(calendar.days.iter().map(Some));

    for week in cells.chunks(7) {
        let mut days = String::new();
        let mut pls = String::new();
        for cell in week {
            match cell {
                Some(day) => {
                    let marker = match day.outcome {
                        DayOutcome::Profit => "+",
                        DayOutcome::Loss => "-",
                        DayOutcome::Flat => " ",
                    };
                    days.push_str(&format!("{:>w$}{marker}", day.date.day(), w = CELL - 1));
                    let pl = if day.net_pl != 0.0 {
                        format!("{:.0}", day.net_pl)
                    } else {
                        String::new()
                    };
                    pls.push_str(&format!("{pl:>w$}", w = CELL));
                }
                None => {
                    days.push_str(&" ".repeat(CELL));
                    pls.push_str(&" ".repeat(CELL));
                }
            }
        }
        out.push_str(days.trim_end());
        out.push('\n');
        out.push_str(pls.trim_end());
        out.push('\n');
    }
    out
}
