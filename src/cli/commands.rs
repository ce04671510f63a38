use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::config::{ConfigManager, TrackerConfig};
use crate::core::{Clock, SessionStart, SystemClock, TransactionStore, UuidGenerator};
use crate::errors::{Result, TrackerError};
use crate::ledger::{
    category, MonthFilter, NewTransaction, TransactionKind, TransactionPatch, YearMonth,
};
use crate::storage::{file_backend::write_file_atomic, FileStore, Persistence};
use crate::transfer::{self, ImportFormat, ImportOutcome};
use crate::utils::{self, build_info, paths};

use super::io;
use super::output::{self, OutputPreferences};

const BAR_WIDTH: usize = 20;

/// Runs one command taken from the process arguments.
pub fn run_cli() -> Result<()> {
    run(env::args().skip(1).collect())
}

pub fn run(mut args: Vec<String>) -> Result<()> {
    if args.is_empty() {
        print_usage();
        return Err(TrackerError::InvalidInput("missing command".into()));
    }
    let command = args.remove(0);
    match command.as_str() {
        "help" | "--help" | "-h" => {
            print_usage();
            return Ok(());
        }
        "version" | "--version" => {
            output::info(build_info::current().summary());
            return Ok(());
        }
        _ => {}
    }

    let manager = ConfigManager::new();
    let config = manager.load()?;
    utils::init_tracing(Some(&config.log_level));

    let mut session = Session::open(&manager, &config)?;
    session.dispatch(&command, args)
}

struct Session {
    store: TransactionStore,
    base: PathBuf,
}

impl Session {
    fn open(manager: &ConfigManager, config: &TrackerConfig) -> Result<Self> {
        let backend = FileStore::new(config.store_dir(manager.base_dir()))?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let persistence =
            Persistence::new(Box::new(backend), config.storage.clone(), Arc::clone(&clock));
        let (store, start) = TransactionStore::hydrate_or_seed(
            persistence,
            clock,
            Arc::new(UuidGenerator),
            config.seed_demo_data,
        )?;

        output::set_preferences(OutputPreferences {
            dark_mode: store.dark_mode(),
            plain: env::var_os("NO_COLOR").is_some(),
        });
        if let SessionStart::Seeded { count } = start {
            output::info(format!("Loaded {count} demo transaction(s) to get you started."));
        }

        Ok(Self {
            store,
            base: manager.base_dir().to_path_buf(),
        })
    }

    fn dispatch(&mut self, command: &str, args: Vec<String>) -> Result<()> {
        match command {
            "list" => self.list(args),
            "add" => self.add(args),
            "update" => self.update(args),
            "remove" => self.remove(args),
            "summary" => self.summary(args),
            "monthly" => self.monthly(args),
            "categories" => self.categories(args),
            "budgets" => self.budgets(args),
            "set-budget" => self.set_budget(args),
            "reset-budgets" => self.reset_budgets(args),
            "import" => self.import(args),
            "export" => self.export(args),
            "theme" => self.theme(args),
            other => {
                print_usage();
                Err(TrackerError::InvalidInput(format!(
                    "unknown command `{other}`"
                )))
            }
        }
    }

    fn list(&mut self, mut args: Vec<String>) -> Result<()> {
        let month = take_option(&mut args, "--month")?;
        let search = take_option(&mut args, "--search")?;
        ensure_consumed(&args)?;

        if let Some(month) = month {
            let filter: MonthFilter = month.parse().map_err(TrackerError::InvalidInput)?;
            self.store.set_filter(filter);
        }
        if let Some(search) = search {
            self.store.set_search_query(search);
        }

        let view = self.store.filtered_view();
        output::section(format!("Transactions ({})", self.store.state().current_filter));
        if view.is_empty() {
            output::info("No transactions found.");
            return Ok(());
        }
        for txn in &view {
            output::info(format!(
                "{}  {:<14} {}  {}  {}",
                txn.date,
                category::label_for(&txn.category),
                output::amount(txn.kind, txn.amount),
                txn.description,
                output::accent(&txn.id.to_string())
            ));
        }
        output::info(format!("{} transaction(s)", view.len()));
        Ok(())
    }

    fn add(&mut self, args: Vec<String>) -> Result<()> {
        if args.len() < 5 {
            return Err(TrackerError::InvalidInput(
                "usage: add <income|expense> <amount> <category> <date> <description...>".into(),
            ));
        }
        let record = NewTransaction::new(
            parse_kind(&args[0])?,
            parse_amount(&args[1])?,
            resolve_category(&args[2]),
            parse_date(&args[3])?,
            args[4..].join(" "),
        );
        let id = self.store.add_validated(record)?;
        output::success(format!("Added transaction {id}"));
        self.warn_if_near_quota();
        Ok(())
    }

    fn update(&mut self, mut args: Vec<String>) -> Result<()> {
        if args.is_empty() {
            return Err(TrackerError::InvalidInput(
                "usage: update <id> [--amount N] [--category K] [--date D] [--description T] [--type T]"
                    .into(),
            ));
        }
        let id = parse_id(&args.remove(0))?;

        let mut patch = TransactionPatch::default();
        if let Some(raw) = take_option(&mut args, "--amount")? {
            patch = patch.amount(parse_amount(&raw)?);
        }
        if let Some(raw) = take_option(&mut args, "--category")? {
            patch = patch.category(resolve_category(&raw));
        }
        if let Some(raw) = take_option(&mut args, "--date")? {
            patch = patch.date(parse_date(&raw)?);
        }
        if let Some(raw) = take_option(&mut args, "--description")? {
            patch = patch.description(raw);
        }
        if let Some(raw) = take_option(&mut args, "--type")? {
            patch = patch.kind(parse_kind(&raw)?);
        }
        ensure_consumed(&args)?;
        if patch.is_empty() {
            return Err(TrackerError::InvalidInput(
                "nothing to update; pass at least one field flag".into(),
            ));
        }

        self.store.start_edit(id)?;
        self.store.update(id, patch)?;
        output::success(format!("Updated transaction {id}"));
        self.warn_if_near_quota();
        Ok(())
    }

    fn remove(&mut self, args: Vec<String>) -> Result<()> {
        let raw = single_argument(&args, "usage: remove <id>")?;
        let id = parse_id(raw)?;
        if self.store.remove(id)? {
            output::success(format!("Removed transaction {id}"));
        } else {
            output::warning(format!("No transaction with id {id}"));
        }
        Ok(())
    }

    fn summary(&mut self, args: Vec<String>) -> Result<()> {
        ensure_consumed(&args)?;
        let totals = self.store.summary_totals();
        output::section("Summary");
        output::info(format!(
            "Total income:   {}",
            output::amount(TransactionKind::Income, totals.total_income)
        ));
        output::info(format!(
            "Total expenses: {}",
            output::amount(TransactionKind::Expense, totals.total_expenses)
        ));
        output::info(format!(
            "Net balance:    {}",
            output::balance(totals.net_balance)
        ));
        Ok(())
    }

    fn monthly(&mut self, args: Vec<String>) -> Result<()> {
        let year = match args.as_slice() {
            [] => self.store.clock().today().year(),
            [raw] => raw
                .parse()
                .map_err(|_| TrackerError::InvalidInput(format!("`{raw}` is not a year")))?,
            _ => return Err(TrackerError::InvalidInput("usage: monthly [YEAR]".into())),
        };

        output::section(format!("Income vs expenses {year}"));
        for bucket in self.store.monthly_series(year) {
            output::info(format!(
                "{}  {}  {}  net {}",
                bucket.month,
                output::amount(TransactionKind::Income, bucket.income),
                output::amount(TransactionKind::Expense, bucket.expense),
                output::balance(bucket.net())
            ));
        }
        Ok(())
    }

    fn categories(&mut self, args: Vec<String>) -> Result<()> {
        ensure_consumed(&args)?;
        let breakdown = self.store.category_breakdown();
        output::section("Expenses by category");
        if breakdown.is_empty() {
            output::info("No expenses recorded.");
            return Ok(());
        }
        let total: f64 = breakdown.iter().map(|entry| entry.amount).sum();
        for entry in &breakdown {
            output::info(format!(
                "{:<14} ${:.2} ({:.1}%)",
                category::label_for(&entry.category),
                entry.amount,
                entry.share_of(total)
            ));
        }
        Ok(())
    }

    fn budgets(&mut self, args: Vec<String>) -> Result<()> {
        let month = match args.as_slice() {
            [] => self.store.clock().current_month(),
            [raw] => raw.parse::<YearMonth>().map_err(TrackerError::InvalidInput)?,
            _ => return Err(TrackerError::InvalidInput("usage: budgets [YYYY-MM]".into())),
        };

        output::section(format!("Budgets for {month}"));
        for progress in self.store.budget_utilization_for(month) {
            let filled = (progress.bar_width() / 100.0 * BAR_WIDTH as f64).round() as usize;
            let bar = format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled));
            let mut line = format!(
                "{:<14} {} ${:.2} / ${:.2} ({:.0}%)",
                progress.label,
                output::tier(progress.tier, &bar),
                progress.spent,
                progress.limit,
                progress.percentage
            );
            if progress.is_over_budget() {
                line.push_str(&format!(" over by ${:.2}", -progress.remaining()));
            }
            output::info(line);
        }
        Ok(())
    }

    fn set_budget(&mut self, args: Vec<String>) -> Result<()> {
        let [raw_category, raw_limit] = args.as_slice() else {
            return Err(TrackerError::InvalidInput(
                "usage: set-budget <category> <limit>".into(),
            ));
        };
        let key = resolve_category(raw_category);
        let limit = parse_amount(raw_limit)?;
        self.store.set_budget(&key, limit)?;
        output::success(format!(
            "{} budget set to ${limit:.2}",
            category::label_for(&key)
        ));
        self.warn_if_near_quota();
        Ok(())
    }

    fn reset_budgets(&mut self, args: Vec<String>) -> Result<()> {
        ensure_consumed(&args)?;
        self.store.reset_budgets()?;
        output::success("Budgets reset to defaults");
        Ok(())
    }

    fn import(&mut self, mut args: Vec<String>) -> Result<()> {
        let assume_yes = take_switch(&mut args, "--yes");
        let path = PathBuf::from(single_argument(&args, "usage: import <file> [--yes]")?);

        match transfer::import_file(&mut self.store, &path, |preview| {
            io::confirm_import(preview, assume_yes)
        })? {
            ImportOutcome::Imported { count } => {
                output::success(format!("Successfully imported {count} transaction(s)!"));
                self.warn_if_near_quota();
            }
            ImportOutcome::Declined => output::info("Import cancelled."),
        }
        Ok(())
    }

    fn export(&mut self, args: Vec<String>) -> Result<()> {
        let (raw_format, target) = match args.as_slice() {
            [format] => (format, None),
            [format, path] => (format, Some(PathBuf::from(path))),
            _ => {
                return Err(TrackerError::InvalidInput(
                    "usage: export <csv|json> [path]".into(),
                ))
            }
        };
        let format = ImportFormat::from_extension(raw_format)?;
        let transactions = self.store.transactions();
        let content = match format {
            ImportFormat::Csv => transfer::to_csv(transactions),
            ImportFormat::Json => transfer::to_json(transactions, self.store.clock())?,
        };
        let path = target.unwrap_or_else(|| self.default_export_path(format));
        write_file_atomic(&path, content.as_bytes())?;
        output::success(format!(
            "Exported {} transaction(s) to {}",
            transactions.len(),
            path.display()
        ));
        Ok(())
    }

    fn theme(&mut self, args: Vec<String>) -> Result<()> {
        let dark_mode = match single_argument(&args, "usage: theme <dark|light>")? {
            "dark" => true,
            "light" => false,
            other => {
                return Err(TrackerError::InvalidInput(format!(
                    "unknown theme `{other}`; use dark or light"
                )))
            }
        };
        self.store.set_dark_mode(dark_mode)?;
        output::set_preferences(OutputPreferences {
            dark_mode,
            plain: env::var_os("NO_COLOR").is_some(),
        });
        output::success(format!(
            "Theme set to {}",
            if dark_mode { "dark" } else { "light" }
        ));
        Ok(())
    }

    fn default_export_path(&self, format: ImportFormat) -> PathBuf {
        export_path_in(&self.base, format, self.store.clock())
    }

    fn warn_if_near_quota(&self) {
        if let Some(usage) = self.store.storage_usage() {
            if usage.is_near_quota() {
                output::warning(format!(
                    "Storage is {:.0}% full. Consider exporting your data as a backup.",
                    usage.percent()
                ));
            }
        }
    }
}

fn export_path_in(base: &Path, format: ImportFormat, clock: &dyn Clock) -> PathBuf {
    paths::export_dir_in(base).join(transfer::export_file_name(format, clock))
}

fn take_option(args: &mut Vec<String>, flag: &str) -> Result<Option<String>> {
    let Some(position) = args.iter().position(|arg| arg == flag) else {
        return Ok(None);
    };
    if position + 1 >= args.len() {
        return Err(TrackerError::InvalidInput(format!("{flag} requires a value")));
    }
    let value = args.remove(position + 1);
    args.remove(position);
    Ok(Some(value))
}

fn take_switch(args: &mut Vec<String>, flag: &str) -> bool {
    match args.iter().position(|arg| arg == flag) {
        Some(position) => {
            args.remove(position);
            true
        }
        None => false,
    }
}

fn ensure_consumed(args: &[String]) -> Result<()> {
    match args.first() {
        Some(extra) => Err(TrackerError::InvalidInput(format!(
            "unexpected argument `{extra}`"
        ))),
        None => Ok(()),
    }
}

fn single_argument<'a>(args: &'a [String], usage: &str) -> Result<&'a str> {
    match args {
        [value] => Ok(value.as_str()),
        _ => Err(TrackerError::InvalidInput(usage.to_string())),
    }
}

fn parse_kind(raw: &str) -> Result<TransactionKind> {
    raw.to_lowercase()
        .parse()
        .map_err(TrackerError::InvalidInput)
}

fn parse_amount(raw: &str) -> Result<f64> {
    raw.trim()
        .parse()
        .map_err(|_| TrackerError::InvalidInput(format!("`{raw}` is not a number")))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| TrackerError::InvalidInput(format!("`{raw}` is not a YYYY-MM-DD date")))
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| TrackerError::InvalidInput(format!("`{raw}` is not a transaction id")))
}

/// Accepts either a category key or its display label.
fn resolve_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if category::kind_of(trimmed).is_some() {
        trimmed.to_string()
    } else {
        category::key_for_label(trimmed)
    }
}

fn print_usage() {
    eprintln!(
        "Usage: bucks_core_cli <command>\n\
         Commands:\n  \
         list [--month YYYY-MM|all] [--search TEXT]\n  \
         add <income|expense> <amount> <category> <YYYY-MM-DD> <description...>\n  \
         update <id> [--amount N] [--category K] [--date D] [--description T] [--type T]\n  \
         remove <id>\n  \
         summary\n  \
         monthly [YEAR]\n  \
         categories\n  \
         budgets [YYYY-MM]\n  \
         set-budget <category> <limit>\n  \
         reset-budgets\n  \
         import <file.csv|file.json> [--yes]\n  \
         export <csv|json> [path]\n  \
         theme <dark|light>\n  \
         version"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FixedClock;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn options_are_removed_with_their_values() {
        let mut rest = args(&["--month", "2026-02", "extra", "--search", "rent"]);
        assert_eq!(
            take_option(&mut rest, "--search").unwrap().as_deref(),
            Some("rent")
        );
        assert_eq!(
            take_option(&mut rest, "--month").unwrap().as_deref(),
            Some("2026-02")
        );
        assert_eq!(rest, args(&["extra"]));
        assert!(ensure_consumed(&rest).is_err());
    }

    #[test]
    fn option_without_value_is_rejected() {
        let mut rest = args(&["--amount"]);
        assert!(matches!(
            take_option(&mut rest, "--amount"),
            Err(TrackerError::InvalidInput(_))
        ));
    }

    #[test]
    fn switches_are_detected_anywhere() {
        let mut rest = args(&["data.csv", "--yes"]);
        assert!(take_switch(&mut rest, "--yes"));
        assert!(!take_switch(&mut rest, "--yes"));
        assert_eq!(single_argument(&rest, "usage").unwrap(), "data.csv");
    }

    #[test]
    fn categories_resolve_from_key_or_label() {
        assert_eq!(resolve_category("rent"), "rent");
        assert_eq!(resolve_category("Other Income"), "other-income");
        assert_eq!(resolve_category("Pet Food"), "pet-food");
    }

    #[test]
    fn kinds_are_case_insensitive_on_the_command_line() {
        assert_eq!(parse_kind("Income").unwrap(), TransactionKind::Income);
        assert!(parse_kind("transfer").is_err());
    }

    #[test]
    fn default_export_path_lands_in_exports_dir() {
        let clock = FixedClock::on(NaiveDate::from_ymd_opt(2026, 2, 15).unwrap());
        let path = export_path_in(Path::new("/tmp/bucks"), ImportFormat::Json, &clock);
        assert_eq!(
            path,
            Path::new("/tmp/bucks/exports/bucks2bar_backup_2026-02-15.json")
        );
    }
}
