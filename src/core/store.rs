use std::sync::Arc;

use uuid::Uuid;

use crate::core::ids::IdGenerator;
use crate::core::services::{
    BudgetService, CategoryTotal, MonthlyBucket, SummaryService, SummaryTotals,
};
use crate::core::time::Clock;
use crate::errors::{Result, TrackerError};
use crate::ledger::{
    category, demo, transaction, AppState, BudgetMap, BudgetProgress, MonthFilter,
    NewTransaction, Transaction, TransactionKind, TransactionPatch, YearMonth,
};
use crate::storage::{Persistence, StorageUsage};

/// How a session's transaction collection was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStart {
    Hydrated { count: usize },
    Seeded { count: usize },
    Empty,
}

/// Owns the session state and writes every collection or budget change through the
/// persistence gateway.
///
/// A failed save is reported to the caller but the in-memory change is kept, so memory
/// and storage can diverge until the next successful save.
pub struct TransactionStore {
    state: AppState,
    budgets: BudgetMap,
    persistence: Persistence,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    last_usage: Option<StorageUsage>,
}

impl TransactionStore {
    /// Empty store with default budgets. Nothing is read from storage.
    pub fn new(persistence: Persistence, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            state: AppState::default(),
            budgets: category::default_budgets(),
            persistence,
            clock,
            ids,
            last_usage: None,
        }
    }

    /// Starts a session from stored data, seeding the demo set when nothing is stored
    /// and `seed_demo_data` is set.
    ///
    /// Unreadable transaction data is an error rather than a reason to seed, so stored
    /// data is never overwritten. Unreadable budget overrides fall back to the defaults.
    pub fn hydrate_or_seed(
        persistence: Persistence,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        seed_demo_data: bool,
    ) -> Result<(Self, SessionStart)> {
        let mut store = Self::new(persistence, clock, ids);

        match store.persistence.load_budgets() {
            Ok(Some(budgets)) => store.budgets = budgets,
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "ignoring stored budgets"),
        }

        let start = match store.persistence.load_transactions()? {
            Some(transactions) => {
                let count = transactions.len();
                store.state.transactions = transactions;
                SessionStart::Hydrated { count }
            }
            None if seed_demo_data => {
                let count = store.append_all(demo::demo_records())?;
                SessionStart::Seeded { count }
            }
            None => SessionStart::Empty,
        };
        tracing::info!(?start, "transaction store ready");
        Ok((store, start))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.state.transactions
    }

    pub fn get(&self, id: Uuid) -> Option<&Transaction> {
        self.state.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    /// Usage reported by the most recent successful save.
    pub fn storage_usage(&self) -> Option<StorageUsage> {
        self.last_usage
    }

    /// Inserts a record as-is under a fresh id. Callers validate fields first; see
    /// [`TransactionStore::add_validated`].
    pub fn add(&mut self, record: NewTransaction) -> Result<Uuid> {
        let txn = Transaction::from_record(self.ids.next_id(), record);
        let id = txn.id;
        self.state.transactions.push(txn);
        transaction::sort_newest_first(&mut self.state.transactions);
        tracing::debug!(%id, "added transaction");
        self.persist()?;
        Ok(id)
    }

    /// Form entry path: rejects a non-positive amount, a blank description or a
    /// category that does not belong to the type, then adds the trimmed record.
    pub fn add_validated(&mut self, mut record: NewTransaction) -> Result<Uuid> {
        validate_amount(record.amount)?;
        record.description = validate_description(&record.description)?;
        validate_category(record.kind, &record.category)?;
        self.add(record)
    }

    /// Applies `patch` to the transaction with `id`, re-sorting when the date moves.
    pub fn update(&mut self, id: Uuid, mut patch: TransactionPatch) -> Result<()> {
        let position = self
            .position(id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))?;

        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
        }
        if let Some(description) = patch.description.as_deref() {
            patch.description = Some(validate_description(description)?);
        }
        if patch.kind.is_some() || patch.category.is_some() {
            let current = &self.state.transactions[position];
            let kind = patch.kind.unwrap_or(current.kind);
            let key = patch.category.as_deref().unwrap_or(&current.category);
            validate_category(kind, key)?;
        }

        let date_changed = self.state.transactions[position].apply(patch);
        if date_changed {
            transaction::sort_newest_first(&mut self.state.transactions);
        }
        if self.state.editing_id == Some(id) {
            self.state.editing_id = None;
        }
        tracing::debug!(%id, date_changed, "updated transaction");
        self.persist()
    }

    /// Removes the transaction with `id`. Returns `false`, without saving, when absent.
    pub fn remove(&mut self, id: Uuid) -> Result<bool> {
        let Some(position) = self.position(id) else {
            return Ok(false);
        };
        self.state.transactions.remove(position);
        if self.state.editing_id == Some(id) {
            self.state.editing_id = None;
        }
        tracing::debug!(%id, "removed transaction");
        self.persist()?;
        Ok(true)
    }

    /// Appends many records with one re-sort and one save. Returns the number added.
    pub fn append_all(&mut self, records: Vec<NewTransaction>) -> Result<usize> {
        let count = records.len();
        for record in records {
            let txn = Transaction::from_record(self.ids.next_id(), record);
            self.state.transactions.push(txn);
        }
        transaction::sort_newest_first(&mut self.state.transactions);
        self.persist()?;
        Ok(count)
    }

    pub fn start_edit(&mut self, id: Uuid) -> Result<&Transaction> {
        let position = self
            .position(id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))?;
        self.state.editing_id = Some(id);
        Ok(&self.state.transactions[position])
    }

    pub fn cancel_edit(&mut self) {
        self.state.editing_id = None;
    }

    pub fn set_filter(&mut self, filter: MonthFilter) {
        self.state.current_filter = filter;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.state.search_query = query.into();
    }

    pub fn set_editing_id(&mut self, id: Option<Uuid>) {
        self.state.editing_id = id;
    }

    pub fn filtered_view(&self) -> Vec<&Transaction> {
        self.state.filtered_view()
    }

    pub fn available_months(&self) -> Vec<YearMonth> {
        SummaryService::active_months(&self.state.transactions)
    }

    pub fn summary_totals(&self) -> SummaryTotals {
        SummaryService::summary_totals(&self.state.transactions)
    }

    pub fn monthly_series(&self, year: i32) -> Vec<MonthlyBucket> {
        SummaryService::monthly_series(&self.state.transactions, year)
    }

    pub fn category_breakdown(&self) -> Vec<CategoryTotal> {
        SummaryService::category_breakdown(&self.state.transactions)
    }

    /// Budget progress for the clock's current month.
    pub fn budget_utilization(&self) -> Vec<BudgetProgress> {
        self.budget_utilization_for(self.clock.current_month())
    }

    pub fn budget_utilization_for(&self, month: YearMonth) -> Vec<BudgetProgress> {
        BudgetService::budget_utilization(&self.state.transactions, &self.budgets, month)
    }

    pub fn budgets(&self) -> &BudgetMap {
        &self.budgets
    }

    pub fn set_budget(&mut self, key: &str, limit: f64) -> Result<()> {
        if category::kind_of(key) != Some(TransactionKind::Expense) {
            return Err(TrackerError::CategoryNotFound(format!(
                "`{key}` is not an expense category"
            )));
        }
        if !limit.is_finite() || limit <= 0.0 {
            return Err(TrackerError::InvalidInput(
                "budget limit must be greater than 0".into(),
            ));
        }
        self.budgets.insert(key.to_string(), limit);
        let usage = self.persistence.save_budgets(&self.budgets)?;
        self.last_usage = Some(usage);
        Ok(())
    }

    /// Drops stored overrides and returns to the registry defaults.
    pub fn reset_budgets(&mut self) -> Result<()> {
        self.budgets = category::default_budgets();
        self.persistence.clear_budgets()?;
        Ok(())
    }

    pub fn dark_mode(&self) -> bool {
        self.persistence.load_dark_mode().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring stored display preference");
            false
        })
    }

    pub fn set_dark_mode(&mut self, enabled: bool) -> Result<()> {
        let usage = self.persistence.save_dark_mode(enabled)?;
        self.last_usage = Some(usage);
        Ok(())
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.state.transactions.iter().position(|txn| txn.id == id)
    }

    fn persist(&mut self) -> Result<()> {
        let usage = self
            .persistence
            .save_transactions(&self.state.transactions)
            .map_err(|err| {
                tracing::error!(error = %err, "failed to save transactions");
                TrackerError::from(err)
            })?;
        self.last_usage = Some(usage);
        Ok(())
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(TrackerError::InvalidInput(
            "amount must be greater than 0".into(),
        ))
    }
}

fn validate_description(description: &str) -> Result<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        Err(TrackerError::InvalidInput("description is required".into()))
    } else {
        Ok(trimmed.to_string())
    }
}

fn validate_category(kind: TransactionKind, key: &str) -> Result<()> {
    if category::is_allowed(kind, key) {
        Ok(())
    } else {
        Err(TrackerError::CategoryNotFound(format!(
            "`{key}` is not a {kind} category"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::SequentialIds;
    use crate::core::time::FixedClock;
    use crate::storage::{KeyValueStore, MemoryStore};
    use chrono::NaiveDate;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn store() -> TransactionStore {
        TransactionStore::new(
            Persistence::in_memory(),
            Arc::new(FixedClock::on(date("2026-02-15"))),
            Arc::new(SequentialIds::new()),
        )
    }

    #[test]
    fn add_keeps_newest_first_and_persists() {
        let mut store = store();
        store
            .add(NewTransaction::expense(10.0, "rent", date("2026-01-05"), "old"))
            .unwrap();
        store
            .add(NewTransaction::expense(10.0, "rent", date("2026-03-05"), "new"))
            .unwrap();
        store
            .add(NewTransaction::expense(10.0, "rent", date("2026-02-05"), "mid"))
            .unwrap();

        let order: Vec<_> = store
            .transactions()
            .iter()
            .map(|t| t.description.as_str())
            .collect();
        assert_eq!(order, ["new", "mid", "old"]);

        let saved = store.persistence().load_transactions().unwrap().unwrap();
        assert_eq!(saved.len(), 3);
        assert!(store.storage_usage().is_some());
    }

    #[test]
    fn add_validated_rejects_bad_fields() {
        let mut store = store();
        let zero = NewTransaction::expense(0.0, "rent", date("2026-01-05"), "rent");
        assert!(matches!(
            store.add_validated(zero),
            Err(TrackerError::InvalidInput(_))
        ));
        let blank = NewTransaction::expense(5.0, "rent", date("2026-01-05"), "   ");
        assert!(matches!(
            store.add_validated(blank),
            Err(TrackerError::InvalidInput(_))
        ));
        let wrong_kind = NewTransaction::income(5.0, "rent", date("2026-01-05"), "rent");
        assert!(matches!(
            store.add_validated(wrong_kind),
            Err(TrackerError::CategoryNotFound(_))
        ));
        assert!(store.transactions().is_empty());

        let id = store
            .add_validated(NewTransaction::expense(5.0, "rent", date("2026-01-05"), "  Rent  "))
            .unwrap();
        assert_eq!(store.get(id).unwrap().description, "Rent");
    }

    #[test]
    fn update_moves_transaction_when_date_changes() {
        let mut store = store();
        let first = store
            .add(NewTransaction::expense(10.0, "rent", date("2026-01-05"), "first"))
            .unwrap();
        store
            .add(NewTransaction::expense(10.0, "rent", date("2026-01-10"), "second"))
            .unwrap();
        store.start_edit(first).unwrap();

        store
            .update(first, TransactionPatch::default().date(date("2026-01-20")))
            .unwrap();

        assert_eq!(store.transactions()[0].id, first);
        assert!(transaction::is_sorted_newest_first(store.transactions()));
        assert_eq!(store.state().editing_id, None);
    }

    #[test]
    fn update_missing_transaction_is_not_found() {
        let mut store = store();
        let err = store
            .update(Uuid::new_v4(), TransactionPatch::default().amount(3.0))
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
    }

    #[test]
    fn update_checks_category_against_new_type() {
        let mut store = store();
        let id = store
            .add(NewTransaction::expense(10.0, "rent", date("2026-01-05"), "rent"))
            .unwrap();
        let err = store
            .update(id, TransactionPatch::default().kind(TransactionKind::Income))
            .unwrap_err();
        assert!(matches!(err, TrackerError::CategoryNotFound(_)));

        store
            .update(
                id,
                TransactionPatch::default()
                    .kind(TransactionKind::Income)
                    .category("salary"),
            )
            .unwrap();
        assert!(store.get(id).unwrap().is_income());
    }

    #[test]
    fn remove_reports_whether_anything_was_removed() {
        let mut store = store();
        let id = store
            .add(NewTransaction::expense(10.0, "rent", date("2026-01-05"), "rent"))
            .unwrap();
        store.set_editing_id(Some(id));
        assert!(store.remove(id).unwrap());
        assert!(!store.remove(id).unwrap());
        assert!(store.transactions().is_empty());
        assert_eq!(store.state().editing_id, None);
    }

    #[test]
    fn view_setters_do_not_persist() {
        let mut store = store();
        store.set_filter("2026-02".parse().unwrap());
        store.set_search_query("rent");
        assert!(store.persistence().store().keys().unwrap().is_empty());
    }

    #[test]
    fn save_failure_keeps_in_memory_change() {
        let persistence = Persistence::new(
            Box::new(MemoryStore::with_capacity_limit(16)),
            crate::config::StorageSettings::default(),
            Arc::new(FixedClock::on(date("2026-02-15"))),
        );
        let mut store = TransactionStore::new(
            persistence,
            Arc::new(FixedClock::on(date("2026-02-15"))),
            Arc::new(SequentialIds::new()),
        );
        let err = store
            .add(NewTransaction::expense(10.0, "rent", date("2026-01-05"), "rent"))
            .unwrap_err();
        assert!(err.is_storage());
        assert_eq!(store.transactions().len(), 1);
    }

    #[test]
    fn budget_overrides_are_validated_and_saved() {
        let mut store = store();
        assert_eq!(store.budgets().get("groceries"), Some(&500.0));

        store.set_budget("groceries", 650.0).unwrap();
        assert_eq!(
            store.persistence().load_budgets().unwrap().unwrap()["groceries"],
            650.0
        );
        assert!(matches!(
            store.set_budget("salary", 10.0),
            Err(TrackerError::CategoryNotFound(_))
        ));
        assert!(matches!(
            store.set_budget("rent", 0.0),
            Err(TrackerError::InvalidInput(_))
        ));

        store.reset_budgets().unwrap();
        assert_eq!(store.budgets().get("groceries"), Some(&500.0));
        assert_eq!(store.persistence().load_budgets().unwrap(), None);
    }

    #[test]
    fn budget_utilization_uses_clock_month() {
        let mut store = store();
        store
            .add(NewTransaction::expense(450.0, "groceries", date("2026-02-02"), "food"))
            .unwrap();
        store
            .add(NewTransaction::expense(450.0, "groceries", date("2026-01-02"), "food"))
            .unwrap();
        let groceries = store
            .budget_utilization()
            .into_iter()
            .find(|p| p.category == "groceries")
            .unwrap();
        assert_eq!(groceries.spent, 450.0);
        assert_eq!(groceries.tier, crate::ledger::BudgetTier::Danger);
    }
}
