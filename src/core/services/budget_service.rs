//! Budget-versus-actual progress for a single month.

use std::collections::HashMap;

use crate::ledger::{category, BudgetMap, BudgetProgress, BudgetTier, Transaction, YearMonth};

/// Stateless budgeting utilities over a transaction slice.
pub struct BudgetService;

impl BudgetService {
    /// One entry per budgeted category, in registry order.
    ///
    /// `spent` sums the category's expenses dated in `month`; the percentage is left
    /// unclamped so overspending stays visible.
    pub fn budget_utilization(
        transactions: &[Transaction],
        budgets: &BudgetMap,
        month: YearMonth,
    ) -> Vec<BudgetProgress> {
        let spent = Self::month_expenses(transactions, month);
        let mut progress = budgets
            .iter()
            .map(|(key, &limit)| {
                let spent = spent.get(key.as_str()).copied().unwrap_or(0.0);
                let percentage = spent / limit * 100.0;
                BudgetProgress {
                    category: key.clone(),
                    label: category::label_for(key).to_string(),
                    spent,
                    limit,
                    percentage,
                    tier: BudgetTier::for_percentage(percentage),
                }
            })
            .collect::<Vec<_>>();
        progress.sort_by_key(|entry| category::expense_position(&entry.category));
        progress
    }

    /// Expense totals per category for `month`.
    pub fn month_expenses(transactions: &[Transaction], month: YearMonth) -> HashMap<&str, f64> {
        let mut spent = HashMap::new();
        for txn in transactions
            .iter()
            .filter(|txn| txn.is_expense() && month.contains(txn.date))
        {
            *spent.entry(txn.category.as_str()).or_insert(0.0) += txn.amount;
        }
        spent
    }
}
