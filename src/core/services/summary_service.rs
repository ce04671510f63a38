//! Totals and chart series derived from the full transaction collection.

use std::collections::HashMap;

use serde::Serialize;

use crate::ledger::{Transaction, TransactionKind, YearMonth};

/// Headline income, expense and balance figures. Values are not rounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTotals {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
}

impl std::ops::Add for SummaryTotals {
    type Output = SummaryTotals;

    fn add(self, other: SummaryTotals) -> SummaryTotals {
        SummaryTotals {
            total_income: self.total_income + other.total_income,
            total_expenses: self.total_expenses + other.total_expenses,
            net_balance: self.net_balance + other.net_balance,
        }
    }
}

/// Income and expense sums for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    pub month: YearMonth,
    pub income: f64,
    pub expense: f64,
}

impl MonthlyBucket {
    fn empty(month: YearMonth) -> Self {
        Self {
            month,
            income: 0.0,
            expense: 0.0,
        }
    }

    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// Summed expenses for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

impl CategoryTotal {
    /// Percentage of `total` this category represents, zero when `total` is zero.
    pub fn share_of(&self, total: f64) -> f64 {
        if total == 0.0 {
            0.0
        } else {
            self.amount / total * 100.0
        }
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn summary_totals(transactions: &[Transaction]) -> SummaryTotals {
        let (total_income, total_expenses) =
            transactions
                .iter()
                .fold((0.0, 0.0), |(income, expenses), txn| match txn.kind {
                    TransactionKind::Income => (income + txn.amount, expenses),
                    TransactionKind::Expense => (income, expenses + txn.amount),
                });
        SummaryTotals {
            total_income,
            total_expenses,
            net_balance: total_income - total_expenses,
        }
    }

    /// Twelve zero-filled buckets for `year`, January first. Transactions dated in other
    /// years are ignored.
    pub fn monthly_series(transactions: &[Transaction], year: i32) -> Vec<MonthlyBucket> {
        match (YearMonth::new(year, 1), YearMonth::new(year, 12)) {
            (Some(start), Some(end)) => Self::monthly_series_range(transactions, start, end),
            _ => Vec::new(),
        }
    }

    /// Zero-filled buckets for every month from `start` through `end`, in order.
    pub fn monthly_series_range(
        transactions: &[Transaction],
        start: YearMonth,
        end: YearMonth,
    ) -> Vec<MonthlyBucket> {
        let mut buckets: Vec<MonthlyBucket> = YearMonth::range_inclusive(start, end)
            .into_iter()
            .map(MonthlyBucket::empty)
            .collect();
        let index: HashMap<YearMonth, usize> = buckets
            .iter()
            .enumerate()
            .map(|(position, bucket)| (bucket.month, position))
            .collect();

        for txn in transactions {
            let Some(&position) = index.get(&YearMonth::of(txn.date)) else {
                continue;
            };
            let bucket = &mut buckets[position];
            match txn.kind {
                TransactionKind::Income => bucket.income += txn.amount,
                TransactionKind::Expense => bucket.expense += txn.amount,
            }
        }
        buckets
    }

    /// Expense totals per category, in order of first appearance. Categories without
    /// expenses are omitted.
    pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryTotal> {
        let mut totals: Vec<CategoryTotal> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for txn in transactions.iter().filter(|txn| txn.is_expense()) {
            match positions.get(txn.category.as_str()) {
                Some(&position) => totals[position].amount += txn.amount,
                None => {
                    positions.insert(txn.category.as_str(), totals.len());
                    totals.push(CategoryTotal {
                        category: txn.category.clone(),
                        amount: txn.amount,
                    });
                }
            }
        }
        totals
    }

    /// Distinct months with at least one transaction, newest first.
    pub fn active_months(transactions: &[Transaction]) -> Vec<YearMonth> {
        let mut months: Vec<YearMonth> = transactions
            .iter()
            .map(|txn| YearMonth::of(txn.date))
            .collect();
        months.sort_unstable_by(|a, b| b.cmp(a));
        months.dedup();
        months
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::NewTransaction;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn txn(kind: TransactionKind, amount: f64, category: &str, date: &str) -> Transaction {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Transaction::from_record(
            Uuid::new_v4(),
            NewTransaction::new(kind, amount, category, date, "test"),
        )
    }

    #[test]
    fn totals_for_salary_and_rent() {
        let txns = vec![
            txn(TransactionKind::Income, 4500.0, "salary", "2026-01-31"),
            txn(TransactionKind::Expense, 1200.0, "rent", "2026-01-05"),
        ];
        let totals = SummaryService::summary_totals(&txns);
        assert_eq!(
            totals,
            SummaryTotals {
                total_income: 4500.0,
                total_expenses: 1200.0,
                net_balance: 3300.0,
            }
        );
    }

    #[test]
    fn empty_collection_totals_to_zero() {
        assert_eq!(
            SummaryService::summary_totals(&[]),
            SummaryTotals::default()
        );
    }

    #[test]
    fn totals_are_additive() {
        let first = vec![
            txn(TransactionKind::Income, 800.0, "freelance", "2026-02-05"),
            txn(TransactionKind::Expense, 150.0, "entertainment", "2026-02-10"),
        ];
        let second = vec![txn(TransactionKind::Expense, 245.0, "groceries", "2026-02-12")];
        let combined: Vec<_> = first.iter().chain(second.iter()).cloned().collect();
        assert_eq!(
            SummaryService::summary_totals(&combined),
            SummaryService::summary_totals(&first) + SummaryService::summary_totals(&second)
        );
    }

    #[test]
    fn monthly_series_is_zero_filled_and_year_scoped() {
        let txns = vec![
            txn(TransactionKind::Income, 4500.0, "salary", "2026-01-31"),
            txn(TransactionKind::Expense, 320.0, "groceries", "2026-01-15"),
            txn(TransactionKind::Expense, 85.0, "utilities", "2026-03-20"),
            txn(TransactionKind::Expense, 999.0, "rent", "2025-12-01"),
        ];
        let series = SummaryService::monthly_series(&txns, 2026);
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].month.to_string(), "2026-01");
        assert_eq!(series[11].month.to_string(), "2026-12");
        assert_eq!((series[0].income, series[0].expense), (4500.0, 320.0));
        assert_eq!((series[1].income, series[1].expense), (0.0, 0.0));
        assert_eq!(series[2].expense, 85.0);
        let total_expense: f64 = series.iter().map(|bucket| bucket.expense).sum();
        assert_eq!(total_expense, 405.0);
    }

    #[test]
    fn monthly_range_spans_years() {
        let txns = vec![
            txn(TransactionKind::Expense, 999.0, "rent", "2025-12-01"),
            txn(TransactionKind::Income, 10.0, "salary", "2026-01-01"),
        ];
        let start = YearMonth::new(2025, 12).unwrap();
        let end = YearMonth::new(2026, 1).unwrap();
        let series = SummaryService::monthly_series_range(&txns, start, end);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].expense, 999.0);
        assert_eq!(series[1].net(), 10.0);
    }

    #[test]
    fn category_breakdown_keeps_first_seen_order() {
        let txns = vec![
            txn(TransactionKind::Expense, 245.0, "groceries", "2026-02-12"),
            txn(TransactionKind::Expense, 150.0, "entertainment", "2026-02-10"),
            txn(TransactionKind::Income, 800.0, "freelance", "2026-02-05"),
            txn(TransactionKind::Expense, 320.0, "groceries", "2026-01-15"),
        ];
        let breakdown = SummaryService::category_breakdown(&txns);
        let pairs: Vec<_> = breakdown
            .iter()
            .map(|entry| (entry.category.as_str(), entry.amount))
            .collect();
        assert_eq!(pairs, [("groceries", 565.0), ("entertainment", 150.0)]);
        assert_eq!(breakdown[1].share_of(715.0).round(), 21.0);
        assert_eq!(breakdown[0].share_of(0.0), 0.0);
    }

    #[test]
    fn active_months_are_distinct_and_newest_first() {
        let txns = vec![
            txn(TransactionKind::Expense, 1.0, "rent", "2026-01-05"),
            txn(TransactionKind::Expense, 1.0, "rent", "2026-02-05"),
            txn(TransactionKind::Expense, 1.0, "rent", "2026-01-25"),
        ];
        let months: Vec<String> = SummaryService::active_months(&txns)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(months, ["2026-02", "2026-01"]);
    }
}
