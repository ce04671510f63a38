use std::{fmt, str::FromStr};

use uuid::Uuid;

use super::month::YearMonth;
use super::transaction::Transaction;

/// Month restriction applied to the transaction list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MonthFilter {
    #[default]
    All,
    Month(YearMonth),
}

impl MonthFilter {
    pub fn matches(&self, txn: &Transaction) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Month(month) => month.contains(txn.date),
        }
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("all"),
            MonthFilter::Month(month) => write!(f, "{month}"),
        }
    }
}

impl FromStr for MonthFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            Ok(MonthFilter::All)
        } else {
            value.parse().map(MonthFilter::Month)
        }
    }
}

/// Session state: the ordered transaction collection plus transient view settings.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub transactions: Vec<Transaction>,
    pub current_filter: MonthFilter,
    pub search_query: String,
    pub editing_id: Option<Uuid>,
}

impl AppState {
    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            ..Self::default()
        }
    }

    /// Transactions passing both the month filter and the description search, in
    /// collection order.
    pub fn filtered_view(&self) -> Vec<&Transaction> {
        filter_transactions(&self.transactions, self.current_filter, &self.search_query)
    }
}

pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    filter: MonthFilter,
    query: &str,
) -> Vec<&'a Transaction> {
    let needle = query.trim().to_lowercase();
    transactions
        .iter()
        .filter(|txn| filter.matches(txn))
        .filter(|txn| needle.is_empty() || txn.description.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::NewTransaction;
    use chrono::NaiveDate;

    fn txn(date: &str, description: &str) -> Transaction {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        Transaction::from_record(
            Uuid::new_v4(),
            NewTransaction::expense(10.0, "groceries", date, description),
        )
    }

    fn state() -> AppState {
        AppState::with_transactions(vec![
            txn("2026-02-12", "Monthly grocery shopping"),
            txn("2026-02-10", "Concert tickets"),
            txn("2026-01-15", "Weekly grocery shopping"),
        ])
    }

    #[test]
    fn default_view_is_whole_collection() {
        let state = state();
        let view = state.filtered_view();
        assert_eq!(view.len(), 3);
        assert!(view
            .iter()
            .zip(state.transactions.iter())
            .all(|(a, b)| a.id == b.id));
    }

    #[test]
    fn month_and_search_compose() {
        let mut state = state();
        state.current_filter = "2026-02".parse().unwrap();
        assert_eq!(state.filtered_view().len(), 2);

        state.search_query = "  GROCERY ".into();
        let view = state.filtered_view();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].description, "Monthly grocery shopping");
    }

    #[test]
    fn whitespace_query_is_ignored() {
        let mut state = state();
        state.search_query = "   ".into();
        assert_eq!(state.filtered_view().len(), 3);
    }

    #[test]
    fn parses_filter_values() {
        assert_eq!("all".parse::<MonthFilter>().unwrap(), MonthFilter::All);
        assert_eq!(
            "2026-02".parse::<MonthFilter>().unwrap().to_string(),
            "2026-02"
        );
        assert!("February".parse::<MonthFilter>().is_err());
    }
}
