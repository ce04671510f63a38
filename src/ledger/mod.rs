//! Tracker domain models: transactions, categories, budgets and session state.

pub mod budget;
pub mod category;
pub mod demo;
pub mod month;
pub mod state;
pub mod transaction;

pub use budget::{BudgetMap, BudgetProgress, BudgetTier};
pub use month::YearMonth;
pub use state::{AppState, MonthFilter};
pub use transaction::{NewTransaction, Transaction, TransactionKind, TransactionPatch};
