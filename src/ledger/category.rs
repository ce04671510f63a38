//! Static category registry: allowed keys per transaction type, display labels and
//! default monthly budget limits.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::budget::BudgetMap;
use super::transaction::TransactionKind;

pub const INCOME_CATEGORIES: [&str; 4] = ["salary", "freelance", "investments", "other-income"];

pub const EXPENSE_CATEGORIES: [&str; 6] = [
    "groceries",
    "rent",
    "utilities",
    "transport",
    "entertainment",
    "other-expense",
];

const CATEGORY_LABELS: [(&str, &str); 10] = [
    ("salary", "Salary"),
    ("freelance", "Freelance"),
    ("investments", "Investments"),
    ("other-income", "Other Income"),
    ("groceries", "Groceries"),
    ("rent", "Rent"),
    ("utilities", "Utilities"),
    ("transport", "Transport"),
    ("entertainment", "Entertainment"),
    ("other-expense", "Other Expense"),
];

const DEFAULT_BUDGETS: [(&str, f64); 6] = [
    ("groceries", 500.0),
    ("rent", 1500.0),
    ("utilities", 200.0),
    ("transport", 300.0),
    ("entertainment", 200.0),
    ("other-expense", 300.0),
];

static LABELS_BY_KEY: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| CATEGORY_LABELS.iter().copied().collect());

static KEYS_BY_LABEL: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    CATEGORY_LABELS
        .iter()
        .map(|(key, label)| (label.to_lowercase(), *key))
        .collect()
});

/// Category keys accepted for the given transaction type.
pub fn categories_for(kind: TransactionKind) -> &'static [&'static str] {
    match kind {
        TransactionKind::Income => &INCOME_CATEGORIES,
        TransactionKind::Expense => &EXPENSE_CATEGORIES,
    }
}

pub fn is_allowed(kind: TransactionKind, key: &str) -> bool {
    categories_for(kind).contains(&key)
}

/// Display label for a category key. Unknown keys (e.g. synthetic keys created on
/// import) are shown as-is.
pub fn label_for(key: &str) -> &str {
    LABELS_BY_KEY.get(key).copied().unwrap_or(key)
}

/// Resolves a display label back to its category key.
///
/// The lookup is case-insensitive. Labels that match nothing become a synthetic key:
/// lowercased, with every run of whitespace replaced by a single `-`.
pub fn key_for_label(label: &str) -> String {
    let needle = label.trim().to_lowercase();
    match KEYS_BY_LABEL.get(&needle) {
        Some(key) => (*key).to_string(),
        None => needle.split_whitespace().collect::<Vec<_>>().join("-"),
    }
}

/// The type a known category key belongs to.
pub fn kind_of(key: &str) -> Option<TransactionKind> {
    if INCOME_CATEGORIES.contains(&key) {
        Some(TransactionKind::Income)
    } else if EXPENSE_CATEGORIES.contains(&key) {
        Some(TransactionKind::Expense)
    } else {
        None
    }
}

/// Position of an expense key in the registry; unknown keys sort last.
pub fn expense_position(key: &str) -> usize {
    EXPENSE_CATEGORIES
        .iter()
        .position(|known| *known == key)
        .unwrap_or(EXPENSE_CATEGORIES.len())
}

pub fn default_budgets() -> BudgetMap {
    DEFAULT_BUDGETS
        .iter()
        .map(|(key, limit)| ((*key).to_string(), *limit))
        .collect()
}
