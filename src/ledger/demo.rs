//! Starter data shown to first-time users.

use chrono::NaiveDate;

use super::transaction::NewTransaction;

const DEMO_ROWS: [(&str, f64, &str, &str, &str); 8] = [
    ("income", 4500.0, "salary", "January Salary", "2026-01-31"),
    ("expense", 1200.0, "rent", "January Rent Payment", "2026-01-05"),
    ("expense", 320.0, "groceries", "Weekly grocery shopping", "2026-01-15"),
    ("expense", 85.0, "utilities", "Electric bill", "2026-01-20"),
    ("income", 800.0, "freelance", "Website design project", "2026-02-05"),
    ("expense", 150.0, "entertainment", "Concert tickets", "2026-02-10"),
    ("expense", 245.0, "groceries", "Monthly grocery shopping", "2026-02-12"),
    ("income", 4500.0, "salary", "February Salary", "2026-02-28"),
];

pub fn demo_records() -> Vec<NewTransaction> {
    DEMO_ROWS
        .iter()
        .filter_map(|(kind, amount, category, description, date)| {
            let kind = kind.parse().ok()?;
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            Some(NewTransaction::new(kind, *amount, *category, date, *description))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::category;

    #[test]
    fn demo_rows_are_all_valid() {
        let records = demo_records();
        assert_eq!(records.len(), DEMO_ROWS.len());
        assert!(records
            .iter()
            .all(|r| r.amount > 0.0 && category::is_allowed(r.kind, &r.category)));
    }
}
