use chrono::SecondsFormat;
use serde::Serialize;

use crate::core::Clock;
use crate::errors::Result;
use crate::ledger::{category, Transaction};

use super::{ImportFormat, CSV_HEADER};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    export_date: String,
    transactions: &'a [Transaction],
}

/// Renders the collection as CSV in collection order.
///
/// Types are written raw while categories use their display label, and descriptions
/// are always quoted. Lines are joined with `\n` without a trailing newline.
pub fn to_csv(transactions: &[Transaction]) -> String {
    let mut lines = Vec::with_capacity(transactions.len() + 1);
    lines.push(CSV_HEADER.join(","));
    for txn in transactions {
        lines.push(format!(
            "{},{},{},{:.2},\"{}\"",
            txn.date.format("%Y-%m-%d"),
            txn.kind,
            category::label_for(&txn.category),
            txn.amount,
            txn.description.replace('"', "\"\"")
        ));
    }
    lines.join("\n")
}

/// Pretty-printed backup document with every stored field.
pub fn to_json(transactions: &[Transaction], clock: &dyn Clock) -> Result<String> {
    let document = ExportDocument {
        export_date: clock.now().to_rfc3339_opts(SecondsFormat::Millis, true),
        transactions,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn export_file_name(format: ImportFormat, clock: &dyn Clock) -> String {
    let day = clock.today().format("%Y-%m-%d");
    match format {
        ImportFormat::Csv => format!("bucks2bar_transactions_{day}.csv"),
        ImportFormat::Json => format!("bucks2bar_backup_{day}.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FixedClock;
    use crate::ledger::NewTransaction;
    use crate::transfer::import::parse_and_validate;
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn txn(record: NewTransaction) -> Transaction {
        Transaction::from_record(Uuid::new_v4(), record)
    }

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 2, 15, 9, 5, 7).unwrap())
    }

    #[test]
    fn csv_uses_labels_and_quotes_descriptions() {
        let txns = vec![
            txn(NewTransaction::expense(
                1200.0,
                "rent",
                date("2026-01-05"),
                "Rent, \"January\"",
            )),
            txn(NewTransaction::income(4500.5, "salary", date("2026-01-31"), "Pay")),
        ];
        assert_eq!(
            to_csv(&txns),
            "Date,Type,Category,Amount,Description\n\
             2026-01-05,expense,Rent,1200.00,\"Rent, \"\"January\"\"\"\n\
             2026-01-31,income,Salary,4500.50,\"Pay\""
        );
    }

    #[test]
    fn csv_of_empty_collection_is_header_only() {
        assert_eq!(to_csv(&[]), "Date,Type,Category,Amount,Description");
    }

    #[test]
    fn csv_export_reimports_core_fields() {
        let original = vec![
            txn(NewTransaction::expense(45.126, "groceries", date("2026-02-12"), "Market, weekly")),
            txn(NewTransaction::income(800.0, "other-income", date("2026-02-05"), "Refund")),
        ];
        let preview = parse_and_validate(to_csv(&original).as_bytes(), "csv").unwrap();
        assert_eq!(preview.accepted.len(), 2);
        assert_eq!(preview.accepted[0].amount, 45.13);
        assert_eq!(preview.accepted[0].description, "Market, weekly");
        assert_eq!(preview.accepted[1].category, "other-income");
        assert_eq!(preview.accepted[1].kind, original[1].kind);
    }

    #[test]
    fn json_document_carries_export_date_and_fields() {
        let txns = vec![txn(NewTransaction::expense(
            85.0,
            "utilities",
            date("2026-01-20"),
            "Electric",
        ))];
        let json = to_json(&txns, &clock()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["exportDate"], "2026-02-15T09:05:07.000Z");
        let exported = &value["transactions"][0];
        assert_eq!(exported["type"], "expense");
        assert_eq!(exported["date"], "2026-01-20");
        assert_eq!(exported["sortKey"], 1_768_867_200_000_i64);
        assert!(json.contains("\n  \"transactions\""));
    }

    #[test]
    fn json_export_reimports_everything_but_identity() {
        let original = vec![
            txn(NewTransaction::expense(150.0, "entertainment", date("2026-02-10"), "Concert ")),
            txn(NewTransaction::income(800.0, "freelance", date("2026-02-05"), "Logo")),
        ];
        let json = to_json(&original, &clock()).unwrap();
        let preview = parse_and_validate(json.as_bytes(), "json").unwrap();
        let expected: Vec<_> = original.iter().map(Transaction::to_record).collect();
        assert_eq!(preview.accepted, expected);
    }

    #[test]
    fn file_names_use_clock_date() {
        assert_eq!(
            export_file_name(ImportFormat::Csv, &clock()),
            "bucks2bar_transactions_2026-02-15.csv"
        );
        assert_eq!(
            export_file_name(ImportFormat::Json, &clock()),
            "bucks2bar_backup_2026-02-15.json"
        );
    }
}
