//! CSV and JSON file exchange for the transaction collection.

pub mod export;
pub mod import;

pub use export::{export_file_name, to_csv, to_json};
pub use import::{
    commit_import, import_file, parse_and_validate, Confirmation, ImportFormat, ImportOutcome,
    ImportPreview, RowDiagnostic, ValidationIssue,
};

/// Column order shared by CSV export and import.
pub const CSV_HEADER: [&str; 5] = ["Date", "Type", "Category", "Amount", "Description"];
