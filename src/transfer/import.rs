use std::{fmt, fs, path::Path};

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::core::TransactionStore;
use crate::errors::{Result, TrackerError};
use crate::ledger::{category, NewTransaction, TransactionKind};

/// Diagnostics beyond this count are summarised instead of logged one by one.
const MAX_LOGGED_DIAGNOSTICS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    /// Case-insensitive match on `csv` or `json`, with or without a leading dot.
    pub fn from_extension(extension: &str) -> Result<Self> {
        let normalized = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "csv" => Ok(ImportFormat::Csv),
            "json" => Ok(ImportFormat::Json),
            _ => Err(TrackerError::Format(format!(
                "unsupported format `{extension}`; use CSV or JSON files"
            ))),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportFormat::Csv => f.write_str("CSV"),
            ImportFormat::Json => f.write_str("JSON"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    InvalidType,
    InvalidAmount,
    MissingCategory,
    InvalidDate,
    MissingDescription,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ValidationIssue::InvalidType => "invalid type",
            ValidationIssue::InvalidAmount => "invalid amount",
            ValidationIssue::MissingCategory => "missing category",
            ValidationIssue::InvalidDate => "invalid date",
            ValidationIssue::MissingDescription => "missing description",
        };
        f.write_str(text)
    }
}

/// Problems found in one candidate record. `row` is 1-based over the parsed records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiagnostic {
    pub row: usize,
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: ", self.row)?;
        for (position, issue) in self.issues.iter().enumerate() {
            if position > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

/// Parsed and validated file contents awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPreview {
    pub accepted: Vec<NewTransaction>,
    /// Candidate records that reached validation.
    pub attempted: usize,
    /// CSV lines dropped before validation for having too few columns.
    pub skipped_rows: usize,
    pub diagnostics: Vec<RowDiagnostic>,
    pub format: ImportFormat,
}

impl ImportPreview {
    pub fn summary(&self) -> String {
        format!(
            "Import {} transaction(s)? This will add them to your existing data.",
            self.accepted.len()
        )
    }

    pub fn rejected(&self) -> usize {
        self.diagnostics.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Declined,
    Imported { count: usize },
}

/// Loosely typed record as read from a file, before validation.
#[derive(Debug, Default)]
struct Candidate {
    kind: Option<String>,
    amount: Option<f64>,
    category: Option<String>,
    date: Option<String>,
    description: Option<String>,
}

/// Decodes `bytes` according to `extension` and validates every record.
///
/// Invalid records are dropped and reported in [`ImportPreview::diagnostics`]. Fails
/// with [`TrackerError::Format`] when the file cannot be read as the given format or
/// when no record survives validation.
pub fn parse_and_validate(bytes: &[u8], extension: &str) -> Result<ImportPreview> {
    let format = ImportFormat::from_extension(extension)?;
    let text = std::str::from_utf8(bytes)
        .map_err(|_| TrackerError::Format("file is not valid UTF-8 text".into()))?;

    let (candidates, skipped_rows) = match format {
        ImportFormat::Json => (parse_json(text)?, 0),
        ImportFormat::Csv => parse_csv(text)?,
    };
    let attempted = candidates.len();

    let mut accepted = Vec::new();
    let mut diagnostics = Vec::new();
    for (index, candidate) in candidates.into_iter().enumerate() {
        match validate(candidate) {
            Ok(record) => accepted.push(record),
            Err(issues) => diagnostics.push(RowDiagnostic {
                row: index + 1,
                issues,
            }),
        }
    }

    for diagnostic in diagnostics.iter().take(MAX_LOGGED_DIAGNOSTICS) {
        tracing::warn!(%format, "import warning: {diagnostic}");
    }
    if diagnostics.len() > MAX_LOGGED_DIAGNOSTICS {
        tracing::warn!(
            %format,
            rejected = diagnostics.len(),
            "further import warnings suppressed"
        );
    }

    if accepted.is_empty() {
        return Err(TrackerError::Format("no valid transactions found".into()));
    }

    tracing::debug!(
        %format,
        accepted = accepted.len(),
        attempted,
        skipped_rows,
        "parsed import file"
    );
    Ok(ImportPreview {
        accepted,
        attempted,
        skipped_rows,
        diagnostics,
        format,
    })
}

/// Appends the previewed records when confirmed. Declining leaves the store untouched.
pub fn commit_import(
    store: &mut TransactionStore,
    preview: ImportPreview,
    confirmation: Confirmation,
) -> Result<ImportOutcome> {
    if confirmation == Confirmation::Declined {
        tracing::debug!(pending = preview.accepted.len(), "import declined");
        return Ok(ImportOutcome::Declined);
    }
    let count = store.append_all(preview.accepted)?;
    tracing::info!(count, format = %preview.format, "imported transactions");
    Ok(ImportOutcome::Imported { count })
}

/// Reads `path`, validates it and commits once `confirm` approves the preview.
pub fn import_file<F>(store: &mut TransactionStore, path: &Path, confirm: F) -> Result<ImportOutcome>
where
    F: FnOnce(&ImportPreview) -> Result<Confirmation>,
{
    let format = ImportFormat::from_path(path)?;
    let bytes = fs::read(path)?;
    let extension = match format {
        ImportFormat::Csv => "csv",
        ImportFormat::Json => "json",
    };
    let preview = parse_and_validate(&bytes, extension)?;
    let confirmation = confirm(&preview)?;
    commit_import(store, preview, confirmation)
}

fn parse_json(text: &str) -> Result<Vec<Candidate>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| TrackerError::Format(format!("invalid JSON: {err}")))?;
    let records = match value {
        Value::Array(records) => records,
        Value::Object(mut object) => match object.remove("transactions") {
            Some(Value::Array(records)) => records,
            _ => {
                return Err(TrackerError::Format(
                    "expected a `transactions` array".into(),
                ))
            }
        },
        _ => {
            return Err(TrackerError::Format(
                "expected an array of transactions".into(),
            ))
        }
    };
    Ok(records.iter().map(candidate_from_json).collect())
}

fn candidate_from_json(value: &Value) -> Candidate {
    let text = |field: &str| value.get(field).and_then(Value::as_str).map(str::to_string);
    let amount = match value.get("amount") {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(raw)) => raw.trim().parse().ok(),
        _ => None,
    };
    Candidate {
        kind: text("type"),
        amount,
        category: text("category"),
        date: text("date"),
        description: text("description"),
    }
}

fn parse_csv(text: &str) -> Result<(Vec<Candidate>, usize)> {
    let text = text.trim();
    if text.lines().count() < 2 {
        return Err(TrackerError::Format("CSV file is empty or invalid".into()));
    }

    let mut candidates = Vec::new();
    let mut skipped = 0;
    for line in text.lines().skip(1) {
        let record = match tokenize_line(line) {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable CSV line");
                skipped += 1;
                continue;
            }
        };
        if record.len() < 5 {
            skipped += 1;
            continue;
        }
        candidates.push(Candidate {
            date: Some(record[0].to_string()),
            kind: Some(record[1].to_lowercase()),
            category: Some(category::key_for_label(&record[2])),
            amount: record[3].parse().ok(),
            description: Some(record[4].to_string()),
        });
    }
    Ok((candidates, skipped))
}

/// Splits one line into trimmed fields. Quotes never continue past the line end.
fn tokenize_line(line: &str) -> csv::Result<csv::StringRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    reader.read_record(&mut record)?;
    Ok(record)
}

fn validate(candidate: Candidate) -> std::result::Result<NewTransaction, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    let kind = candidate
        .kind
        .as_deref()
        .and_then(|raw| raw.parse::<TransactionKind>().ok());
    if kind.is_none() {
        issues.push(ValidationIssue::InvalidType);
    }
    let amount = candidate
        .amount
        .filter(|amount| amount.is_finite() && *amount > 0.0);
    if amount.is_none() {
        issues.push(ValidationIssue::InvalidAmount);
    }
    let category = candidate
        .category
        .filter(|category| !category.trim().is_empty());
    if category.is_none() {
        issues.push(ValidationIssue::MissingCategory);
    }
    let date = candidate.date.as_deref().and_then(parse_date);
    if date.is_none() {
        issues.push(ValidationIssue::InvalidDate);
    }
    let description = candidate
        .description
        .filter(|description| !description.trim().is_empty());
    if description.is_none() {
        issues.push(ValidationIssue::MissingDescription);
    }

    match (kind, amount, category, date, description) {
        (Some(kind), Some(amount), Some(category), Some(date), Some(description)) => Ok(
            NewTransaction::new(kind, amount, category, date, description),
        ),
        _ => Err(issues),
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD` and RFC 3339 date-times, keeping the date as written.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y/%m/%d").ok())
}
