use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveTime};
use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("unknown transaction type `{other}`")),
        }
    }
}

/// A single dated income or expense record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Older saves may hold the amount as numeric text.
    #[serde(deserialize_with = "amount_from_number_or_text")]
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub description: String,
    /// Epoch milliseconds of `date` at midnight UTC. Ordering only; re-derived on load.
    #[serde(alias = "timestamp", default)]
    pub sort_key: i64,
}

fn amount_from_number_or_text<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(value) => Ok(value),
        RawAmount::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid amount `{text}`"))),
    }
}

impl Transaction {
    pub fn from_record(id: Uuid, record: NewTransaction) -> Self {
        Self {
            id,
            kind: record.kind,
            amount: record.amount,
            category: record.category,
            sort_key: sort_key_for(record.date),
            date: record.date,
            description: record.description,
        }
    }

    /// Applies the populated patch fields. Returns `true` when the date changed.
    pub fn apply(&mut self, patch: TransactionPatch) -> bool {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        match patch.date {
            Some(date) if date != self.date => {
                self.date = date;
                self.refresh_sort_key();
                true
            }
            _ => false,
        }
    }

    pub fn refresh_sort_key(&mut self) {
        self.sort_key = sort_key_for(self.date);
    }

    /// The record fields without the store-assigned identity.
    pub fn to_record(&self) -> NewTransaction {
        NewTransaction {
            kind: self.kind,
            amount: self.amount,
            category: self.category.clone(),
            date: self.date,
            description: self.description.clone(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

/// Transaction fields supplied by a caller before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub description: String,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionKind,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            amount,
            category: category.into(),
            date,
            description: description.into(),
        }
    }

    pub fn income(
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self::new(TransactionKind::Income, amount, category, date, description)
    }

    pub fn expense(
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self::new(TransactionKind::Expense, amount, category, date, description)
    }
}

/// Partial update for an existing transaction. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub kind: Option<TransactionKind>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl TransactionPatch {
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == TransactionPatch::default()
    }
}

impl From<NewTransaction> for TransactionPatch {
    fn from(record: NewTransaction) -> Self {
        Self {
            kind: Some(record.kind),
            amount: Some(record.amount),
            category: Some(record.category),
            date: Some(record.date),
            description: Some(record.description),
        }
    }
}

pub fn sort_key_for(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Stable sort, newest first. Equal keys keep their relative order.
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));
}

pub fn is_sorted_newest_first(transactions: &[Transaction]) -> bool {
    transactions
        .windows(2)
        .all(|pair| pair[0].sort_key >= pair[1].sort_key)
}
