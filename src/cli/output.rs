use colored::{ColoredString, Colorize};
use std::fmt;
use std::sync::{OnceLock, RwLock};

use crate::ledger::{BudgetTier, TransactionKind};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OutputPreferences {
    /// Bright palette for dark terminals.
    pub dark_mode: bool,
    pub plain: bool,
}

static PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

pub fn set_preferences(prefs: OutputPreferences) {
    let lock = PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()));
    if let Ok(mut guard) = lock.write() {
        *guard = prefs;
    }
}

fn preferences() -> OutputPreferences {
    PREFERENCES
        .get_or_init(|| RwLock::new(OutputPreferences::default()))
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

#[derive(Clone, Copy)]
enum Tone {
    Positive,
    Caution,
    Negative,
    Accent,
}

fn paint(text: &str, tone: Tone, prefs: &OutputPreferences) -> ColoredString {
    if prefs.plain {
        return text.normal();
    }
    match (tone, prefs.dark_mode) {
        (Tone::Positive, true) => text.bright_green(),
        (Tone::Positive, false) => text.green(),
        (Tone::Caution, true) => text.bright_yellow(),
        (Tone::Caution, false) => text.yellow(),
        (Tone::Negative, true) => text.bright_red(),
        (Tone::Negative, false) => text.red(),
        (Tone::Accent, true) => text.bright_cyan(),
        (Tone::Accent, false) => text.blue(),
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display, prefs: &OutputPreferences) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => {
            let heading = format!("=== {} ===", text.trim());
            if prefs.plain {
                heading
            } else {
                heading.bold().to_string()
            }
        }
        MessageKind::Info => text,
        MessageKind::Success => paint(&format!("[ok] {text}"), Tone::Positive, prefs).to_string(),
        MessageKind::Warning => paint(&format!("[!] {text}"), Tone::Caution, prefs).to_string(),
        MessageKind::Error => paint(&format!("[x] {text}"), Tone::Negative, prefs).to_string(),
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let prefs = preferences();
    let formatted = apply_style(kind, message, &prefs);
    match kind {
        MessageKind::Section => println!("\n{formatted}"),
        MessageKind::Error => eprintln!("{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Signed, two-decimal amount coloured by direction.
pub fn amount(kind: TransactionKind, value: f64) -> String {
    let prefs = preferences();
    let painted = match kind {
        TransactionKind::Income => paint(&format!("+${value:.2}"), Tone::Positive, &prefs),
        TransactionKind::Expense => paint(&format!("-${value:.2}"), Tone::Negative, &prefs),
    };
    painted.to_string()
}

/// Balance coloured by sign.
pub fn balance(value: f64) -> String {
    let prefs = preferences();
    let tone = if value < 0.0 {
        Tone::Negative
    } else {
        Tone::Positive
    };
    paint(&format!("${value:.2}"), tone, &prefs).to_string()
}

pub fn tier(tier: BudgetTier, text: &str) -> String {
    let prefs = preferences();
    let tone = match tier {
        BudgetTier::Normal => Tone::Positive,
        BudgetTier::Warning => Tone::Caution,
        BudgetTier::Danger => Tone::Negative,
    };
    paint(text, tone, &prefs).to_string()
}

pub fn accent(text: &str) -> String {
    paint(text, Tone::Accent, &preferences()).to_string()
}
