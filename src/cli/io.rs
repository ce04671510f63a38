use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::errors::{Result, TrackerError};
use crate::transfer::{Confirmation, ImportPreview};

use super::output;

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm_action(prompt: &str, default: bool) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|err| TrackerError::InvalidInput(format!("confirmation prompt failed: {err}")))
}

/// Shows what an import would do and asks before committing.
pub fn confirm_import(preview: &ImportPreview, assume_yes: bool) -> Result<Confirmation> {
    report_preview(preview);
    if assume_yes {
        return Ok(Confirmation::Confirmed);
    }
    confirm_action(&preview.summary(), false).map(Confirmation::from)
}

fn report_preview(preview: &ImportPreview) {
    output::info(format!(
        "{} file: {} of {} record(s) valid",
        preview.format,
        preview.accepted.len(),
        preview.attempted
    ));
    if preview.skipped_rows > 0 {
        output::warning(format!(
            "{} line(s) skipped for missing columns",
            preview.skipped_rows
        ));
    }
    for diagnostic in &preview.diagnostics {
        output::warning(diagnostic);
    }
}
