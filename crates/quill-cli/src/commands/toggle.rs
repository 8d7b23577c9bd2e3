use quill_core::NoteId;

use crate::commands::common::open_app;
use crate::error::CliError;

pub async fn run_toggle(raw_id: &str) -> Result<(), CliError> {
    let id: NoteId = raw_id
        .parse()
        .map_err(|_| CliError::InvalidNoteId(raw_id.to_string()))?;

    let mut app = open_app().await?;
    let updated = app.toggle_importance(id).await?;

    let label = if updated.important {
        "important"
    } else {
        "not important"
    };
    println!("{} is now {label}", updated.id);
    Ok(())
}
