use crate::commands::common::{open_app, resolve_note_content};
use crate::error::CliError;

pub async fn run_add(content_parts: &[String], important: bool) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;

    let mut app = open_app().await?;
    let note = app.add_note(&content, important).await?;

    println!("{}", note.id);
    Ok(())
}
