use quill_core::app::NoteFilter;

use crate::commands::common::{format_note_lines, note_to_list_item, open_app, NoteListItem};
use crate::error::CliError;

pub async fn run_list(
    important_only: bool,
    as_json: bool,
    limit: Option<usize>,
) -> Result<(), CliError> {
    let mut app = open_app().await?;
    app.set_filter(NoteFilter::from_show_all(!important_only));

    let visible = app.state().visible_notes();
    let shown = match limit {
        Some(limit) => &visible[..visible.len().min(limit)],
        None => &visible[..],
    };

    if as_json {
        let items = shown
            .iter()
            .map(|note| note_to_list_item(note))
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_note_lines(shown) {
            println!("{line}");
        }
    }

    Ok(())
}
