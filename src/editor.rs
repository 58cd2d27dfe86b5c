use std::fs;
use std::io::Write;
use std::process::Command;

use crate::dates::{DateError, DateParser};
use crate::model::Todo;

/// Error type for interactive editing
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("could not launch editor '{editor}': {source}")]
    Launch {
        editor: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Date(#[from] DateError),
    #[error("editor session failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A blocking interactive editing session over a draft task.
///
/// Returns whether the session ended in a save. On `Ok(false)` the
/// caller must not persist anything.
pub trait TodoEditor {
    fn edit(&self, todo: &mut Todo, lists: &[String]) -> Result<bool, EditorError>;
}

/// Edits a task by handing a small key/value form to `$VISUAL` or
/// `$EDITOR` (falling back to `vi`). The editor owns the terminal until
/// it exits; a nonzero exit status counts as cancellation.
pub struct ExternalEditor {
    parser: DateParser,
}

impl ExternalEditor {
    pub fn new(parser: DateParser) -> Self {
        ExternalEditor { parser }
    }

    fn editor_command() -> String {
        std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .unwrap_or_else(|_| "vi".to_string())
    }
}

impl TodoEditor for ExternalEditor {
    fn edit(&self, todo: &mut Todo, lists: &[String]) -> Result<bool, EditorError> {
        let mut file = tempfile::Builder::new()
            .prefix("todo-edit-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(render_form(todo, lists, &self.parser)?.as_bytes())?;
        file.flush()?;

        let command = Self::editor_command();
        let mut parts = command.split_whitespace();
        let program = parts.next().unwrap_or("vi");
        let status = Command::new(program)
            .args(parts)
            .arg(file.path())
            .status()
            .map_err(|e| EditorError::Launch {
                editor: command.clone(),
                source: e,
            })?;
        if !status.success() {
            return Ok(false);
        }

        let text = fs::read_to_string(file.path())?;
        apply_form(&text, todo, &self.parser)?;
        Ok(true)
    }
}

/// Render the editable form for a task
fn render_form(todo: &Todo, lists: &[String], parser: &DateParser) -> Result<String, DateError> {
    let due = match todo.due {
        Some(due) => parser.format(&due)?,
        None => String::new(),
    };
    Ok(format!(
        "# Edit the task, then save and quit to apply.\n\
         # Lines starting with '#' are ignored. Clear 'due' to remove the date.\n\
         # Available lists: {}\n\
         summary: {}\n\
         due: {}\n",
        lists.join(", "),
        todo.summary,
        due
    ))
}

/// Apply an edited form back onto the task
fn apply_form(text: &str, todo: &mut Todo, parser: &DateParser) -> Result<(), DateError> {
    let mut summary = String::new();
    let mut due = None;
    for line in text.lines() {
        if line.starts_with('#') {
            continue;
        }
        if let Some(value) = line.strip_prefix("summary:") {
            summary = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("due:") {
            due = parser.parse(value)?;
        }
    }
    todo.summary = summary;
    todo.due = due;
    Ok(())
}
