use chrono::{DateTime, Local};

use crate::dates::{DateError, DateParser};
use crate::model::Todo;

/// Format a task as a one-line listing entry
pub fn compact(todo: &Todo, parser: &DateParser, now: DateTime<Local>) -> Result<String, DateError> {
    let mark = if todo.completed { 'x' } else { ' ' };
    match todo.due {
        Some(due) => {
            let overdue = if !todo.completed && due < now { "!" } else { "" };
            Ok(format!(
                "[{}] {}{} {}",
                mark,
                overdue,
                parser.format(&due)?,
                todo.summary
            ))
        }
        None => Ok(format!("[{}] {}", mark, todo.summary)),
    }
}

/// Prefix a rendered row with its 1-based position
pub fn numbered(position: u32, rendered: &str) -> String {
    format!("{:2} {}", position, rendered)
}

/// The inline error line for a row that failed to render
pub fn render_error(list: &str, filename: &str, err: &DateError) -> String {
    format!("error: could not show {}/{}: {}", list, filename, err)
}

/// Format the detailed multi-line view printed by `show` and `new`
pub fn detailed(todo: &Todo, list: &str, parser: &DateParser) -> Result<Vec<String>, DateError> {
    let mut lines = vec![todo.summary.clone(), String::new()];
    lines.push(format!("List: {}", list));
    if let Some(due) = todo.due {
        lines.push(format!("Due: {}", parser.format(&due)?));
    }
    match todo.completed_at {
        Some(completed_at) if todo.completed => {
            lines.push(format!("Status: done {}", parser.format(&completed_at)?));
        }
        _ => lines.push("Status: open".to_string()),
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn parser() -> DateParser {
        DateParser::new("%Y-%m-%d", true)
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn compact_without_due() {
        let todo = Todo::new("water plants".into(), None);
        let line = compact(&todo, &parser(), at(2026, 8, 28)).unwrap();
        assert_eq!(line, "[ ] water plants");
    }

    #[test]
    fn compact_marks_overdue_open_tasks() {
        let todo = Todo::new("pay rent".into(), Some(at(2026, 8, 1)));
        let line = compact(&todo, &parser(), at(2026, 8, 28)).unwrap();
        assert_eq!(line, "[ ] !2026-08-01 pay rent");
    }

    #[test]
    fn compact_completed_task_has_x_and_no_overdue_flag() {
        let mut todo = Todo::new("pay rent".into(), Some(at(2026, 8, 1)));
        todo.set_complete(at(2026, 8, 2));
        let line = compact(&todo, &parser(), at(2026, 8, 28)).unwrap();
        assert_eq!(line, "[x] 2026-08-01 pay rent");
    }

    #[test]
    fn numbered_rows_are_right_aligned() {
        assert_eq!(numbered(3, "[ ] x"), " 3 [ ] x");
        assert_eq!(numbered(12, "[ ] x"), "12 [ ] x");
    }

    #[test]
    fn compact_surfaces_bad_format_as_error() {
        let bad = DateParser::new("%Y-%J", true);
        let todo = Todo::new("x".into(), Some(at(2026, 8, 1)));
        let err = compact(&todo, &bad, at(2026, 8, 28)).unwrap_err();
        let line = render_error("work", "a.toml", &err);
        assert!(line.starts_with("error: could not show work/a.toml:"));
    }

    #[test]
    fn detailed_view_open_task() {
        let todo = Todo::new("buy milk".into(), Some(at(2026, 9, 1)));
        let lines = detailed(&todo, "home", &parser()).unwrap();
        assert_eq!(
            lines,
            vec![
                "buy milk".to_string(),
                String::new(),
                "List: home".to_string(),
                "Due: 2026-09-01".to_string(),
                "Status: open".to_string(),
            ]
        );
    }

    #[test]
    fn detailed_view_done_task() {
        let mut todo = Todo::new("buy milk".into(), None);
        todo.set_complete(at(2026, 8, 25));
        let lines = detailed(&todo, "home", &parser()).unwrap();
        assert!(lines.contains(&"Status: done 2026-08-25".to_string()));
    }
}
