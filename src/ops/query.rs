use std::cmp::Ordering;

use chrono::{DateTime, Duration, Local};

use crate::io::collection::Collection;
use crate::io::store::Store;
use crate::model::Todo;

/// How long completed tasks stay visible in listings
const DONE_WINDOW_DAYS: i64 = 7;

/// Error type for the listing pipeline
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("no such list '{name}'. Available lists are: {available}")]
    UnknownList { name: String, available: String },
}

/// Whether a task belongs in the listing at all.
///
/// Open tasks always show. Completed tasks show for a trailing window of
/// seven days so a just-finished task does not vanish immediately; a
/// task completed exactly seven days ago has aged out.
pub fn is_visible(todo: &Todo, now: DateTime<Local>) -> bool {
    if !todo.completed {
        return true;
    }
    match todo.completed_at {
        Some(completed_at) => completed_at > now - Duration::days(DONE_WINDOW_DAYS),
        None => false,
    }
}

/// Display order for the listing: highest priority first.
///
/// Open tasks come before recently-completed ones; among open tasks,
/// dated tasks before undated and earlier due dates first (so overdue
/// tasks top the list). Summary then filename break remaining ties,
/// making the order total and reproducible across invocations.
pub fn priority_cmp(a: &Todo, b: &Todo) -> Ordering {
    let open = |t: &Todo| !t.completed;
    open(b)
        .cmp(&open(a))
        .then_with(|| b.due.is_some().cmp(&a.due.is_some()))
        .then_with(|| match (a.due, b.due) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => Ordering::Equal,
        })
        .then_with(|| a.summary.cmp(&b.summary))
        .then_with(|| a.filename.cmp(&b.filename))
}

/// Select and order the tasks for a listing.
///
/// With no name filters every list is included; otherwise each name must
/// exist in the collection or the whole operation fails with a parameter
/// error naming the valid choices.
pub fn select<'a>(
    collection: &'a Collection,
    names: &[String],
    now: DateTime<Local>,
) -> Result<Vec<(&'a Store, &'a Todo)>, QueryError> {
    let stores: Vec<&Store> = if names.is_empty() {
        collection.stores().collect()
    } else {
        names
            .iter()
            .map(|name| {
                collection.get(name).ok_or_else(|| QueryError::UnknownList {
                    name: name.clone(),
                    available: collection.names().join(", "),
                })
            })
            .collect::<Result<_, _>>()?
    };

    let mut rows: Vec<(&Store, &Todo)> = stores
        .iter()
        .flat_map(|store| store.todos().map(move |todo| (*store, todo)))
        .filter(|(_, todo)| is_visible(todo, now))
        .collect();

    rows.sort_by(|a, b| priority_cmp(a.1, b.1));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::Store;
    use std::fs;
    use tempfile::TempDir;

    fn todo(summary: &str, filename: &str) -> Todo {
        let mut t = Todo::new(summary.into(), None);
        t.filename = Some(filename.into());
        t
    }

    #[test]
    fn open_tasks_are_always_visible() {
        let now = Local::now();
        assert!(is_visible(&todo("open", "a.toml"), now));
    }

    #[test]
    fn done_window_boundary_is_strict() {
        let now = Local::now();
        let mut aged_out = todo("old", "a.toml");
        aged_out.set_complete(now - Duration::days(DONE_WINDOW_DAYS));
        assert!(!is_visible(&aged_out, now));

        let mut just_inside = todo("recent", "b.toml");
        just_inside.set_complete(now - Duration::days(DONE_WINDOW_DAYS) + Duration::seconds(1));
        assert!(is_visible(&just_inside, now));
    }

    #[test]
    fn completed_without_timestamp_is_hidden() {
        // Shouldn't happen via set_complete, but a hand-edited file can
        let mut t = todo("odd", "a.toml");
        t.completed = true;
        assert!(!is_visible(&t, Local::now()));
    }

    #[test]
    fn open_sorts_before_done() {
        let now = Local::now();
        let open = todo("zzz", "z.toml");
        let mut done = todo("aaa", "a.toml");
        done.set_complete(now);
        assert_eq!(priority_cmp(&open, &done), Ordering::Less);
    }

    #[test]
    fn dated_sorts_before_undated_and_earlier_first() {
        let now = Local::now();
        let mut soon = todo("soon", "a.toml");
        soon.due = Some(now + Duration::days(1));
        let mut later = todo("later", "b.toml");
        later.due = Some(now + Duration::days(5));
        let undated = todo("anytime", "c.toml");

        assert_eq!(priority_cmp(&soon, &later), Ordering::Less);
        assert_eq!(priority_cmp(&later, &undated), Ordering::Less);
    }

    #[test]
    fn ties_break_on_summary_then_filename() {
        let a = todo("same", "a.toml");
        let b = todo("same", "b.toml");
        assert_eq!(priority_cmp(&a, &b), Ordering::Less);

        let x = todo("alpha", "z.toml");
        let y = todo("beta", "a.toml");
        assert_eq!(priority_cmp(&x, &y), Ordering::Less);
    }

    fn fixture(tmp: &TempDir) -> Collection {
        let now = Local::now();
        let mut collection = Collection::default();
        for (list, entries) in [
            ("work", vec![("report", Some(now + Duration::days(1)), false)]),
            (
                "home",
                vec![
                    ("groceries", None, false),
                    ("old chore", None, true),
                ],
            ),
        ] {
            let dir = tmp.path().join(list);
            fs::create_dir_all(&dir).unwrap();
            let mut store = Store::open(&dir).unwrap();
            for (summary, due, done_long_ago) in entries {
                let mut t = Todo::new(summary.into(), due);
                if done_long_ago {
                    t.set_complete(now - Duration::days(30));
                }
                store.save(&mut t).unwrap();
            }
            collection.insert(store).unwrap();
        }
        collection
    }

    #[test]
    fn select_unions_all_lists_and_filters() {
        let tmp = TempDir::new().unwrap();
        let collection = fixture(&tmp);

        let rows = select(&collection, &[], Local::now()).unwrap();
        let summaries: Vec<&str> = rows.iter().map(|(_, t)| t.summary.as_str()).collect();
        // "old chore" aged out; dated "report" outranks undated "groceries"
        assert_eq!(summaries, vec!["report", "groceries"]);
    }

    #[test]
    fn select_narrows_to_named_lists() {
        let tmp = TempDir::new().unwrap();
        let collection = fixture(&tmp);

        let rows = select(&collection, &["home".into()], Local::now()).unwrap();
        let summaries: Vec<&str> = rows.iter().map(|(_, t)| t.summary.as_str()).collect();
        assert_eq!(summaries, vec!["groceries"]);
    }

    #[test]
    fn select_rejects_unknown_list_names() {
        let tmp = TempDir::new().unwrap();
        let collection = fixture(&tmp);

        let err = select(&collection, &["errands".into()], Local::now()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("errands"));
        assert!(msg.contains("home, work"));
    }
}
