use std::path::PathBuf;

use chrono::Local;

use crate::cli::commands::*;
use crate::cli::output;
use crate::dates::DateParser;
use crate::editor::{ExternalEditor, TodoEditor};
use crate::io::collection::Collection;
use crate::io::config_io;
use crate::io::index::{self, IndexCache};
use crate::model::Todo;
use crate::ops::query::{self, QueryError};

/// Everything a command needs, built once per invocation: the parsed
/// config, the discovered collection and the date parser. Duplicate
/// list names or a broken config abort here, before any command runs.
pub struct Context {
    pub collection: Collection,
    pub parser: DateParser,
    pub cache_path: PathBuf,
}

impl Context {
    pub fn load(human_time: bool) -> Result<Context, Box<dyn std::error::Error>> {
        let config = config_io::load_config()?;
        let pattern = config_io::expand_user(&config.path);
        let collection = Collection::discover(&pattern.to_string_lossy())?;
        let parser = DateParser::new(&config.date_format, human_time);
        let cache_path = config_io::cache_path(&config);
        Ok(Context {
            collection,
            parser,
            cache_path,
        })
    }

    fn owned_names(&self) -> Vec<String> {
        self.collection
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = Context::load(!cli.no_human_time)?;

    match cli.command {
        // No subcommand → plain listing
        None => cmd_list(ListArgs { lists: Vec::new() }, &ctx),
        Some(cmd) => match cmd {
            Commands::New(args) => cmd_new(args, &mut ctx),
            Commands::Show(args) => cmd_show(args, &ctx),
            Commands::Edit(args) => cmd_edit(args, &mut ctx),
            Commands::Done(args) => cmd_done(args, &mut ctx),
            Commands::List(args) => cmd_list(args, &ctx),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_list(args: ListArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let now = Local::now();
    let rows = query::select(&ctx.collection, &args.lists, now)?;

    let mut cache = IndexCache::default();
    for (position, (store, todo)) in (1u32..).zip(rows.iter()) {
        let filename = todo.filename.as_deref().unwrap_or_default();
        // Errored rows still get their position recorded: the row was
        // assigned, the task exists, only its display failed.
        cache.insert(position, store.name(), filename);
        match output::compact(todo, &ctx.parser, now) {
            Ok(line) => println!("{}", output::numbered(position, &line)),
            Err(e) => println!("{}", output::render_error(store.name(), filename, &e)),
        }
    }

    index::write_index(&ctx.cache_path, &cache)?;
    Ok(())
}

fn cmd_new(args: NewArgs, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
    let due = ctx.parser.parse(&args.due)?;
    if !ctx.collection.contains(&args.list) {
        return Err(Box::new(QueryError::UnknownList {
            name: args.list.clone(),
            available: ctx.collection.names().join(", "),
        }));
    }

    let mut todo = Todo::new(args.summary.join(" "), due);

    if args.interactive {
        let editor = ExternalEditor::new(ctx.parser.clone());
        if !editor.edit(&mut todo, &ctx.owned_names())? {
            eprintln!("aborted.");
            std::process::exit(1);
        }
    }

    if todo.summary.trim().is_empty() {
        return Err("no SUMMARY specified".into());
    }

    let store = ctx
        .collection
        .get_mut(&args.list)
        .expect("list checked above");
    store.save(&mut todo)?;

    for line in output::detailed(&todo, &args.list, &ctx.parser)? {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let cache = index::read_index(&ctx.cache_path);
    let (list, todo) = cache.resolve(args.id, &ctx.collection)?;
    for line in output::detailed(&todo, &list, &ctx.parser)? {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_edit(args: EditArgs, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
    let cache = index::read_index(&ctx.cache_path);
    let (list, mut todo) = cache.resolve(args.id, &ctx.collection)?;

    let editor = ExternalEditor::new(ctx.parser.clone());
    if !editor.edit(&mut todo, &ctx.owned_names())? {
        // Cancelled: leave the record untouched
        return Ok(());
    }
    if todo.summary.trim().is_empty() {
        return Err("no SUMMARY specified".into());
    }

    let store = ctx
        .collection
        .get_mut(&list)
        .expect("resolve returned this list");
    store.save(&mut todo)?;
    Ok(())
}

fn cmd_done(args: DoneArgs, ctx: &mut Context) -> Result<(), Box<dyn std::error::Error>> {
    let cache = index::read_index(&ctx.cache_path);
    let now = Local::now();

    // Each id succeeds or fails on its own; one stale id must not stop
    // the rest of the batch.
    let mut failed = 0usize;
    for &id in &args.ids {
        match cache.resolve(id, &ctx.collection) {
            Ok((list, mut todo)) => {
                todo.set_complete(now);
                let store = ctx
                    .collection
                    .get_mut(&list)
                    .expect("resolve returned this list");
                if let Err(e) = store.save(&mut todo) {
                    eprintln!("error: {}", e);
                    failed += 1;
                }
            }
            Err(e) => {
                eprintln!("error: {}", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(format!(
            "{} of {} task(s) could not be completed",
            failed,
            args.ids.len()
        )
        .into());
    }
    Ok(())
}
