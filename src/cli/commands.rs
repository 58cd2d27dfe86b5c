use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "todo",
    about = concat!("todos v", env!("CARGO_PKG_VERSION"), " - tasks as plain files"),
    version
)]
pub struct Cli {
    /// Subcommand to run (default: list)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Require dates in the configured format; reject informal phrases
    /// such as "tomorrow"
    #[arg(long, global = true)]
    pub no_human_time: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new task
    New(NewArgs),
    /// Show details about a task
    Show(ShowArgs),
    /// Edit a task interactively
    Edit(EditArgs),
    /// Mark one or more tasks as done
    Done(DoneArgs),
    /// List unfinished tasks (plus recently finished ones)
    List(ListArgs),
}

#[derive(Args)]
pub struct NewArgs {
    /// Task summary (words are joined with spaces)
    pub summary: Vec<String>,
    /// The list to create the task in
    #[arg(short, long)]
    pub list: String,
    /// Due date, in the configured date format (or informal, e.g. "tomorrow")
    #[arg(short, long, default_value = "")]
    pub due: String,
    /// Go into interactive mode before saving the task
    #[arg(short, long)]
    pub interactive: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task id from the last listing
    pub id: u32,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id from the last listing
    pub id: u32,
}

#[derive(Args)]
pub struct DoneArgs {
    /// Task ids from the last listing
    #[arg(required = true)]
    pub ids: Vec<u32>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Lists to show (default: all)
    pub lists: Vec<String>,
}
