use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::Source;

#[derive(Parser, Debug)]
#[command(name = "splitbill")]
#[command(about = "Split a restaurant bill by who had what")]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Start from a shared bill (the query string of a shared link).
    #[arg(long, global = true)]
    pub share: Option<String>,

    /// Which bill to keep when both a shared and a saved one exist.
    #[arg(long, value_enum, global = true)]
    pub prefer: Option<Prefer>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Overrides for the file and environment settings.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Where the bill is saved between runs.
    #[arg(long, global = true)]
    pub state_path: Option<String>,
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub level: Option<String>,
    /// How many deletions can be undone.
    #[arg(long, global = true)]
    pub undo_limit: Option<usize>,
    /// Whether the saved bill keeps the undo history.
    #[arg(long, global = true)]
    pub persist_undo: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Prefer {
    Shared,
    Saved,
}

impl From<Prefer> for Source {
    fn from(prefer: Prefer) -> Self {
        match prefer {
            Prefer::Shared => Source::SharedLink,
            Prefer::Saved => Source::Storage,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the bill.
    Show,
    Person(PersonArgs),
    Item(ItemArgs),
    /// Set how many units of an item a person had (0 removes them).
    Assign {
        item: String,
        person: String,
        quantity: String,
    },
    /// Give one unit of an item to everybody.
    Split { item: String },
    /// Remove everybody from an item.
    Clear { item: String },
    /// Redistribute every item at random, keeping its assigned units.
    Shuffle,
    /// Restore the last removed person or item.
    Undo,
    /// Set the tax percentage.
    Tax { percent: String },
    /// Set the tip percentage.
    Tip { percent: String },
    /// Swap rows and columns of the printed table.
    Transpose,
    /// Start over with an empty bill.
    Reset,
    /// Print the bill as a shareable query string.
    Share,
    Export(ExportArgs),
    /// Replace the bill with a JSON export.
    Import { path: PathBuf },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct PersonArgs {
    #[command(subcommand)]
    pub command: PersonCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum PersonCommand {
    Add { name: String },
    Remove { name: String },
    Rename { name: String, new_name: String },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ItemArgs {
    #[command(subcommand)]
    pub command: ItemCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ItemCommand {
    Add {
        name: String,
        price: String,
    },
    Remove {
        name: String,
    },
    /// Change the name and/or the price of an item.
    Rename {
        name: String,
        #[arg(long)]
        new_name: Option<String>,
        #[arg(long)]
        price: Option<String>,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ExportArgs {
    /// Full bill as JSON, importable back (default).
    #[arg(long, conflicts_with = "csv")]
    pub json: bool,
    /// The printed table as CSV.
    #[arg(long)]
    pub csv: bool,
    /// With `--csv`, per-person totals instead of the table.
    #[arg(long, requires = "csv")]
    pub totals: bool,
    /// Write to a file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}
