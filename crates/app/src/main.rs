use std::io;

use clap::Parser;
use engine::{Source, share};

use crate::{
    cli::{Cli, Command},
    settings::Settings,
    storage::FileStorage,
};

mod cli;
mod commands;
mod error;
mod render;
mod settings;
mod startup;
mod storage;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.settings)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "splitbill={level},engine={level}",
            level = settings.level
        ))
        .with_writer(io::stderr)
        .init();

    let mut storage = FileStorage::new(&settings.state_path);
    tracing::debug!("using {}", storage.path().display());

    let resolution = startup::start(
        &storage,
        cli.share.as_deref(),
        settings.undo_limit,
        |conflict| match cli.prefer {
            Some(prefer) => Ok(prefer.into()),
            None => startup::ask(conflict, &mut io::stdin().lock(), &mut io::stderr()),
        },
    )?;

    if resolution.clear_shared_link
        && let Some(query) = &cli.share
    {
        let rest = share::clear(query);
        if rest.is_empty() {
            eprintln!("Kept the saved bill: run without --share from now on.");
        } else {
            eprintln!("Kept the saved bill: pass --share \"{rest}\" from now on.");
        }
    }

    let mut store = resolution.store;
    let command = cli.command.unwrap_or(Command::Show);
    let outcome = commands::apply(&mut store, &command, settings.persist_undo)?;

    if (outcome.changed || resolution.source == Some(Source::SharedLink))
        && !store.persist(&mut storage, settings.persist_undo)
    {
        eprintln!(
            "Could not save the bill to {}, changes are lost on exit.",
            storage.path().display()
        );
    }

    println!("{}", outcome.output.trim_end());
    Ok(())
}
