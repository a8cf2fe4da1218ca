//! Picks the bill to work on from `--share` and the saved file.

use std::io::{BufRead, Write};

use engine::{Conflict, Resolution, Snapshot, Source, Startup, Storage, reconcile, share};

use crate::error::Result;

fn describe(snapshot: &Snapshot) -> String {
    let saved_at = snapshot
        .saved_at
        .map(|at| format!(", saved {}", at.format("%Y-%m-%d %H:%M UTC")))
        .unwrap_or_default();
    format!(
        "{} people, {} items{saved_at}",
        snapshot.people.len(),
        snapshot.items.len()
    )
}

/// Reads an answer to the "which bill" question.
pub fn parse_choice(answer: &str) -> Option<Source> {
    match answer.trim().to_lowercase().as_str() {
        "" | "shared" | "s" | "link" | "l" => Some(Source::SharedLink),
        "saved" | "k" | "keep" => Some(Source::Storage),
        _ => None,
    }
}

/// Asks on `output` until `input` gives a valid answer. End of input keeps
/// the saved bill.
pub fn ask(conflict: &Conflict, input: &mut impl BufRead, output: &mut impl Write) -> Result<Source> {
    writeln!(output, "A shared bill and a saved bill both exist.")?;
    writeln!(output, "  shared: {}", describe(conflict.shared()))?;
    writeln!(output, "  saved:  {}", describe(conflict.saved()))?;
    loop {
        write!(output, "Open the [s]hared bill or [k]eep the saved one? [s] ")?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(Source::Storage);
        }
        if let Some(choice) = parse_choice(&answer) {
            return Ok(choice);
        }
    }
}

/// Loads the saved bill and reconciles it with `shared_query`.
///
/// A saved file that can't be read, or holds a bill that fails validation, is
/// reported and ignored, so a broken file never prevents starting.
pub fn start(
    storage: &impl Storage,
    shared_query: Option<&str>,
    undo_limit: usize,
    choose: impl FnOnce(&Conflict) -> Result<Source>,
) -> Result<Resolution> {
    let shared = shared_query.and_then(|query| {
        let decoded = share::decode(query);
        if decoded.is_none() {
            tracing::warn!("--share holds no bill, ignoring it");
        }
        decoded
    });
    let saved = storage
        .load()
        .and_then(|saved| match saved {
            Some(snapshot) => snapshot
                .clone()
                .into_store(undo_limit)
                .map(|_| Some(snapshot)),
            None => Ok(None),
        })
        .unwrap_or_else(|err| {
            tracing::warn!("ignoring the saved bill: {err}");
            None
        });

    match reconcile(shared, saved, undo_limit)? {
        Startup::Ready(resolution) => Ok(resolution),
        Startup::Conflict(conflict) => {
            let choice = choose(&conflict)?;
            Ok(conflict.resolve(choice)?)
        }
    }
}
