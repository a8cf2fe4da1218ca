//! Choosing the starting bill when both a shared link and a saved bill exist.
//!
//! | shared link | saved bill | outcome                                  |
//! |-------------|------------|------------------------------------------|
//! | no          | no         | empty bill                               |
//! | yes         | no         | shared bill, undo log empty              |
//! | no          | yes        | saved bill, undo log kept                |
//! | yes         | yes        | [`Startup::Conflict`]: ask the user      |
//!
//! The chosen source replaces everything; the two are never merged. When
//! the user keeps the saved bill the caller must drop the link parameters
//! (see [`Resolution::clear_shared_link`] and [`share::clear`]) so the
//! question isn't asked again on the next load.
//!
//! [`share::clear`]: crate::share::clear

use std::fmt;

use crate::{BillStore, ResultEngine, snapshot::Snapshot};

/// Where the starting bill came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    SharedLink,
    Storage,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedLink => f.write_str("shared link"),
            Self::Storage => f.write_str("saved bill"),
        }
    }
}

/// The bill to start with.
#[derive(Debug)]
pub struct Resolution {
    pub store: BillStore,
    /// `None` when starting from an empty bill.
    pub source: Option<Source>,
    /// The link parameters must be removed from the transport.
    pub clear_shared_link: bool,
}

/// Outcome of [`reconcile`].
#[derive(Debug)]
pub enum Startup {
    Ready(Resolution),
    Conflict(Conflict),
}

/// Both sources hold a bill; [`Conflict::resolve`] with the user's choice.
#[derive(Debug)]
pub struct Conflict {
    shared: Snapshot,
    saved: Snapshot,
    undo_limit: usize,
}

impl Conflict {
    pub fn shared(&self) -> &Snapshot {
        &self.shared
    }

    pub fn saved(&self) -> &Snapshot {
        &self.saved
    }

    pub fn resolve(self, choice: Source) -> ResultEngine<Resolution> {
        tracing::info!("startup conflict resolved in favour of the {choice}");
        match choice {
            Source::SharedLink => from_shared(self.shared, self.undo_limit),
            Source::Storage => {
                let mut resolution = from_saved(self.saved, self.undo_limit)?;
                resolution.clear_shared_link = true;
                Ok(resolution)
            }
        }
    }
}

fn from_shared(snapshot: Snapshot, undo_limit: usize) -> ResultEngine<Resolution> {
    let mut store = snapshot.into_store(undo_limit)?;
    store.clear_undo();
    Ok(Resolution {
        store,
        source: Some(Source::SharedLink),
        clear_shared_link: false,
    })
}

fn from_saved(snapshot: Snapshot, undo_limit: usize) -> ResultEngine<Resolution> {
    Ok(Resolution {
        store: snapshot.into_store(undo_limit)?,
        source: Some(Source::Storage),
        clear_shared_link: false,
    })
}

/// Decides the starting bill. Snapshots holding neither people nor items
/// count as absent.
pub fn reconcile(
    shared: Option<Snapshot>,
    saved: Option<Snapshot>,
    undo_limit: usize,
) -> ResultEngine<Startup> {
    let shared = shared.filter(|s| !s.is_empty());
    let saved = saved.filter(|s| !s.is_empty());

    let startup = match (shared, saved) {
        (None, None) => Startup::Ready(Resolution {
            store: BillStore::builder().undo_limit(undo_limit).build(),
            source: None,
            clear_shared_link: false,
        }),
        (Some(shared), None) => Startup::Ready(from_shared(shared, undo_limit)?),
        (None, Some(saved)) => Startup::Ready(from_saved(saved, undo_limit)?),
        (Some(shared), Some(saved)) => Startup::Conflict(Conflict {
            shared,
            saved,
            undo_limit,
        }),
    };

    match &startup {
        Startup::Ready(resolution) => match resolution.source {
            Some(source) => tracing::info!("starting from the {source}"),
            None => tracing::info!("starting from an empty bill"),
        },
        Startup::Conflict(_) => tracing::info!("both a shared link and a saved bill found"),
    }
    Ok(startup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share;

    fn saved() -> Snapshot {
        let mut store = BillStore::default();
        let amy = store.add_person("Amy").unwrap();
        store.add_person("Bo").unwrap();
        store.remove_person(amy);
        store.snapshot(true)
    }

    fn shared() -> Snapshot {
        share::decode("people=Cy,Dee&items=Pizza:20&q=0-0:1,0-1:1&tax=5").unwrap()
    }

    fn ready(startup: Startup) -> Resolution {
        match startup {
            Startup::Ready(resolution) => resolution,
            Startup::Conflict(_) => panic!("unexpected conflict"),
        }
    }

    #[test]
    fn nothing_to_load() {
        let resolution = ready(reconcile(None, None, 10).unwrap());
        assert!(resolution.source.is_none());
        assert!(resolution.store.people().is_empty());
    }

    #[test]
    fn only_saved_keeps_undo() {
        let resolution = ready(reconcile(None, Some(saved()), 10).unwrap());
        assert_eq!(resolution.source, Some(Source::Storage));
        assert!(resolution.store.can_undo());
        assert!(!resolution.clear_shared_link);
    }

    #[test]
    fn only_shared_starts_fresh() {
        let mut snapshot = shared();
        snapshot.undo = saved().undo;
        let resolution = ready(reconcile(Some(snapshot), None, 10).unwrap());

        assert_eq!(resolution.source, Some(Source::SharedLink));
        assert!(!resolution.store.can_undo());
        assert_eq!(resolution.store.people().len(), 2);
    }

    #[test]
    fn empty_snapshots_count_as_absent() {
        let empty = BillStore::default().snapshot(false);
        let resolution = ready(reconcile(Some(shared()), Some(empty), 10).unwrap());
        assert_eq!(resolution.source, Some(Source::SharedLink));
    }

    #[test]
    fn conflict_keep_saved_clears_link() {
        let Startup::Conflict(conflict) = reconcile(Some(shared()), Some(saved()), 10).unwrap()
        else {
            panic!("expected a conflict");
        };
        assert_eq!(conflict.shared().people.len(), 2);
        assert_eq!(conflict.saved().people.len(), 1);

        let resolution = conflict.resolve(Source::Storage).unwrap();
        assert!(resolution.clear_shared_link);
        assert_eq!(resolution.store.people()[0].name, "Bo");
        assert!(resolution.store.can_undo());
    }

    #[test]
    fn conflict_take_shared_replaces_everything() {
        let Startup::Conflict(conflict) = reconcile(Some(shared()), Some(saved()), 10).unwrap()
        else {
            panic!("expected a conflict");
        };

        let resolution = conflict.resolve(Source::SharedLink).unwrap();
        assert!(!resolution.clear_shared_link);
        let names: Vec<_> = resolution.store.people().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cy", "Dee"]);
        assert_eq!(resolution.store.config().tax_percent, 5.0);
        assert!(!resolution.store.can_undo());
    }
}
