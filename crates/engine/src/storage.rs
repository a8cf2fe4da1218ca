//! Persistence seam.
//!
//! The engine never does I/O by itself: a shell hands a [`Storage`] the
//! snapshot to keep and asks it back at startup. A failing save is not fatal,
//! the in-memory bill stays authoritative and the caller just warns the user.

use crate::{BillStore, EngineError, ResultEngine, snapshot::Snapshot};

pub trait Storage {
    /// Returns the saved snapshot, `None` when nothing was saved yet.
    fn load(&self) -> ResultEngine<Option<Snapshot>>;

    /// Persists `snapshot`, replacing the previous one.
    fn save(&mut self, snapshot: &Snapshot) -> ResultEngine<()>;
}

/// Keeps the snapshot as JSON in memory, optionally refusing payloads
/// larger than a quota (like a browser's local storage does).
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    payload: Option<String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse payloads longer than `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            payload: None,
            quota: Some(bytes),
        }
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> ResultEngine<Option<Snapshot>> {
        self.payload.as_deref().map(Snapshot::from_json).transpose()
    }

    fn save(&mut self, snapshot: &Snapshot) -> ResultEngine<()> {
        let payload = snapshot.to_json()?;
        if let Some(quota) = self.quota
            && payload.len() > quota
        {
            return Err(EngineError::Storage(format!(
                "quota exceeded: {} > {quota} bytes",
                payload.len()
            )));
        }
        self.payload = Some(payload);
        Ok(())
    }
}

impl BillStore {
    /// Saves the bill, logging instead of failing: the in-memory state is
    /// kept either way. Returns `false` when the save failed.
    pub fn persist(&self, storage: &mut impl Storage, include_undo: bool) -> bool {
        match storage.save(&self.snapshot(include_undo)) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("failed to persist bill: {err}");
                false
            }
        }
    }
}
