use std::{
    fs, io,
    path::{Path, PathBuf},
};

use engine::{EngineError, ResultEngine, Snapshot, Storage};

/// Keeps the bill as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(path: &Path, err: io::Error) -> EngineError {
    EngineError::Storage(format!("{}: {err}", path.display()))
}

impl Storage for FileStorage {
    fn load(&self) -> ResultEngine<Option<Snapshot>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(storage_error(&self.path, err)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        Snapshot::from_json(&content).map(Some)
    }

    fn save(&mut self, snapshot: &Snapshot) -> ResultEngine<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| storage_error(parent, err))?;
        }
        let payload = snapshot.to_json()?;
        fs::write(&self.path, payload).map_err(|err| storage_error(&self.path, err))
    }
}
