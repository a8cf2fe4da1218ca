//! Settings for the shell.
//!
//! Read from an optional TOML file (`config/splitbill.toml` unless `--config`
//! says otherwise), then from `SPLITBILL_*` environment variables, then from
//! the command line.

use serde::Deserialize;

use crate::{cli::SettingsArgs, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/splitbill.toml";
const DEFAULT_STATE_PATH: &str = "config/splitbill_state.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub state_path: String,
    pub level: String,
    pub undo_limit: usize,
    pub persist_undo: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            state_path: DEFAULT_STATE_PATH.to_string(),
            level: "info".to_string(),
            undo_limit: engine::DEFAULT_UNDO_LIMIT,
            persist_undo: true,
        }
    }
}

impl Settings {
    pub fn load(args: &SettingsArgs) -> Result<Self> {
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut builder = config::Config::builder();
        builder = builder.add_source(config::File::with_name(config_path).required(false));
        builder = builder.add_source(config::Environment::with_prefix("SPLITBILL").try_parsing(true));
        let mut settings: Settings = builder.build()?.try_deserialize()?;

        if let Some(state_path) = &args.state_path {
            settings.state_path = state_path.clone();
        }
        if let Some(level) = &args.level {
            settings.level = level.clone();
        }
        if let Some(undo_limit) = args.undo_limit {
            settings.undo_limit = undo_limit;
        }
        if let Some(persist_undo) = args.persist_undo {
            settings.persist_undo = persist_undo;
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn args_with_config(path: &std::path::Path) -> SettingsArgs {
        SettingsArgs {
            config: Some(path.display().to_string()),
            ..SettingsArgs::default()
        }
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&args_with_config(&dir.path().join("none.toml"))).unwrap();
        assert_eq!(settings.undo_limit, 10);
        assert!(settings.persist_undo);
        assert_eq!(settings.state_path, DEFAULT_STATE_PATH);
    }

    #[test]
    fn file_then_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("splitbill.toml");
        fs::write(
            &path,
            "state_path = \"bill.json\"\nundo_limit = 3\npersist_undo = false\n",
        )
        .unwrap();

        let mut args = args_with_config(&path);
        args.undo_limit = Some(5);
        args.level = Some("debug".to_string());
        let settings = Settings::load(&args).unwrap();

        assert_eq!(settings.state_path, "bill.json");
        assert_eq!(settings.undo_limit, 5);
        assert!(!settings.persist_undo);
        assert_eq!(settings.level, "debug");
    }
}
