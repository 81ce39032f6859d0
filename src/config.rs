use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

use crate::backend::LocalBackend;
use crate::messages::Lang;

pub const HOME_VAR: &str = "PASSGUARDIAN_HOME";
pub const LANG_VAR: &str = "PASSGUARDIAN_LANG";
pub const CLIPBOARD_VAR: &str = "PASSGUARDIAN_CLIPBOARD_SECS";

const DEFAULT_CLIPBOARD_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the local database and session.
    pub data_dir: PathBuf,
    pub lang: Lang,
    /// How long a copied password stays on the clipboard; zero keeps it.
    pub clipboard_clear: Duration,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = match lookup(HOME_VAR).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let lang = match lookup(LANG_VAR).filter(|v| !v.is_empty()) {
            Some(code) => code.parse().map_err(|e: String| anyhow!(e))?,
            None => Lang::default(),
        };

        let secs = match lookup(CLIPBOARD_VAR).filter(|v| !v.is_empty()) {
            Some(secs) => secs
                .trim()
                .parse()
                .with_context(|| format!("{CLIPBOARD_VAR} must be a number of seconds"))?,
            None => DEFAULT_CLIPBOARD_SECS,
        };

        Ok(Self {
            data_dir,
            lang,
            clipboard_clear: Duration::from_secs(secs),
        })
    }

    pub fn backend(&self) -> LocalBackend {
        LocalBackend::new(&self.data_dir)
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "passguardian")
        .context("could not determine platform directories")?;

    Ok(project_dirs.data_dir().to_path_buf())
}
