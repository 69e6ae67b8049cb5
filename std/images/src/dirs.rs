//! Configured image directories.
//!
//! The list is built once at startup and, when it follows the client's MCP
//! roots, replaced wholesale on each roots change. Readers take an
//! [`Arc`] snapshot per request and never see a half-built list.

use crate::{error::ConfigError, validate::normalize_dir};
use std::{future::Future, path::PathBuf, sync::Arc};
use tokio::sync::{Mutex, RwLock};

/// Where the directory list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectorySource {
    /// A single directory that must exist at startup.
    Fixed(PathBuf),
    /// Directories given on the command line.
    Flag(Vec<PathBuf>),
    /// Directories announced by the client through the roots capability.
    ClientRoots,
}

/// Shared, swappable list of search directories in priority order.
#[derive(Debug, Clone)]
pub struct DirectoryList {
    dirs: Arc<RwLock<Arc<[PathBuf]>>>,
    refresh: Arc<Mutex<()>>,
    follows_roots: bool,
}

impl DirectoryList {
    /// Build the list for a configuration source.
    ///
    /// A [`DirectorySource::Fixed`] directory is validated here and any
    /// problem is fatal.
    pub fn from_source(source: DirectorySource) -> Result<Self, ConfigError> {
        match source {
            DirectorySource::Fixed(dir) => {
                let dir = normalize_dir(&dir)?;
                if !dir.exists() {
                    return Err(ConfigError::MissingDirectory(dir));
                }
                if !dir.is_dir() {
                    return Err(ConfigError::NotADirectory(dir));
                }
                Ok(Self::new(vec![dir], false))
            }
            DirectorySource::Flag(dirs) => {
                let dirs = dirs
                    .iter()
                    .map(|d| normalize_dir(d))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::new(dirs, false))
            }
            DirectorySource::ClientRoots => Ok(Self::new(Vec::new(), true)),
        }
    }

    /// Build a static list from already-normalized directories.
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self::new(dirs, false)
    }

    fn new(dirs: Vec<PathBuf>, follows_roots: bool) -> Self {
        Self {
            dirs: Arc::new(RwLock::new(dirs.into())),
            refresh: Arc::new(Mutex::new(())),
            follows_roots,
        }
    }

    /// Whether this list is replaced when the client's roots change.
    pub fn follows_roots(&self) -> bool {
        self.follows_roots
    }

    /// Current directories.
    pub async fn snapshot(&self) -> Arc<[PathBuf]> {
        self.dirs.read().await.clone()
    }

    /// Replace the whole list.
    pub async fn replace(&self, dirs: Vec<PathBuf>) {
        let next: Arc<[PathBuf]> = dirs.into();
        *self.dirs.write().await = next;
    }

    /// Fetch a new list and swap it in. Refreshes run one at a time, so the
    /// list from the last fetch started is the one left in place.
    ///
    /// A fetch returning `None` leaves the current list untouched.
    pub async fn refresh<F, Fut>(&self, fetch: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<Vec<PathBuf>>>,
    {
        let _guard = self.refresh.lock().await;
        if let Some(dirs) = fetch().await {
            self.replace(dirs).await;
        }
    }
}

/// Parse `--roots` values into directories.
///
/// Each value is, in order of precedence:
/// 1. a JSON array of path strings, when it starts with `[` and parses as one;
/// 2. a comma-separated list of paths;
/// 3. a single path.
///
/// Entries are trimmed and empty ones dropped. Order is preserved.
pub fn parse_roots<S: AsRef<str>>(values: &[S]) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for value in values {
        let value = value.as_ref().trim();
        if value.starts_with('[') {
            if let Ok(parsed) = serde_json::from_str::<Vec<String>>(value) {
                dirs.extend(
                    parsed
                        .iter()
                        .map(|d| d.trim())
                        .filter(|d| !d.is_empty())
                        .map(PathBuf::from),
                );
                continue;
            }
        }
        dirs.extend(
            value
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(PathBuf::from),
        );
    }
    dirs
}

/// Convert client root URIs into normalized directories.
///
/// Only `file://` URIs name local directories; anything else is skipped.
pub fn dirs_from_root_uris<S: AsRef<str>>(uris: &[S]) -> Vec<PathBuf> {
    uris.iter()
        .filter_map(|uri| {
            let uri = uri.as_ref();
            match url::Url::parse(uri).ok().and_then(|u| u.to_file_path().ok()) {
                Some(path) => normalize_dir(&path).ok(),
                None => {
                    tracing::warn!(uri, "ignoring root that is not a local file URI");
                    None
                }
            }
        })
        .collect()
}

/// Human-readable list of directories with their indices.
pub fn describe(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .enumerate()
        .map(|(i, d)| format!("  [{i}] {}", d.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Display helper used by log lines.
pub fn display_all(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|d| d.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
