//! Game catalogs - where the list of save directories comes from.
//!
//! A [`Catalog`] only says "game X keeps its saves in directory Y".
//! [`resolve_jobs`] turns those entries into [`CopyJob`]s under the game
//! backup directory, one subdirectory per game.

pub mod steam;
pub mod uplay;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::executor::CopyJob;
use crate::utils::errors::{BackupError, Result};

pub use steam::{SteamCatalog, SteamClient};
pub use uplay::UplayCatalog;

/// A game and the directory holding its saves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub identifier: String,
    pub source_path: PathBuf,
}

impl CatalogEntry {
    pub fn new(identifier: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            identifier: identifier.into(),
            source_path: source_path.into(),
        }
    }
}

/// Anything that can list the games to back up
pub trait Catalog {
    /// Human readable name used in logs
    fn name(&self) -> &str;

    fn entries(&self) -> Result<Vec<CatalogEntry>>;
}

/// Characters that may not appear in a file name on any supported host.
const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make a game name usable as a single path segment.
///
/// Forbidden and control characters become `_`. Trailing dots and spaces are
/// trimmed, and `.`/`..`/empty names are replaced outright.
pub fn sanitize_identifier(identifier: &str) -> String {
    let replaced: String = identifier
        .chars()
        .map(|c| {
            if c.is_control() || FORBIDDEN_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_end_matches(['.', ' ']);
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Jobs built from catalog entries, plus the entries that had to be dropped
#[derive(Debug, Default)]
pub struct Resolution {
    pub jobs: Vec<CopyJob>,
    pub rejected: Vec<BackupError>,
}

/// Map entries to jobs under `game_dir`, keeping catalog order.
///
/// Two entries whose sanitized names collide would share a destination, so
/// only the first one is kept.
pub fn resolve_jobs(entries: Vec<CatalogEntry>, game_dir: &Path) -> Resolution {
    let mut seen = HashSet::new();
    let mut resolution = Resolution::default();

    for entry in entries {
        let folder = sanitize_identifier(&entry.identifier);
        if !seen.insert(folder.clone()) {
            tracing::warn!(
                identifier = %entry.identifier,
                folder = %folder,
                "Dropping catalog entry with duplicate backup folder"
            );
            resolution
                .rejected
                .push(BackupError::DuplicateIdentifier(entry.identifier));
            continue;
        }

        resolution.jobs.push(CopyJob::new(
            entry.identifier,
            entry.source_path,
            game_dir.join(folder),
        ));
    }

    resolution
}

/// Several catalogs consulted in order
#[derive(Default)]
pub struct CompositeCatalog {
    parts: Vec<Box<dyn Catalog + Send + Sync>>,
}

impl CompositeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, catalog: impl Catalog + Send + Sync + 'static) {
        self.parts.push(Box::new(catalog));
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Entries of every catalog that could be read, and the errors of
    /// those that could not. One failing catalog never hides the others.
    pub fn collect(&self) -> (Vec<CatalogEntry>, Vec<BackupError>) {
        let mut entries = Vec::new();
        let mut errors = Vec::new();

        for part in &self.parts {
            match part.entries() {
                Ok(found) => {
                    tracing::info!("{} catalog: {} games", part.name(), found.len());
                    entries.extend(found);
                }
                Err(e) => {
                    tracing::error!("{} catalog unavailable: {}", part.name(), e);
                    errors.push(e);
                }
            }
        }

        (entries, errors)
    }
}

/// Build the catalogs the configuration enables.
///
/// Steam needs an API key, a Steam id and a userdata directory; the owned
/// games list is fetched here. A failed fetch is returned alongside the
/// catalogs that could be built so the run can go on without Steam.
pub async fn from_config(config: &Config) -> (CompositeCatalog, Vec<BackupError>) {
    let mut catalog = CompositeCatalog::new();
    let mut errors = Vec::new();

    let steam = &config.steam;
    match (&steam.api_key, &steam.steam_id, &steam.saves_dir) {
        (Some(key), Some(id), Some(saves_dir)) => {
            let owned = match SteamClient::new(steam.api_url.as_str()) {
                Ok(client) => client.owned_games(key, id).await,
                Err(e) => Err(e),
            };
            match owned {
                Ok(owned) => catalog.push(SteamCatalog::new(saves_dir, owned)),
                Err(e) => {
                    tracing::error!("Failed to fetch Steam game list: {}", e);
                    errors.push(e);
                }
            }
        }
        _ => tracing::info!("Steam not configured (api_key, steam_id, saves_dir), skipping"),
    }

    match &config.uplay.saves_dir {
        Some(saves_dir) => catalog.push(UplayCatalog::new(saves_dir, config.uplay.games.clone())),
        None => tracing::info!("Uplay saves_dir not configured, skipping"),
    }

    (catalog, errors)
}

/// Everything needed before a run: catalogs consulted, jobs resolved
/// under the game directory, every failure along the way collected.
pub async fn resolve_from_config(config: &Config) -> Resolution {
    let (catalog, mut errors) = from_config(config).await;
    let (entries, catalog_errors) = catalog.collect();
    errors.extend(catalog_errors);

    let mut resolution = resolve_jobs(entries, &config.paths.game_dir());
    errors.append(&mut resolution.rejected);
    resolution.rejected = errors;
    resolution
}
