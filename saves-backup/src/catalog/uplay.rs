//! Ubisoft launcher saves: a fixed id -> name list from configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{Catalog, CatalogEntry};
use crate::utils::errors::Result;

/// Games stored under `<saves_dir>/<id>`
#[derive(Debug, Clone)]
pub struct UplayCatalog {
    saves_dir: PathBuf,
    games: BTreeMap<String, String>,
}

impl UplayCatalog {
    pub fn new(saves_dir: impl Into<PathBuf>, games: BTreeMap<String, String>) -> Self {
        Self {
            saves_dir: saves_dir.into(),
            games,
        }
    }
}

impl Catalog for UplayCatalog {
    fn name(&self) -> &str {
        "Uplay"
    }

    /// Every configured game, ordered by id. Missing directories are left
    /// for the runner to report per game.
    fn entries(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self
            .games
            .iter()
            .map(|(id, name)| CatalogEntry::new(name.clone(), self.saves_dir.join(id)))
            .collect())
    }
}
