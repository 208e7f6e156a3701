use crate::data::{Error, Table};
use crate::read;
use log::debug;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Memoizes the loaded `Table` so a selection change doesn't re-read and
/// re-parse the sheet. One entry only, keyed by source path, file modification
/// time, and a refresh epoch: a different path, a replaced file on disk, or a
/// `refresh()` call all miss the cache and reload from scratch. Whatever is on
/// disk at reload time wins, there is no merging. Single-threaded on purpose,
/// like the rest of the pipeline.
#[derive(Debug, Default)]
pub struct TableCache {
    entry: Option<CacheEntry>,
    epoch: u64,
    loads: u64,
}

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    modified: Option<SystemTime>,
    epoch: u64,
    table: Table,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the table for `path`, reloading only when the cached entry no
    /// longer matches.
    pub fn load(&mut self, path: &Path) -> Result<&Table, Error> {
        let modified = std::fs::metadata(path).ok().and_then(|m| m.modified().ok());
        if self.is_fresh(path, modified) && self.entry.is_some() {
            debug!("cache hit for {}", path.display());
        } else {
            debug!("cache miss for {}, loading", path.display());
            let table = read::load(path)?;
            self.loads += 1;
            self.entry = Some(CacheEntry {
                path: path.to_path_buf(),
                modified,
                epoch: self.epoch,
                table,
            });
        }
        Ok(&self.entry.as_ref().expect("entry was just set").table)
    }

    fn is_fresh(&self, path: &Path, modified: Option<SystemTime>) -> bool {
        match &self.entry {
            Some(entry) => {
                entry.path == path && entry.modified == modified && entry.epoch == self.epoch
            }
            None => false,
        }
    }

    /// The refresh control's invalidation signal: the next `load` re-parses no
    /// matter what the file looks like.
    pub fn refresh(&mut self) {
        self.epoch += 1;
    }

    /// How many times the loader actually ran. Exists so callers (and tests)
    /// can tell a hit from a miss.
    pub fn loads(&self) -> u64 {
        self.loads
    }
}
