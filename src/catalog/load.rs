use super::build::{parse_route, CatalogBuilder};
use super::cache::{read_cache, write_cache};
use super::types::Catalog;
use crate::error::ConfigurationError;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const DEFINITION_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Discovers route definitions in an action directory, optionally through a
/// cache artifact.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    source_dir: PathBuf,
    cache_path: Option<PathBuf>,
}

impl CatalogLoader {
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            cache_path: None,
        }
    }

    /// Use (and refresh) a cache artifact at `path`.
    #[must_use]
    pub fn with_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    #[must_use]
    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    /// Load the catalog.
    ///
    /// The action directory must exist even when a cache is present. A valid
    /// cache holding at least one route is returned as-is; otherwise the
    /// directory is scanned and a non-empty result is written back to the
    /// cache, ignoring write failures.
    pub fn load(&self) -> Result<Catalog, ConfigurationError> {
        if !self.source_dir.is_dir() {
            return Err(ConfigurationError::MissingDirectory(self.source_dir.clone()));
        }

        if let Some(catalog) = self
            .cache_path
            .as_deref()
            .and_then(read_cache)
            .filter(|c| !c.is_empty())
        {
            return Ok(catalog);
        }

        let catalog = self.discover()?;

        match &self.cache_path {
            Some(path) if catalog.is_empty() => {
                debug!(path = %path.display(), "No routes discovered, cache not written");
            }
            Some(path) => {
                if let Err(e) = write_cache(path, &catalog) {
                    warn!(path = %path.display(), error = %e, "Could not write catalog cache");
                }
            }
            None => {}
        }

        Ok(catalog)
    }

    /// Scan the action directory, bypassing the cache.
    ///
    /// Files are visited in file-name order so priority never depends on the
    /// platform's directory listing order.
    pub fn discover(&self) -> Result<Catalog, ConfigurationError> {
        let unreadable = |source| ConfigurationError::Unreadable {
            path: self.source_dir.clone(),
            source,
        };

        let mut entries: Vec<PathBuf> = std::fs::read_dir(&self.source_dir)
            .map_err(unreadable)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();

        if entries.is_empty() {
            return Err(ConfigurationError::Empty(self.source_dir.clone()));
        }
        entries.sort();

        let mut builder = CatalogBuilder::new();
        let mut skipped = 0usize;
        for path in &entries {
            if !is_definition_file(path) {
                continue;
            }
            let content = match std::fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) => {
                    debug!(file = %path.display(), error = %e, "Unreadable route definition");
                    skipped += 1;
                    continue;
                }
            };
            match parse_route(&content) {
                Some(config) => {
                    debug!(file = %path.display(), route = %config.name, "Route definition loaded");
                    builder.push(config);
                }
                None => {
                    debug!(file = %path.display(), "Route definition skipped");
                    skipped += 1;
                }
            }
        }

        let catalog = builder.build();
        info!(
            source_dir = %self.source_dir.display(),
            routes_count = catalog.len(),
            skipped,
            routes = ?catalog.names().take(10).collect::<Vec<_>>(),
            "Catalog discovered"
        );
        Ok(catalog)
    }
}

fn is_definition_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(true, |n| n.starts_with('.'));
    let known_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| DEFINITION_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    !hidden && known_ext && path.is_file()
}
