//! On-disk catalog cache.
//!
//! The artifact is a JSON envelope carrying a format tag, a schema version and
//! a SHA-256 checksum of the route list. Anything that fails to decode is
//! treated as "no cache" and the caller rediscovers from the action directory.
//!
//! The cache is never compared against the action directory. A deployment
//! that changes route definitions must clear it (see `sifrouter cache clear`).

use super::types::{Catalog, RouteConfig};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Format tag embedded in every cache artifact.
pub const CACHE_FORMAT: &str = "sifrouter/catalog";

/// Bump whenever [`RouteConfig`] or the envelope changes shape.
pub const CACHE_VERSION: u32 = 1;

/// File name of the cache inside the configured cache directory.
pub const CACHE_FILE_NAME: &str = "configs.cache";

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    format: &'a str,
    version: u32,
    checksum: String,
    routes: Vec<&'a RouteConfig>,
}

#[derive(Deserialize)]
struct EnvelopeIn {
    format: String,
    version: u32,
    checksum: String,
    routes: Vec<RouteConfig>,
}

/// Why a cache artifact was rejected.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected cache format `{0}`")]
    Format(String),
    #[error("cache version {found} does not match {expected}")]
    Version { found: u32, expected: u32 },
    #[error("cache checksum mismatch")]
    Checksum,
}

fn checksum<T: Serialize + ?Sized>(routes: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(routes)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Serialize a catalog into a cache artifact.
pub fn encode(catalog: &Catalog) -> Result<Vec<u8>, serde_json::Error> {
    let routes: Vec<&RouteConfig> = catalog.iter().map(|r| r.as_ref()).collect();
    let envelope = EnvelopeOut {
        format: CACHE_FORMAT,
        version: CACHE_VERSION,
        checksum: checksum(&routes)?,
        routes,
    };
    serde_json::to_vec(&envelope)
}

/// Deserialize a cache artifact, validating tag, version and checksum.
pub fn decode(bytes: &[u8]) -> Result<Catalog, CacheError> {
    let envelope: EnvelopeIn = serde_json::from_slice(bytes)?;
    if envelope.format != CACHE_FORMAT {
        return Err(CacheError::Format(envelope.format));
    }
    if envelope.version != CACHE_VERSION {
        return Err(CacheError::Version {
            found: envelope.version,
            expected: CACHE_VERSION,
        });
    }
    if checksum(&envelope.routes)? != envelope.checksum {
        return Err(CacheError::Checksum);
    }
    Ok(Catalog::from_configs(envelope.routes))
}

/// Load the cache if it exists and decodes cleanly.
pub fn read_cache(path: &Path) -> Option<Catalog> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No usable catalog cache");
            return None;
        }
    };
    match decode(&bytes) {
        Ok(catalog) => {
            info!(
                path = %path.display(),
                routes_count = catalog.len(),
                "Catalog loaded from cache"
            );
            Some(catalog)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Discarding unreadable catalog cache");
            None
        }
    }
}

/// Write the cache atomically: a temp file in the target directory is
/// renamed over the destination, so readers never see a partial artifact.
pub fn write_cache(path: &Path, catalog: &Catalog) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating cache directory {}", dir.display()))?;

    let bytes = encode(catalog).context("serializing catalog")?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(&bytes).context("writing catalog cache")?;
    tmp.persist(path)
        .with_context(|| format!("replacing {}", path.display()))?;

    debug!(path = %path.display(), bytes = bytes.len(), "Catalog cache written");
    Ok(())
}

/// Remove the cache file. Returns `false` when there was nothing to remove.
pub fn clear_cache(path: &Path) -> std::io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
