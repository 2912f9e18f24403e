//! Startup snapshot loader.
//!
//! A snapshot is a directory of `*.json` files, each a flat object of string
//! keys to string values. Files are merged in file-name order, so a later file
//! overwrites duplicate keys from an earlier one. Other entries are ignored.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{DhtError, Result};

pub fn load_dir(dir: &Path) -> Result<HashMap<String, String>> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| snapshot_error(dir, e))?;

    let mut files = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| snapshot_error(dir, e))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();

    let mut merged = HashMap::new();
    for path in files {
        let data = std::fs::read_to_string(&path).map_err(|e| snapshot_error(&path, e))?;
        let entries: HashMap<String, String> =
            serde_json::from_str(&data).map_err(|e| snapshot_error(&path, e))?;
        tracing::debug!("Loaded {} keys from {}", entries.len(), path.display());
        merged.extend(entries);
    }

    tracing::info!("Snapshot {} loaded: {} keys", dir.display(), merged.len());
    Ok(merged)
}

fn snapshot_error(path: &Path, err: impl std::fmt::Display) -> DhtError {
    DhtError::Snapshot {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
