use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::de::DeserializeOwned;

/// Path of `name` inside this crate's `assets/` directory.
pub fn asset_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets").join(name)
}

/// Reads and deserializes a RON file, e.g. a stored plot configuration.
pub fn load_ron<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let value = ron::de::from_bytes(&bytes)
        .map_err(|e| anyhow::anyhow!(e))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}
