use std::{fs, path::Path};

use serde::{de::DeserializeOwned, Serialize};

/// Serialize `value` as pretty JSON and replace `path` with it.
///
/// The document is written to a sibling temporary file first and renamed into place, so readers
/// only ever see the previous or the new version.
pub fn write_json_atomic<P: AsRef<Path>, T: Serialize + ?Sized>(
    path: P,
    value: &T,
) -> anyhow::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");

    let json = serde_json::to_string_pretty(value)?;
    fs::write(&tmp, json).map_err(|e| anyhow!("Unable to write {}: {}", path.display(), e))?;
    fs::rename(&tmp, path).map_err(|e| anyhow!("Unable to replace {}: {}", path.display(), e))?;

    Ok(())
}

/// Read and deserialize a JSON document
pub fn read_json<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> anyhow::Result<T> {
    let path = path.as_ref();
    let contents =
        fs::read_to_string(path).map_err(|e| anyhow!("Unable to read {}: {}", path.display(), e))?;

    serde_json::from_str(&contents).map_err(|e| anyhow!("Unable to parse {}: {}", path.display(), e))
}
