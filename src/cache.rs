//! Compute-once pickle caches.
//!
//! A cache file, once written, is trusted forever: there is no staleness
//! check. Delete the file to force recomputation.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{PhonePoolError, Result};

pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|err| PhonePoolError::io("opening cache", path, err))?;
    serde_pickle::from_reader(BufReader::new(file), Default::default())
        .map_err(|err| PhonePoolError::cache(path, err))
}

/// Serializes `value` to a sibling temp file, then renames it over `path`.
pub fn write<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let staging = staging_path(path);
    let file =
        File::create(&staging).map_err(|err| PhonePoolError::io("creating cache", &staging, err))?;
    let mut writer = BufWriter::new(file);
    serde_pickle::to_writer(&mut writer, value, Default::default())
        .map_err(|err| PhonePoolError::cache(&staging, err))?;
    writer
        .flush()
        .map_err(|err| PhonePoolError::io("flushing cache", &staging, err))?;
    drop(writer);
    fs::rename(&staging, path).map_err(|err| PhonePoolError::io("publishing cache", path, err))?;
    debug!(path = %path.display(), "cache written");
    Ok(())
}

/// Returns the cached value at `path`, or builds, persists and returns it.
pub fn load_or_build<T, F>(path: &Path, build: F) -> Result<(T, bool)>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T>,
{
    if path.is_file() {
        info!(path = %path.display(), "cache hit");
        return read(path).map(|value| (value, true));
    }
    info!(path = %path.display(), "cache miss; computing");
    let value = build()?;
    write(path, &value)?;
    Ok((value, false))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn builds_once_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.pkl");
        let calls = Cell::new(0);
        let build = || {
            calls.set(calls.get() + 1);
            let mut map = BTreeMap::new();
            map.insert("a".to_string(), vec![1.5_f32, -2.0]);
            Ok(map)
        };

        let (first, first_cached): (BTreeMap<String, Vec<f32>>, bool) =
            load_or_build(&path, build).unwrap();
        let (second, second_cached): (BTreeMap<String, Vec<f32>>, bool) =
            load_or_build(&path, || unreachable!("cache should be used")).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(!first_cached);
        assert!(second_cached);
        assert_eq!(first, second);
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn build_failure_leaves_no_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.pkl");
        let result: Result<(Vec<u32>, bool)> =
            load_or_build(&path, || Err(PhonePoolError::Language("x".into())));
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_cache_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.pkl");
        fs::write(&path, b"not a pickle").unwrap();
        let result: Result<Vec<u32>> = read(&path);
        assert!(matches!(result, Err(PhonePoolError::Cache { .. })));
    }
}
