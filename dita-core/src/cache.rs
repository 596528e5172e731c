//! Named, versioned key-value cache on disk.
//!
//! Each cache is a directory under the storage root; each entry is a file
//! whose name is the hex-encoded key. Caches are written whole with
//! [`CacheStorage::put_all`]: entries are staged in a hidden directory and
//! swapped in with a rename, so readers see either the old or the new
//! cache and never a partial one.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DitaError, DitaResult};

pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        CacheStorage { root: root.into() }
    }

    /// ~/.cache/dita on Linux.
    pub fn default_root() -> DitaResult<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| DitaError::Config("Could not determine cache directory".into()))?;
        Ok(cache_dir.join("dita"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has(&self, name: &str) -> bool {
        self.root.join(name).is_dir()
    }

    pub fn open(&self, name: &str) -> DitaResult<Cache> {
        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Err(DitaError::CacheUnavailable(name.to_string()));
        }
        Ok(Cache {
            name: name.to_string(),
            dir,
        })
    }

    /// Names of all committed caches.
    pub fn names(&self) -> DitaResult<Vec<String>> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Ok(Vec::new());
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .collect();

        names.sort();
        Ok(names)
    }

    pub fn delete(&self, name: &str) -> DitaResult<bool> {
        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Ok(false);
        }
        std::fs::remove_dir_all(dir)?;
        Ok(true)
    }

    /// Delete every cache except `keep`. Returns the deleted names.
    pub fn prune_except(&self, keep: &str) -> DitaResult<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.names()? {
            if name != keep && self.delete(&name)? {
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Replace cache `name` with exactly `entries`.
    pub fn put_all<K, V>(&self, name: &str, entries: &[(K, V)]) -> DitaResult<Cache>
    where
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        std::fs::create_dir_all(&self.root)?;

        let staging = self.root.join(format!(".staging-{}", uuid::Uuid::new_v4()));
        if let Err(e) = write_entries(&staging, entries) {
            let _ = std::fs::remove_dir_all(&staging);
            return Err(e);
        }

        let target = self.root.join(name);
        let previous = self.root.join(format!(".old-{}", uuid::Uuid::new_v4()));
        let had_previous = target.is_dir();

        if had_previous {
            std::fs::rename(&target, &previous)?;
        }
        if let Err(e) = std::fs::rename(&staging, &target) {
            if had_previous {
                let _ = std::fs::rename(&previous, &target);
            }
            let _ = std::fs::remove_dir_all(&staging);
            return Err(e.into());
        }
        if had_previous {
            let _ = std::fs::remove_dir_all(&previous);
        }

        debug!(cache = name, entries = entries.len(), "cache committed");
        self.open(name)
    }
}

fn write_entries<K, V>(dir: &Path, entries: &[(K, V)]) -> DitaResult<()>
where
    K: AsRef<str>,
    V: AsRef<[u8]>,
{
    std::fs::create_dir_all(dir)?;
    for (key, value) in entries {
        std::fs::write(dir.join(encode_key(key.as_ref())), value)?;
    }
    Ok(())
}

/// A committed cache.
#[derive(Debug, Clone)]
pub struct Cache {
    name: String,
    dir: PathBuf,
}

impl Cache {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value stored under `key`, if any.
    pub fn get(&self, key: &str) -> DitaResult<Option<Vec<u8>>> {
        let path = self.dir.join(encode_key(key));
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DitaError::CacheRead {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.dir.join(encode_key(key)).is_file()
    }

    /// On-disk file backing `key`, for consumers that need a path.
    pub fn entry_path(&self, key: &str) -> Option<PathBuf> {
        let path = self.dir.join(encode_key(key));
        path.is_file().then_some(path)
    }

    pub fn keys(&self) -> DitaResult<Vec<String>> {
        let mut keys: Vec<String> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().and_then(decode_key))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len() * 2);
    for byte in key.bytes() {
        let _ = write!(encoded, "{byte:02x}");
    }
    // An empty key still needs a file name.
    if encoded.is_empty() {
        encoded.push('_');
    }
    encoded
}

fn decode_key(name: &str) -> Option<String> {
    if name == "_" {
        return Some(String::new());
    }
    if name.len() % 2 != 0 {
        return None;
    }
    let bytes = (0..name.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(name.get(i..i + 2)?, 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}
