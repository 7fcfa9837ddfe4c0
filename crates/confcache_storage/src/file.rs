// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Directory-backed storage medium.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use confcache_tier::{Error, ErrorKind, Result, StorageAdapter};
use xxhash_rust::xxh3::xxh3_128;

/// Extension of files named by the hex encoding of their key.
const EXTENSION: &str = "entry";

/// Extension of files named by a digest of their key, which they carry on their first line.
const HASHED_EXTENSION: &str = "hentry";

/// Longest hex-encoded key used directly as a file stem.
///
/// Keeps every name well under the 255-byte limit common to file systems.
const MAX_HEX_STEM: usize = 200;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A durable medium storing one file per key inside a directory.
///
/// File names are the hex encoding of the key with an `.entry` extension, so any key
/// maps to a portable name. Keys too long for that are stored under a 128-bit digest
/// with an `.hentry` extension, and the file starts with the hex-encoded key on its own
/// line. Files with other names in the directory are ignored.
///
/// Writes go to a temporary file that is renamed into place, so readers see either the
/// old value or the new one.
///
/// # Examples
///
/// ```
/// use confcache_storage::FileStorage;
/// use confcache_tier::StorageAdapter;
///
/// let dir = tempfile::tempdir()?;
/// let storage = FileStorage::open(dir.path().join("cache"))?;
///
/// storage.set_item("confcache:k", "v")?;
/// assert_eq!(storage.get_item("confcache:k")?.as_deref(), Some("v"));
/// assert_eq!(storage.keys()?, vec!["confcache:k".to_string()]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

/// Where a key lives on disk.
enum Location {
    /// The file holds only the value.
    Direct(PathBuf),
    /// The file holds the hex key line followed by the value.
    Hashed { path: PathBuf, header: String },
}

impl Location {
    fn path(&self) -> &Path {
        match self {
            Self::Direct(path) | Self::Hashed { path, .. } => path,
        }
    }
}

impl FileStorage {
    /// Opens the medium rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::StorageUnavailable`] if the directory cannot be created, the
    /// path is not a directory, or the directory is read-only.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| Error::with_cause(ErrorKind::StorageUnavailable, e))?;

        let metadata = fs::metadata(&dir).map_err(|e| Error::with_cause(ErrorKind::StorageUnavailable, e))?;
        if !metadata.is_dir() {
            return Err(Error::with_cause(
                ErrorKind::StorageUnavailable,
                format!("{} is not a directory", dir.display()),
            ));
        }
        if metadata.permissions().readonly() {
            return Err(Error::with_cause(
                ErrorKind::StorageUnavailable,
                format!("{} is read-only", dir.display()),
            ));
        }

        Ok(Self { dir })
    }

    /// Returns the directory holding the entries.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn locate(&self, key: &str) -> Location {
        let encoded = hex::encode(key);
        if encoded.len() <= MAX_HEX_STEM {
            return Location::Direct(self.dir.join(format!("{encoded}.{EXTENSION}")));
        }
        let digest = xxh3_128(key.as_bytes());
        Location::Hashed {
            path: self.dir.join(format!("{digest:032x}.{HASHED_EXTENSION}")),
            header: encoded,
        }
    }

    fn entries(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.dir).map_err(storage_error)? {
            let path = dir_entry.map_err(storage_error)?.path();
            let key = match path.extension().and_then(|ext| ext.to_str()) {
                Some(EXTENSION) => path.file_stem().and_then(|stem| stem.to_str()).and_then(decode_key),
                Some(HASHED_EXTENSION) => read_header(&path)?.as_deref().and_then(decode_key),
                _ => None,
            };
            if let Some(key) = key {
                entries.push((key, path));
            }
        }
        Ok(entries)
    }

    /// Writes `contents` to `path` through a temporary sibling file and a rename.
    fn replace(&self, path: &Path, contents: &str) -> io::Result<()> {
        let temp = self.dir.join(format!(
            ".{}-{}.tmp",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let result = fs::write(&temp, contents).and_then(|()| fs::rename(&temp, path));
        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result
    }
}

fn decode_key(encoded: &str) -> Option<String> {
    hex::decode(encoded).ok().and_then(|bytes| String::from_utf8(bytes).ok())
}

/// Reads the key line of a hashed entry. Returns `None` if the file vanished.
fn read_header(path: &Path) -> Result<Option<String>> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(storage_error(e)),
    };
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line).map_err(storage_error)?;
    Ok(line.strip_suffix('\n').map(str::to_string))
}

fn storage_error(error: io::Error) -> Error {
    Error::with_cause(ErrorKind::Storage, error)
}

fn ignore_missing(result: io::Result<()>) -> Result<()> {
    match result {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(storage_error(e)),
        _ => Ok(()),
    }
}

impl StorageAdapter for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let location = self.locate(key);
        let contents = match fs::read_to_string(location.path()) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(e)),
        };

        match location {
            Location::Direct(_) => Ok(Some(contents)),
            // A different key with the same digest reads as absent.
            Location::Hashed { header, .. } => Ok(contents
                .split_once('\n')
                .filter(|(stored, _)| *stored == header)
                .map(|(_, value)| value.to_string())),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let location = self.locate(key);
        let result = match &location {
            Location::Direct(path) => self.replace(path, value),
            Location::Hashed { path, header } => self.replace(path, &format!("{header}\n{value}")),
        };
        result.map_err(|e| {
            if e.kind() == io::ErrorKind::StorageFull {
                Error::with_cause(ErrorKind::QuotaExceeded, e)
            } else {
                storage_error(e)
            }
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        ignore_missing(fs::remove_file(self.locate(key).path()))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.into_iter().map(|(key, _)| key).collect())
    }

    fn clear(&self) -> Result<()> {
        for (_, path) in self.entries()? {
            ignore_missing(fs::remove_file(path))?;
        }
        Ok(())
    }
}
