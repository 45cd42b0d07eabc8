//! Encrypted key-value storage rooted at one directory
//!
//! Each record is serialized to JSON, sealed with AES-256-GCM and written to
//! `<root>/<sanitized-key>.enc`. The store key lives next to the records in
//! `<root>/.key` as 32 raw bytes.
//!
//! Layout:
//!
//! ```text
//! <root>/            0700
//!   .key             0600  32 raw bytes
//!   github_global.enc 0600 [12-byte nonce][ciphertext + tag]
//! ```
//!
//! Writes land in a uniquely named temp file in the same directory and are
//! renamed over the target, so readers see either the old or the new record.
//! First-time key creation publishes the key with an exclusive hard link, so
//! two initializers racing on an empty root agree on one key.
//!
//! A key file of the wrong size is treated as absent and regenerated: under a
//! `.key.lock` file it is moved aside to `.key.<pid>.<n>.corrupt` and a new key
//! is published through the same exclusive link. Every record sealed with the
//! previous key becomes permanently unreadable when that happens.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::crypto::{Cipher, EncryptionKey};
use super::error::StoreError;
use crate::security::{SecureBytes, Sanitizer};

/// Name of the key file inside a store root
pub const KEY_FILE: &str = ".key";

/// Extension of record files
pub const RECORD_EXT: &str = ".enc";

/// Disambiguates temp and set-aside files written by threads of one process
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Poll interval while another initializer holds the key lock
const KEY_LOCK_RETRY: Duration = Duration::from_millis(10);

/// A key lock older than this is assumed to belong to a crashed process
const KEY_LOCK_STALE_AFTER: Duration = Duration::from_secs(5);

/// Result of a prefix scan that also reports what it dropped
#[derive(Debug)]
pub struct ListOutcome<T> {
    /// Records that decrypted and decoded successfully, ordered by key
    pub records: Vec<T>,
    /// Sanitized keys whose files could not be read, decrypted or decoded
    pub skipped: Vec<String>,
}

/// Encrypted record storage under one directory
///
/// # Example
///
/// ```no_run
/// use forgevault_lib::auth::SecureStore;
///
/// let store = SecureStore::open("/tmp/forgevault-demo")?;
/// store.set("greeting", &"hello".to_string())?;
/// let value: String = store.get("greeting")?;
/// assert_eq!(value, "hello");
/// store.delete("greeting")?;
/// # Ok::<(), forgevault_lib::auth::StoreError>(())
/// ```
pub struct SecureStore {
    root: PathBuf,
    cipher: Cipher,
}

impl SecureStore {
    /// Opens a store, creating the root and its key on first use
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        ensure_private_dir(&root)?;
        let key = load_or_create_key(&root.join(KEY_FILE))?;
        Ok(Self::with_key(root, &key))
    }

    /// Builds a store over `root` with an explicit key
    ///
    /// The directory is not created and no key file is read or written.
    pub fn with_key(root: impl Into<PathBuf>, key: &EncryptionKey) -> Self {
        Self {
            root: root.into(),
            cipher: Cipher::new(key),
        }
    }

    /// Root directory of this store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serializes, encrypts and writes `record`, replacing any previous value
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, record: &T) -> Result<(), StoreError> {
        let plaintext = SecureBytes::new(
            serde_json::to_vec(record).map_err(|e| StoreError::Serialization(e.to_string()))?,
        );
        let blob = self.cipher.encrypt(&plaintext)?;

        write_private_atomic(&self.record_path(key)?, &blob)?;
        tracing::debug!(key = %key, root = %self.root.display(), "Stored encrypted record");
        Ok(())
    }

    /// Reads, decrypts and decodes the record stored under `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, StoreError> {
        let blob = match fs::read(self.record_path(key)?) {
            Ok(blob) => blob,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let record = self.open_blob(&blob)?;
        tracing::debug!(key = %key, "Loaded encrypted record");
        Ok(record)
    }

    /// Removes the record file
    ///
    /// Deleting an absent key surfaces the filesystem error
    /// (`StoreError::Io` with `ErrorKind::NotFound`).
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        fs::remove_file(self.record_path(key)?)?;
        tracing::debug!(key = %key, "Deleted encrypted record");
        Ok(())
    }

    /// Returns true if a record file exists for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.record_path(key).is_ok_and(|path| path.is_file())
    }

    /// Returns every decodable record whose sanitized key starts with the
    /// sanitized `prefix`
    ///
    /// Entries that fail to read, decrypt or decode into `T` are skipped.
    /// Failing to read the directory itself is an error.
    pub fn list<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>, StoreError> {
        Ok(self.list_detailed(prefix)?.records)
    }

    /// Like [`list`](Self::list), but also reports the skipped keys
    pub fn list_detailed<T: DeserializeOwned>(
        &self,
        prefix: &str,
    ) -> Result<ListOutcome<T>, StoreError> {
        let prefix = Sanitizer::sanitize_key(prefix);

        let mut stems: Vec<String> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .filter_map(|name| name.strip_suffix(RECORD_EXT).map(str::to_string))
            .filter(|stem| stem.starts_with(&prefix))
            .collect();
        stems.sort();

        let mut outcome = ListOutcome {
            records: Vec::with_capacity(stems.len()),
            skipped: Vec::new(),
        };

        for stem in stems {
            let path = self.root.join(format!("{}{}", stem, RECORD_EXT));
            let decoded = fs::read(&path)
                .map_err(StoreError::Io)
                .and_then(|blob| self.open_blob::<T>(&blob));

            match decoded {
                Ok(record) => outcome.records.push(record),
                Err(e) => {
                    tracing::warn!(key = %stem, error = %e, "Skipping unreadable record");
                    outcome.skipped.push(stem);
                }
            }
        }

        Ok(outcome)
    }

    fn open_blob<T: DeserializeOwned>(&self, blob: &[u8]) -> Result<T, StoreError> {
        let plaintext = SecureBytes::new(self.cipher.decrypt(blob)?);
        serde_json::from_slice(&plaintext)
            .map_err(|e| StoreError::Decrypt(format!("malformed payload ({})", json_error_kind(&e))))
    }

    /// Sanitized record file for `key`
    ///
    /// An empty key would map to the dot-file `.enc`, which `list` never
    /// visits, so it is rejected.
    fn record_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let stem = Sanitizer::sanitize_key(key);
        if stem.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        Ok(self.root.join(format!("{}{}", stem, RECORD_EXT)))
    }
}

/// Short category name for a payload decode error, without echoing input
fn json_error_kind(e: &serde_json::Error) -> &'static str {
    match e.classify() {
        serde_json::error::Category::Io => "io",
        serde_json::error::Category::Syntax => "syntax",
        serde_json::error::Category::Data => "unexpected shape",
        serde_json::error::Category::Eof => "truncated",
    }
}

fn ensure_private_dir(dir: &Path) -> Result<(), StoreError> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)?;
    tracing::debug!(root = %dir.display(), "Created store root");
    Ok(())
}

fn load_or_create_key(path: &Path) -> Result<EncryptionKey, StoreError> {
    match fs::read(path) {
        Ok(bytes) => {
            let bytes = SecureBytes::new(bytes);
            match EncryptionKey::from_slice(&bytes) {
                Some(key) => Ok(key),
                None => replace_bad_key(path),
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => create_key_exclusive(path),
        Err(e) => Err(StoreError::Io(e)),
    }
}

/// Moves a wrong-size key file aside and publishes a new key exclusively
///
/// The re-check and the move happen under the key lock, so of several
/// initializers that saw the same bad file only one moves it; the rest find
/// either no key (and race on the exclusive link) or the new key.
fn replace_bad_key(path: &Path) -> Result<EncryptionKey, StoreError> {
    {
        let _lock = KeyLock::acquire(path)?;
        match fs::read(path) {
            Ok(bytes) => {
                let bytes = SecureBytes::new(bytes);
                if let Some(key) = EncryptionKey::from_slice(&bytes) {
                    return Ok(key);
                }
                let aside = sibling_path(path, "corrupt");
                fs::rename(path, &aside)?;
                tracing::warn!(
                    path = %path.display(),
                    aside = %aside.display(),
                    len = bytes.len(),
                    "Key file has wrong size, generating a new key; records sealed with the old key are now unreadable"
                );
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::Io(e)),
        }
    }
    create_key_exclusive(path)
}

/// Exclusive lock file guarding key replacement, removed on drop
struct KeyLock {
    path: PathBuf,
}

impl KeyLock {
    fn acquire(key_path: &Path) -> Result<Self, StoreError> {
        let file_name = key_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(KEY_FILE);
        let path = key_path.with_file_name(format!(".{}.lock", file_name.trim_start_matches('.')));

        let mut waiting_since = Instant::now();
        loop {
            match private_create_options().open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if waiting_since.elapsed() >= KEY_LOCK_STALE_AFTER {
                        tracing::warn!(path = %path.display(), "Removing stale key lock");
                        let _ = fs::remove_file(&path);
                        waiting_since = Instant::now();
                    } else {
                        std::thread::sleep(KEY_LOCK_RETRY);
                    }
                }
                Err(e) => return Err(StoreError::Io(e)),
            }
        }
    }
}

impl Drop for KeyLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Publishes a fresh key only if no key file exists yet
///
/// The key is fully written to a temp file first and then hard-linked into
/// place; linking fails if another initializer already published a key, in
/// which case that key is adopted.
fn create_key_exclusive(path: &Path) -> Result<EncryptionKey, StoreError> {
    let key = EncryptionKey::generate();
    let tmp = write_private_temp(path, key.as_bytes())?;

    let linked = fs::hard_link(&tmp, path);
    let _ = fs::remove_file(&tmp);

    match linked {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Generated new store key");
            Ok(key)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            tracing::debug!(path = %path.display(), "Adopting key published by a concurrent initializer");
            let bytes = SecureBytes::new(fs::read(path)?);
            match EncryptionKey::from_slice(&bytes) {
                Some(existing) => Ok(existing),
                None => load_or_create_key(path),
            }
        }
        Err(e) => Err(StoreError::Io(e)),
    }
}

fn write_private_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let tmp = write_private_temp(path, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::Io(e));
    }
    Ok(())
}

/// Unique dot-file next to `path`, e.g. `.key.<pid>.<n>.tmp`
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("record");
    path.with_file_name(format!(
        ".{}.{}.{}.{}",
        file_name.trim_start_matches('.'),
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed),
        suffix
    ))
}

/// Create-new, owner-only open options
fn private_create_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

/// Writes `contents` to a fresh owner-only file next to `path`
fn write_private_temp(path: &Path, contents: &[u8]) -> Result<PathBuf, StoreError> {
    let tmp = sibling_path(path, "tmp");

    let result = private_create_options().open(&tmp).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });

    match result {
        Ok(()) => Ok(tmp),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(StoreError::Io(e))
        }
    }
}
