use crate::license::error::LicenseError;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_CACHE_DIR: &str = "config";
pub const DEFAULT_EXTENSION: &str = "txt";
pub const DEFAULT_CONTENT_FILE: &str = "api_token.txt";

const FILE_PREFIX: &str = "file";
const HASH_LEN: usize = 16;

/// On-disk proof of a previous activation.
///
/// The directory contents are the only source of truth; nothing is cached in
/// memory between calls. No file locking is done: a single running instance
/// per user session is assumed.
pub trait LicenseCache: Send + Sync {
    fn list_candidates(&self) -> BTreeSet<String>;
    fn write(&self, token: &str) -> Result<String, LicenseError>;
    fn is_valid(&self, filename: &str) -> bool;
    fn remove(&self, filename: &str) -> Result<(), LicenseError>;
    fn read_token(&self, filename: &str) -> Option<String>;
}

/// First 16 hex chars of `SHA-256(nonce + secret)`.
pub fn hash16(nonce: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce.as_bytes());
    hasher.update(secret.as_bytes());
    let mut hex = hex::encode(hasher.finalize());
    hex.truncate(HASH_LEN);
    hex
}

pub fn make_filename(nonce: &str, secret: &str, ext: &str) -> String {
    format!("{FILE_PREFIX}_{nonce}_{}.{ext}", hash16(nonce, secret))
}

pub fn random_nonce() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

/// Check a `file_<nonce>_<hash16>.<ext>` name against `secret`.
pub fn is_valid_filename(filename: &str, secret: &str, ext: &str) -> bool {
    let parts: Vec<&str> = filename.split('_').collect();
    let [prefix, nonce, tail] = parts.as_slice() else {
        return false;
    };
    if *prefix != FILE_PREFIX || nonce.is_empty() {
        return false;
    }
    let Some((hash, file_ext)) = tail.split_once('.') else {
        return false;
    };
    file_ext == ext && hash.len() == HASH_LEN && hash == hash16(nonce, secret)
}

fn ensure_dir(dir: &Path) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::warn!(dir = %dir.display(), "failed to create license cache dir: {e}");
    }
}

fn list_dir(dir: &Path) -> BTreeSet<String> {
    ensure_dir(dir);
    let Ok(entries) = std::fs::read_dir(dir) else {
        return BTreeSet::new();
    };
    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| e.file_name().into_string().ok())
        .collect()
}

fn read_trimmed(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let token = content.trim();
            (!token.is_empty()).then(|| token.to_string())
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), "{}", LicenseError::CorruptCacheFile(e.to_string()));
            None
        }
    }
}

/// Activation proven by a hash-named file; the content is never re-verified.
pub struct HashNamedCache {
    dir: PathBuf,
    secret: String,
    ext: String,
}

impl HashNamedCache {
    pub fn new(dir: impl Into<PathBuf>, secret: impl Into<String>, ext: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            secret: secret.into(),
            ext: ext.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl LicenseCache for HashNamedCache {
    fn list_candidates(&self) -> BTreeSet<String> {
        list_dir(&self.dir)
    }

    fn write(&self, token: &str) -> Result<String, LicenseError> {
        std::fs::create_dir_all(&self.dir)?;
        let name = make_filename(&random_nonce(), &self.secret, &self.ext);
        std::fs::write(self.dir.join(&name), token)?;
        tracing::info!(file = %name, "stored activation record");
        Ok(name)
    }

    fn is_valid(&self, filename: &str) -> bool {
        is_valid_filename(filename, &self.secret, &self.ext)
    }

    fn remove(&self, filename: &str) -> Result<(), LicenseError> {
        std::fs::remove_file(self.dir.join(filename))?;
        Ok(())
    }

    fn read_token(&self, filename: &str) -> Option<String> {
        read_trimmed(&self.dir.join(filename))
    }
}

/// Activation kept as a fixed file holding the raw token, re-verified on
/// every launch.
pub struct ContentCache {
    dir: PathBuf,
    file_name: String,
}

impl ContentCache {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl LicenseCache for ContentCache {
    fn list_candidates(&self) -> BTreeSet<String> {
        list_dir(&self.dir)
    }

    fn write(&self, token: &str) -> Result<String, LicenseError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(&self.file_name), token)?;
        tracing::info!(file = %self.file_name, "stored token");
        Ok(self.file_name.clone())
    }

    fn is_valid(&self, filename: &str) -> bool {
        filename == self.file_name && self.read_token(filename).is_some()
    }

    fn remove(&self, filename: &str) -> Result<(), LicenseError> {
        std::fs::remove_file(self.dir.join(filename))?;
        Ok(())
    }

    fn read_token(&self, filename: &str) -> Option<String> {
        read_trimmed(&self.dir.join(filename))
    }
}
