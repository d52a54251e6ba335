//! On-disk image cache, one file per recipe id.
//!
//! Each image lives at `{stem}.jpg` in the cache directory, where the stem is
//! a percent-encoded form of the id. Writes go to a `.recipebox-*.tmp` file in
//! the same directory and are linked into place without clobbering, so the
//! directory only ever holds complete images.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::{debug, info};

use super::CacheError;
use crate::api::{parse_url, ApiClient};

/// Extension for every cached image, whatever its actual format.
/// Lookups by id never need to know the format.
const IMAGE_EXTENSION: &str = "jpg";

/// Prefix for in-flight writes. These are never read back as images.
const TEMP_PREFIX: &str = ".recipebox-";

/// Stem used for the empty identifier; never produced for non-empty ids.
const EMPTY_ID_STEM: &str = "%";

/// A cached image file found in the cache directory.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub id: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
}

impl CacheEntry {
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.modified).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// Disk-backed image store keyed by recipe id.
///
/// The directory listing is the index: an image is cached exactly when
/// `{stem}.jpg` exists. Files are published atomically, so a reader never
/// sees a partial write, and an existing file is never overwritten.
#[derive(Clone)]
pub struct ImageCache {
    cache_dir: PathBuf,
    api: ApiClient,
}

impl ImageCache {
    pub fn new(cache_dir: PathBuf, api: ApiClient) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&cache_dir).map_err(CacheError::io(&cache_dir))?;
        Ok(Self { cache_dir, api })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Where the image for `id` lives, whether or not it exists yet.
    pub fn image_path(&self, id: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}", file_stem(id), IMAGE_EXTENSION))
    }

    /// Whether an image file exists for `id`. I/O errors count as absent.
    pub async fn contains(&self, id: &str) -> bool {
        fs::try_exists(self.image_path(id)).await.unwrap_or(false)
    }

    /// Cached bytes for `id`, or `None` if there is no readable image on disk.
    pub async fn get(&self, id: &str) -> Option<Bytes> {
        let path = self.image_path(id);
        match fs::try_exists(&path).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(id, "Image cache miss");
                return None;
            }
            Err(e) => {
                debug!(id, error = %e, "Failed to check image cache");
                return None;
            }
        }

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(id, path = %path.display(), error = %e, "Failed to read cached image");
                return None;
            }
        };

        if let Err(e) = validate_image(&bytes) {
            debug!(id, error = %e, "Cached file is not a decodable image");
            return None;
        }

        debug!(id, "Retrieved image from cache");
        Some(Bytes::from(bytes))
    }

    /// Download the image at `source_url` and store it under `id`.
    ///
    /// Fails with `AlreadyExists` rather than overwrite an existing file;
    /// that signals a redundant fetch or a lost race with another writer.
    pub async fn fetch_and_store(
        &self,
        id: &str,
        source_url: Option<&str>,
    ) -> Result<Bytes, CacheError> {
        let raw = source_url.ok_or(CacheError::InvalidUrl(None))?;
        let url = parse_url(raw).map_err(|_| CacheError::InvalidUrl(Some(raw.to_string())))?;

        let path = self.image_path(id);
        if fs::try_exists(&path).await.map_err(CacheError::io(&path))? {
            return Err(CacheError::AlreadyExists(path));
        }

        let bytes = self.api.fetch_url(&url).await?;
        validate_image(&bytes).map_err(CacheError::NotAnImage)?;

        debug!(id, url = %url, size = bytes.len(), "Downloading and caching image");

        let dir = self.cache_dir.clone();
        let target = path.clone();
        let payload = bytes.clone();
        tokio::task::spawn_blocking(move || persist(&dir, &target, &payload))
            .await
            .map_err(|e| CacheError::Io {
                path,
                source: std::io::Error::other(e),
            })??;

        Ok(bytes)
    }

    /// Make sure an image for `id` is on disk. A no-op when already cached;
    /// losing a race to a concurrent writer also counts as success.
    pub async fn ensure(&self, id: &str, source_url: Option<&str>) -> Result<(), CacheError> {
        if self.contains(id).await {
            return Ok(());
        }
        match self.fetch_and_store(id, source_url).await {
            Ok(_) => Ok(()),
            Err(CacheError::AlreadyExists(path)) => {
                debug!(id, path = %path.display(), "Image was cached by another task");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Remove every cached image, plus any temp files orphaned by an
    /// interrupted write. Returns the number of images removed.
    pub async fn clear_all(&self) -> Result<usize, CacheError> {
        let mut dir = match fs::read_dir(&self.cache_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(CacheError::io(&self.cache_dir)(e)),
        };

        let mut removed = 0;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(CacheError::io(&self.cache_dir))?
        {
            let path = entry.path();
            let is_image = image_id(&path).is_some();
            if !is_image && !is_temp_file(&path) {
                continue;
            }

            match fs::remove_file(&path).await {
                Ok(()) => {
                    if is_image {
                        removed += 1;
                        debug!(path = %path.display(), "Deleted image");
                    }
                }
                // Someone else got there first
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(CacheError::io(&path)(e)),
            }
        }

        info!(removed, dir = %self.cache_dir.display(), "Cleared image cache");
        Ok(removed)
    }

    /// Cached images currently on disk, sorted by id.
    pub async fn entries(&self) -> Result<Vec<CacheEntry>, CacheError> {
        let mut dir = match fs::read_dir(&self.cache_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io(&self.cache_dir)(e)),
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(CacheError::io(&self.cache_dir))?
        {
            let path = entry.path();
            let Some(id) = image_id(&path) else {
                continue;
            };
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                // Removed between listing and stat
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(CacheError::io(&path)(e)),
            };
            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            entries.push(CacheEntry {
                id,
                path,
                size_bytes: metadata.len(),
                modified,
            });
        }

        entries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(entries)
    }
}

/// Full decode; header sniffing alone would accept truncated files.
fn validate_image(bytes: &[u8]) -> Result<(), image::ImageError> {
    image::load_from_memory(bytes).map(|_| ())
}

/// Write `bytes` to a temp file beside `target`, then link it into place
/// without clobbering. The temp file is removed on every failure path.
fn persist(dir: &Path, target: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(CacheError::io(dir))?;

    tmp.write_all(bytes).map_err(CacheError::io(tmp.path()))?;
    tmp.as_file().sync_all().map_err(CacheError::io(tmp.path()))?;

    tmp.persist_noclobber(target).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            CacheError::AlreadyExists(target.to_path_buf())
        } else {
            CacheError::io(target)(e.error)
        }
    })?;
    Ok(())
}

/// Deterministic, injective filename stem for an id. ASCII alphanumerics,
/// `-` and `_` pass through; every other byte becomes `%XX`.
fn file_stem(id: &str) -> String {
    if id.is_empty() {
        return EMPTY_ID_STEM.to_string();
    }
    let mut stem = String::with_capacity(id.len());
    for b in id.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            stem.push(b as char);
        } else {
            let _ = write!(stem, "%{:02X}", b);
        }
    }
    stem
}

/// Inverse of `file_stem`. `None` for names this cache never writes,
/// including non-canonical spellings such as lowercase hex.
fn id_from_stem(stem: &str) -> Option<String> {
    if stem == EMPTY_ID_STEM {
        return Some(String::new());
    }
    let mut out = Vec::with_capacity(stem.len());
    let bytes = stem.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = stem.get(i + 1..i + 3)?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' => {
                out.push(b);
                i += 1;
            }
            _ => return None,
        }
    }
    let id = String::from_utf8(out).ok()?;
    (file_stem(&id) == stem).then_some(id)
}

/// Id for a cached image path, or `None` if the path isn't one of ours.
fn image_id(path: &Path) -> Option<String> {
    if path.extension()? != IMAGE_EXTENSION {
        return None;
    }
    id_from_stem(path.file_stem()?.to_str()?)
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(TEMP_PREFIX))
}

// ============================================================================
// Tests
// ============================================================================
