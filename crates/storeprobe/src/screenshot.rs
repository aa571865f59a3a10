//! Screenshot persistence.
//!
//! Captures land in one directory as `{name}{n}.png`, where `n` is the
//! smallest non-negative integer not already taken. Existing files are
//! scanned from 0 upward, so repeated runs never overwrite earlier
//! captures.

use crate::driver::Screenshot;
use crate::result::{ProbeError, ProbeResult};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension for saved screenshots
pub const SCREENSHOT_EXT: &str = "png";

/// Directory of numbered screenshots
#[derive(Debug, Clone)]
pub struct ScreenshotStore {
    dir: PathBuf,
}

impl ScreenshotStore {
    /// Create a store rooted at `dir` (created lazily on first save)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for capture number `index` of `name`
    #[must_use]
    pub fn path_for(&self, name: &str, index: u32) -> PathBuf {
        self.dir.join(format!("{name}{index}.{SCREENSHOT_EXT}"))
    }

    /// First free path for `name`
    pub fn next_path(&self, name: &str) -> ProbeResult<PathBuf> {
        validate_name(name)?;
        let mut index = 0u32;
        loop {
            let candidate = self.path_for(name, index);
            if !candidate.exists() {
                return Ok(candidate);
            }
            index = index.checked_add(1).ok_or_else(|| ProbeError::Screenshot {
                message: format!("no free screenshot slot for {name}"),
            })?;
        }
    }

    /// Write `screenshot` under the next free name and return its path
    pub fn save(&self, name: &str, screenshot: &Screenshot) -> ProbeResult<PathBuf> {
        if !screenshot.is_valid() {
            return Err(ProbeError::Screenshot {
                message: format!("capture for {name} is empty"),
            });
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.next_path(name)?;
        fs::write(&path, &screenshot.data)?;
        Ok(path)
    }
}

fn validate_name(name: &str) -> ProbeResult<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(ProbeError::Screenshot {
            message: format!("invalid screenshot name {name:?}"),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn shot() -> Screenshot {
        Screenshot::new(vec![0x89, b'P', b'N', b'G'], 4, 4)
    }

    #[test]
    fn test_first_capture_is_zero() {
        let tmp = TempDir::new().unwrap();
        let store = ScreenshotStore::new(tmp.path());
        let path = store.save("empty_cart-Passed", &shot()).unwrap();
        assert_eq!(path.file_name().unwrap(), "empty_cart-Passed0.png");
    }

    #[test]
    fn test_repeated_captures_never_overwrite() {
        let tmp = TempDir::new().unwrap();
        let store = ScreenshotStore::new(tmp.path());
        let a = store.save("run-Failed", &shot()).unwrap();
        let b = store.save("run-Failed", &shot()).unwrap();
        let c = store.save("run-Failed", &shot()).unwrap();
        assert_ne!(a, b);
        assert_eq!(c.file_name().unwrap(), "run-Failed2.png");
    }

    #[test]
    fn test_fills_smallest_gap() {
        let tmp = TempDir::new().unwrap();
        let store = ScreenshotStore::new(tmp.path());
        fs::write(store.path_for("x", 0), b"a").unwrap();
        fs::write(store.path_for("x", 2), b"b").unwrap();
        assert_eq!(store.next_path("x").unwrap(), store.path_for("x", 1));
    }

    #[test]
    fn test_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let store = ScreenshotStore::new(tmp.path().join("nested/shots"));
        let path = store.save("x", &shot()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_rejects_empty_capture() {
        let tmp = TempDir::new().unwrap();
        let store = ScreenshotStore::new(tmp.path());
        let err = store.save("x", &Screenshot::new(vec![], 0, 0)).unwrap_err();
        assert!(matches!(err, ProbeError::Screenshot { .. }));
    }

    #[test]
    fn test_rejects_path_like_names() {
        let store = ScreenshotStore::new("shots");
        assert!(store.next_path("../escape").is_err());
        assert!(store.next_path("a/b").is_err());
        assert!(store.next_path("").is_err());
    }
}
