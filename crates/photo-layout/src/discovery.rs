//! Image discovery
//!
//! Lists the image files in a directory in a stable, filename-sorted order.

use crate::constants::IMAGE_EXTENSIONS;
use crate::types::{LayoutError, Result};
use std::path::{Path, PathBuf};

/// Sorted set of image files found in one directory.
///
/// Iterating does not consume the set, so the sequence can be walked again.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageSet {
    paths: Vec<PathBuf>,
}

impl ImageSet {
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Whether `path` has a recognized image extension (case-insensitive)
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Find the image files directly inside `dir`, sorted by file name.
pub async fn discover_images(dir: impl AsRef<Path>) -> Result<ImageSet> {
    let dir = dir.as_ref().to_owned();
    let not_found = || LayoutError::DirectoryNotFound { path: dir.clone() };

    match tokio::fs::metadata(&dir).await {
        Ok(meta) if meta.is_dir() => {}
        _ => return Err(not_found()),
    }

    let mut entries = tokio::fs::read_dir(&dir).await?;
    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_dir() || !is_supported_image(&path) {
            continue;
        }
        paths.push(path);
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    log::debug!("Found {} image(s) in {}", paths.len(), dir.display());
    Ok(ImageSet { paths })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_image(Path::new("a.jpg")));
        assert!(is_supported_image(Path::new("a.JPEG")));
        assert!(is_supported_image(Path::new("dir/a.Png")));
        assert!(!is_supported_image(Path::new("a.heic")));
        assert!(!is_supported_image(Path::new("a.jpg.txt")));
        assert!(!is_supported_image(Path::new("jpg")));
    }

    #[tokio::test]
    async fn test_discovery_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.jpg", "A.JPG", "b.jpeg", "notes.txt", "d.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("folder.jpg")).unwrap();

        let set = discover_images(dir.path()).await.unwrap();
        let names: Vec<_> = set
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["A.JPG", "b.jpeg", "c.jpg", "d.png"]);

        // Walking the set again yields the same sequence
        assert_eq!(set.iter().count(), 4);
        assert_eq!(set, discover_images(dir.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        match discover_images(&missing).await {
            Err(LayoutError::DirectoryNotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected DirectoryNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_file_is_not_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            discover_images(file.path()).await,
            Err(LayoutError::DirectoryNotFound { .. })
        ));
    }
}
