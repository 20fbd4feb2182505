//! Live filesystem adapter using `std::fs`.

use std::path::Path;

use crate::ports::filesystem::{FileSystem, PortError};

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(path, contents)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                entries.push(name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contracts/nested/card.contract.json");

        LiveFileSystem.write(&path, "{}").unwrap();

        assert!(LiveFileSystem.exists(&path));
        assert_eq!(LiveFileSystem.read_to_string(&path).unwrap(), "{}");
        let names = LiveFileSystem.list_dir(&dir.path().join("contracts/nested")).unwrap();
        assert_eq!(names, vec!["card.contract.json"]);
    }

    #[test]
    fn read_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LiveFileSystem.read_to_string(&dir.path().join("nope.html")).is_err());
    }
}
