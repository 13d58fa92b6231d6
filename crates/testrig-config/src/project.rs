//! Project root discovery and load path derivation
//!
//! The project root is the nearest ancestor directory holding one of the
//! [`ROOT_MARKERS`]. A project may carry an `.index` file (TOML) whose
//! `[paths] lib` list seeds the load path; without one, a conventional
//! `lib/` directory is used if present.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Entries that mark a directory as the project root.
pub const ROOT_MARKERS: [&str; 6] = [".index", ".git", ".hg", "_darcs", "testrig.toml", "lib"];

/// Name of the project index file.
pub const INDEX_FILE: &str = ".index";

/// Project index (`.index`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProjectIndex {
    /// Path settings
    #[serde(default)]
    pub paths: IndexPaths,
}

/// `[paths]` section of the project index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IndexPaths {
    /// Library directories, relative to the project root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lib: Option<Vec<PathBuf>>,
}

impl ProjectIndex {
    /// Load a project index from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::ConfigFileNotFound(path.to_path_buf())
            } else {
                ConfigError::Io(e)
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })
    }
}

/// A discovered project
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    index: ProjectIndex,
}

impl Project {
    /// Discover the project containing `start_dir`.
    ///
    /// Walks up the directory tree looking for a root marker. When none is
    /// found, `start_dir` itself is the root. An unreadable index is treated
    /// as absent.
    pub fn discover(start_dir: &Path) -> Self {
        let root = find_root(start_dir).unwrap_or_else(|| start_dir.to_path_buf());
        let index_path = root.join(INDEX_FILE);

        let index = if index_path.is_file() {
            ProjectIndex::load_from_file(&index_path).unwrap_or_else(|e| {
                tracing::warn!("ignoring project index: {e}");
                ProjectIndex::default()
            })
        } else {
            ProjectIndex::default()
        };

        Self { root, index }
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &ProjectIndex {
        &self.index
    }

    /// Load path entries derived from the project layout.
    ///
    /// Uses the index `paths.lib` entries when present, else `lib/` if it is
    /// a directory, else nothing.
    pub fn load_paths(&self) -> Vec<PathBuf> {
        if let Some(lib) = &self.index.paths.lib {
            return lib.iter().map(|path| self.root.join(path)).collect();
        }

        let typical = self.root.join("lib");
        if typical.is_dir() {
            vec![typical]
        } else {
            Vec::new()
        }
    }
}

/// Find the nearest ancestor of `start_dir` holding a root marker.
fn find_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        if ROOT_MARKERS
            .iter()
            .any(|marker| current.join(marker).exists())
        {
            return Some(current);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_root_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".index"), "").unwrap();
        let sub = temp_dir.path().join("test").join("unit");
        fs::create_dir_all(&sub).unwrap();

        let project = Project::discover(&sub);
        assert_eq!(project.root(), temp_dir.path());
    }

    #[test]
    fn test_index_lib_paths() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".index"),
            r#"
[paths]
lib = ["src", "vendor/lib"]
"#,
        )
        .unwrap();

        let project = Project::discover(temp_dir.path());
        assert_eq!(
            project.load_paths(),
            vec![temp_dir.path().join("src"), temp_dir.path().join("vendor/lib")]
        );
    }

    #[test]
    fn test_fallback_to_lib_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("lib")).unwrap();

        let project = Project::discover(temp_dir.path());
        assert_eq!(project.load_paths(), vec![temp_dir.path().join("lib")]);
    }

    #[test]
    fn test_index_without_paths_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".index"), "[paths]\n").unwrap();

        let project = Project::discover(temp_dir.path());
        assert!(project.load_paths().is_empty());
    }

    #[test]
    fn test_malformed_index_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".index"), "paths = [").unwrap();

        let project = Project::discover(temp_dir.path());
        assert_eq!(project.index(), &ProjectIndex::default());
    }
}
