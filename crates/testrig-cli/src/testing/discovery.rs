//! Test discovery - resolve the configured file list into test files

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// File list used when the configuration names none
pub const DEFAULT_TEST_DIR: &str = "test";

/// A discovered test file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFile {
    /// Path as given or as found while walking
    pub path: PathBuf,
    /// Unit name reported for this file (its path, `/` separated)
    pub name: String,
}

impl TestFile {
    fn new(path: PathBuf) -> Self {
        let name = path.to_string_lossy().replace('\\', "/");
        Self { path, name }
    }

    /// File name without extension
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A suite of discovered test files
#[derive(Debug, Default)]
pub struct TestSuite {
    /// Files to execute, in discovery order
    pub files: Vec<TestFile>,
    /// Configured entries that do not exist
    pub missing: Vec<PathBuf>,
}

impl TestSuite {
    /// Discover test files from the configured entries.
    ///
    /// Files are taken as given. Directories are walked recursively in
    /// sorted order, skipping hidden entries and, on unix, files without an
    /// execute bit. Entries with glob metacharacters select the files they
    /// match; `*` does not cross `/`, `**` does. An empty entry list means
    /// [`DEFAULT_TEST_DIR`].
    pub fn discover<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut suite = TestSuite::default();

        let default = [DEFAULT_TEST_DIR];
        let entries: Vec<&str> = if entries.is_empty() {
            default.to_vec()
        } else {
            entries.iter().map(|entry| entry.as_ref()).collect()
        };

        for entry in entries {
            if is_pattern(entry) {
                match pattern_set(entry) {
                    Ok(set) => {
                        suite.expand(entry, &set);
                        continue;
                    }
                    Err(e) => tracing::debug!(entry, error = %e, "not a valid glob, taking it literally"),
                }
            }
            let path = PathBuf::from(entry);
            if path.is_file() {
                suite.files.push(TestFile::new(path));
            } else if path.is_dir() {
                suite.walk(&path);
            } else {
                tracing::debug!(path = %path.display(), "test path does not exist");
                suite.missing.push(path);
            }
        }

        suite
    }

    fn walk(&mut self, root: &Path) {
        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_executable(entry.path()) => {
                    self.files.push(TestFile::new(entry.into_path()));
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "skipping unreadable entry"),
            }
        }
    }

    /// Add the files under the pattern's literal prefix that match `set`
    fn expand(&mut self, pattern: &str, set: &GlobSet) {
        let base = pattern_base(pattern);
        let walker = WalkDir::new(&base)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        let before = self.files.len();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(pattern, error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = match entry.path().strip_prefix(".") {
                Ok(relative) if base == Path::new(".") => relative.to_path_buf(),
                _ => entry.into_path(),
            };
            if set.is_match(&path) {
                self.files.push(TestFile::new(path));
            }
        }
        tracing::debug!(pattern, found = self.files.len() - before, "expanded pattern");
    }

    /// Keep files whose stem contains any of `units` and whose path contains
    /// any of `matches`. An empty list does not filter.
    pub fn filter<S: AsRef<str>>(self, units: &[S], matches: &[S]) -> Self {
        let files = self
            .files
            .into_iter()
            .filter(|file| {
                let stem = file.stem();
                units.is_empty() || units.iter().any(|u| stem.contains(u.as_ref()))
            })
            .filter(|file| {
                matches.is_empty() || matches.iter().any(|m| file.name.contains(m.as_ref()))
            })
            .collect();

        TestSuite {
            files,
            missing: self.missing,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

fn is_pattern(entry: &str) -> bool {
    entry.contains(['*', '?', '[', '{'])
}

fn pattern_set(pattern: &str) -> Result<GlobSet, globset::Error> {
    let glob = GlobBuilder::new(pattern).literal_separator(true).build()?;
    let mut builder = GlobSetBuilder::new();
    builder.add(glob);
    builder.build()
}

/// Leading directories of `pattern` that hold no metacharacters
fn pattern_base(pattern: &str) -> PathBuf {
    let literal: Vec<&str> = pattern
        .split('/')
        .take_while(|component| !is_pattern(component))
        .collect();
    match literal.join("/") {
        base if base.is_empty() && pattern.starts_with('/') => PathBuf::from("/"),
        base if base.is_empty() => PathBuf::from("."),
        base => PathBuf::from(base),
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    fn names(suite: &TestSuite, root: &Path) -> Vec<String> {
        suite
            .files
            .iter()
            .map(|f| {
                f.path
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_discover_walks_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("test/b_test.sh"));
        touch(&root.join("test/a_test.sh"));
        touch(&root.join("test/unit/c_test.sh"));
        touch(&root.join("test/.hidden/d_test.sh"));
        touch(&root.join("test/.e_test.sh"));

        let dir = root.join("test").display().to_string();
        let suite = TestSuite::discover(&[dir]);
        assert_eq!(
            names(&suite, root),
            ["test/a_test.sh", "test/b_test.sh", "test/unit/c_test.sh"]
        );
        assert!(suite.missing.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_skips_non_executable_in_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("test/run.sh"));
        fs::write(root.join("test/helper.txt"), "data").unwrap();

        let dir = root.join("test").display().to_string();
        let suite = TestSuite::discover(&[dir]);
        assert_eq!(names(&suite, root), ["test/run.sh"]);
    }

    #[test]
    fn test_discover_reports_missing() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("one.sh");
        touch(&file);
        let absent = temp_dir.path().join("absent");

        let suite = TestSuite::discover(&[file.display().to_string(), absent.display().to_string()]);
        assert_eq!(suite.len(), 1);
        assert_eq!(suite.missing, vec![absent]);
    }

    #[test]
    fn test_filter_units_and_matches() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("test/math_test.sh"));
        touch(&root.join("test/io_test.sh"));
        touch(&root.join("test/slow/math_big.sh"));

        let dir = root.join("test").display().to_string();
        let none: [&str; 0] = [];

        let by_unit = TestSuite::discover(&[dir.clone()]).filter(&["math"], &none);
        assert_eq!(
            names(&by_unit, root),
            ["test/math_test.sh", "test/slow/math_big.sh"]
        );

        let both = TestSuite::discover(&[dir.clone()]).filter(&["math"], &["slow"]);
        assert_eq!(names(&both, root), ["test/slow/math_big.sh"]);

        let all = TestSuite::discover(&[dir]).filter(&none, &none);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_discover_expands_patterns() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("test/b_test.sh"));
        touch(&root.join("test/a_test.sh"));
        touch(&root.join("test/helper.sh"));
        touch(&root.join("test/deep/c_test.sh"));

        let shallow = format!("{}/test/*_test.sh", root.display());
        let suite = TestSuite::discover(&[shallow]);
        assert_eq!(names(&suite, root), ["test/a_test.sh", "test/b_test.sh"]);
        assert!(suite.missing.is_empty());

        let deep = format!("{}/test/**/*_test.sh", root.display());
        let suite = TestSuite::discover(&[deep]);
        assert_eq!(
            names(&suite, root),
            ["test/a_test.sh", "test/b_test.sh", "test/deep/c_test.sh"]
        );

        let nothing = format!("{}/test/*.rb", root.display());
        let suite = TestSuite::discover(&[nothing]);
        assert_eq!(suite.len(), 0);
        assert!(suite.missing.is_empty());
    }

    #[test]
    fn test_pattern_base() {
        assert_eq!(pattern_base("test/*_test.sh"), PathBuf::from("test"));
        assert_eq!(pattern_base("*.sh"), PathBuf::from("."));
        assert_eq!(pattern_base("/srv/t/**/x"), PathBuf::from("/srv/t"));
    }
}
