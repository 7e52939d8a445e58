//! Define the backing file used by a table.

use std::fs;
use std::path::{Path, PathBuf};

/// Extension given to table files named from a directory and name.
pub const TABLE_EXTENSION: &str = "sdb";

/// Names the file that backs a table.
///
/// There are two ways to name it:
/// - Supply a directory and name.  The table file will be dir/name.sdb.  This should be your
/// default.
/// - Supply the full path to the file.  Name will then be the file stem and is just informational.
#[derive(Clone, Debug)]
pub struct TableFiles {
    /// The directory containing the table file, None if an explicit path was given.
    dir: Option<PathBuf>,
    /// Base name (without directory or extension) of the table.
    name: String,
    /// The full path and name of the table file if explicitly set.
    table_file: Option<PathBuf>,
}

impl TableFiles {
    /// Create a new TableFiles from a directory and name.
    pub fn with_dir<S, P>(dir: P, name: S) -> Self
    where
        S: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            dir: Some(dir.into()),
            name: name.into(),
            table_file: None,
        }
    }

    /// Create a new TableFiles with an explicit file path.
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        let path: PathBuf = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            dir: None,
            name,
            table_file: Some(path),
        }
    }

    /// Return the root directory if not using an explicit file.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// The name of the table.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if an explicit file path was given instead of a directory and name.
    pub fn has_explicit_file(&self) -> bool {
        self.table_file.is_some()
    }

    /// Path to the table file.
    pub fn path(&self) -> PathBuf {
        match (&self.table_file, &self.dir) {
            (Some(path), _) => path.clone(),
            (None, Some(dir)) => dir.join(&self.name).with_extension(TABLE_EXTENSION),
            (None, None) => PathBuf::from(&self.name).with_extension(TABLE_EXTENSION),
        }
    }

    /// Directory that contains (or will contain) the table file.
    pub fn parent_dir(&self) -> PathBuf {
        self.path()
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default()
    }

    /// Delete the table file and its directory if that is now empty.
    /// If it can not remove something it will silently ignore this.
    pub fn delete(self) {
        let _ = fs::remove_file(self.path());
        if let Some(dir) = &self.dir {
            let _ = fs::remove_dir(dir);
        }
    }
}
