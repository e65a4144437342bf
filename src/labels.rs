//! Class label index.
//!
//! Labels come either from a persisted list (one label per line, index = line
//! order) or from the class folders of a training dataset:
//!
//! ```text
//! dataset/train/
//! ├── Bacterial_spot/
//! ├── Healthy/
//! └── Late_blight/
//! ```
//!
//! Folder names are sorted, which is the order the training data generator
//! assigned indices in.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::error::LabelError;

/// Read-only mapping from class index to class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelIndex {
    labels: Vec<String>,
}

impl LabelIndex {
    pub fn new(labels: Vec<String>) -> Result<Self, LabelError> {
        let mut seen = HashSet::with_capacity(labels.len());
        if let Some(dup) = labels.iter().find(|label| !seen.insert(label.as_str())) {
            return Err(LabelError::Duplicate(dup.clone()));
        }
        Ok(Self { labels })
    }

    /// Scan the immediate subdirectories of `root`; each one is a class.
    pub fn from_dataset_dir<P: AsRef<Path>>(root: P) -> Result<Self, LabelError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(LabelError::MissingDir(root.to_path_buf()));
        }

        let io_err = |source: std::io::Error| LabelError::Io {
            path: root.to_path_buf(),
            source,
        };

        let mut class_dirs = Vec::new();
        for entry in fs::read_dir(root).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            // Follows symlinks: a linked class folder is still a class.
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name();
            match name.to_str() {
                Some(name) => class_dirs.push(name.to_string()),
                None => return Err(LabelError::InvalidName(name)),
            }
        }
        class_dirs.sort();

        if class_dirs.is_empty() {
            return Err(LabelError::Empty(root.to_path_buf()));
        }
        info!("Found {} classes in {}", class_dirs.len(), root.display());
        Self::new(class_dirs)
    }

    /// Load a persisted label list. Blank lines are skipped; other lines are
    /// taken verbatim so names round-trip through `write_to`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LabelError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| LabelError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let labels: Vec<String> = contents
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .map(String::from)
            .collect();

        if labels.is_empty() {
            return Err(LabelError::Empty(path.to_path_buf()));
        }
        debug!("Read {} labels from {}", labels.len(), path.display());
        Self::new(labels)
    }

    /// Persist the labels in index order, one per line.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), LabelError> {
        let path = path.as_ref();
        let mut contents = self.labels.join("\n");
        contents.push('\n');
        fs::write(path, contents).map_err(|source| LabelError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn label_for(&self, index: usize) -> Result<&str, LabelError> {
        self.labels
            .get(index)
            .map(String::as_str)
            .ok_or(LabelError::OutOfRange {
                index,
                len: self.labels.len(),
            })
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}
