//! # Evidence Sink - Artifact Persistence
//!
//! Persists per-step artifacts (screenshots and similar) keyed by step
//! identifier. The engine treats the sink as best-effort: a capture failure
//! is logged and the step's evidence path is simply recorded as absent,
//! never aborting the journey.
//!
//! Path uniqueness is a sink guarantee: distinct calls always produce
//! distinct paths, with collisions on the same step id resolved by a
//! monotonically increasing counter suffix (`popup.png`, `popup_2.png`, ...).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::EvidenceError;

/// External collaborator that persists evidence artifacts.
pub trait EvidenceSink: Send {
    /// Captures one artifact for the given step and returns its path.
    fn capture(&mut self, step_id: &str) -> Result<PathBuf, EvidenceError>;
}

/// Filesystem-backed sink: one artifact file per capture under a designated
/// root directory, named by step identifier.
///
/// The sink creates the root on first use and reserves each artifact file at
/// capture time; driver adapters that can render screenshots write into the
/// reserved path afterwards (the Playwright model of picking the path first,
/// then letting the browser fill it).
pub struct FsEvidenceSink {
    root: PathBuf,
    counters: HashMap<String, u32>,
    initialized: bool,
}

impl FsEvidenceSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            counters: HashMap::new(),
            initialized: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_root(&mut self) -> Result<(), EvidenceError> {
        if !self.initialized {
            fs::create_dir_all(&self.root).map_err(|source| EvidenceError::RootUnavailable {
                path: self.root.clone(),
                source,
            })?;
            self.initialized = true;
        }
        Ok(())
    }
}

impl EvidenceSink for FsEvidenceSink {
    fn capture(&mut self, step_id: &str) -> Result<PathBuf, EvidenceError> {
        self.ensure_root()?;

        let counter = self.counters.entry(step_id.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let file_name = if *counter == 1 {
                format!("{step_id}.png")
            } else {
                format!("{step_id}_{counter}.png")
            };
            let path = self.root.join(file_name);
            // Leftovers from an earlier run also count as collisions.
            if path.exists() {
                continue;
            }
            fs::File::create(&path).map_err(|source| EvidenceError::Io {
                path: path.clone(),
                source,
            })?;
            debug!(step_id = %step_id, path = %path.display(), "evidence artifact reserved");
            return Ok(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("journey-evidence-{}", Uuid::new_v4()))
    }

    #[test]
    fn creates_root_on_first_capture() {
        let root = temp_root();
        let mut sink = FsEvidenceSink::new(&root);
        assert!(!root.exists());

        let path = sink.capture("open_home").unwrap();
        assert!(root.is_dir());
        assert!(path.exists());
        assert_eq!(path, root.join("open_home.png"));

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn repeated_captures_get_counter_suffix() {
        let root = temp_root();
        let mut sink = FsEvidenceSink::new(&root);

        let first = sink.capture("popup").unwrap();
        let second = sink.capture("popup").unwrap();
        let third = sink.capture("popup").unwrap();

        assert_eq!(first, root.join("popup.png"));
        assert_eq!(second, root.join("popup_2.png"));
        assert_eq!(third, root.join("popup_3.png"));

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn paths_are_distinct_across_step_ids() {
        let root = temp_root();
        let mut sink = FsEvidenceSink::new(&root);

        let mut paths = vec![
            sink.capture("a").unwrap(),
            sink.capture("b").unwrap(),
            sink.capture("a").unwrap(),
            sink.capture("b").unwrap(),
        ];
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 4);

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn skips_over_leftover_artifacts() {
        let root = temp_root();
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("open_home.png"), b"old run").unwrap();

        let mut sink = FsEvidenceSink::new(&root);
        let path = sink.capture("open_home").unwrap();
        assert_eq!(path, root.join("open_home_2.png"));

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn unwritable_root_is_an_error() {
        // A root path that collides with an existing file cannot be created.
        let file = std::env::temp_dir().join(format!("journey-evidence-{}.png", Uuid::new_v4()));
        fs::write(&file, b"blocker").unwrap();

        let mut sink = FsEvidenceSink::new(&file);
        let err = sink.capture("any").unwrap_err();
        assert!(matches!(err, EvidenceError::RootUnavailable { .. }));

        fs::remove_file(file).unwrap();
    }
}
