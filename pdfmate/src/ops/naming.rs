//! Output file naming.
//!
//! Names carry a millisecond timestamp. A name that already exists on disk,
//! or that is held by a live [`ReservedPath`], gets a `-<n>` suffix, so two
//! operations finishing in the same millisecond never overwrite each other.
//! A reservation ends when its guard is dropped; by then the file is either
//! on disk or was never written.

use chrono::Utc;
use std::collections::HashSet;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

fn reserved() -> &'static Mutex<HashSet<PathBuf>> {
    static RESERVED: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();
    RESERVED.get_or_init(|| Mutex::new(HashSet::new()))
}

/// An output path withheld from other namers until dropped.
#[derive(Debug)]
pub struct ReservedPath {
    path: PathBuf,
}

impl ReservedPath {
    /// The reserved path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Deref for ReservedPath {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.path
    }
}

impl Drop for ReservedPath {
    fn drop(&mut self) {
        reserved()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.path);
    }
}

/// Source file stem used as the base of derived names.
pub fn base_name(source: &Path) -> String {
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

/// Hands out unique output paths inside one directory.
#[derive(Debug, Clone)]
pub struct OutputNamer {
    dir: PathBuf,
    millis: i64,
}

impl OutputNamer {
    /// Namer for `dir`, stamped with the current time.
    pub fn new(dir: &Path) -> Self {
        Self::with_timestamp(dir, Utc::now().timestamp_millis())
    }

    /// Namer with a fixed timestamp.
    pub fn with_timestamp(dir: &Path, millis: i64) -> Self {
        Self {
            dir: dir.to_path_buf(),
            millis,
        }
    }

    /// `merged_pdf_<millis>.pdf`
    pub fn merged(&self) -> ReservedPath {
        self.reserve(format!("merged_pdf_{}", self.millis))
    }

    /// `<base>_split_<k>_<millis>.pdf`
    pub fn split_chunk(&self, base: &str, k: usize) -> ReservedPath {
        self.reserve(format!("{base}_split_{k}_{}", self.millis))
    }

    /// `<base>_pages_<start>-<end>_<millis>.pdf`
    pub fn range(&self, base: &str, start: u32, end: u32) -> ReservedPath {
        self.reserve(format!("{base}_pages_{start}-{end}_{}", self.millis))
    }

    /// `<base>_compressed_<millis>.pdf`
    pub fn compressed(&self, base: &str) -> ReservedPath {
        self.reserve(format!("{base}_compressed_{}", self.millis))
    }

    fn reserve(&self, stem: String) -> ReservedPath {
        let mut taken = reserved().lock().unwrap_or_else(PoisonError::into_inner);

        let mut candidate = self.dir.join(format!("{stem}.pdf"));
        let mut n = 1;
        while taken.contains(&candidate) || candidate.exists() {
            candidate = self.dir.join(format!("{stem}-{n}.pdf"));
            n += 1;
        }

        taken.insert(candidate.clone());
        ReservedPath { path: candidate }
    }
}
