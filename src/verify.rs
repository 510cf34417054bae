use crate::models::LinkEntry;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Complete { count: usize },
    /// Expected-but-absent and present-but-unexpected names, combined and sorted.
    Mismatch { names: Vec<String> },
}

impl Verification {
    pub fn is_complete(&self) -> bool {
        matches!(self, Verification::Complete { .. })
    }

    /// One-line result printed at the end of `get` and `verify`.
    pub fn summary(&self, listing_url: &str) -> String {
        match self {
            Verification::Complete { count } => {
                format!("All {} files downloaded from {}.", count, listing_url)
            }
            Verification::Mismatch { names } => {
                format!("Files still missing: {}", names.join(", "))
            }
        }
    }
}

/// Non-hidden entry names in `dir`. A missing directory is empty.
pub fn list_save_dir(dir: &Path) -> Result<BTreeSet<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to list {}", dir.display()));
        }
    };

    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            names.insert(name);
        }
    }
    Ok(names)
}

pub fn verify(dir: &Path, expected: &[LinkEntry]) -> Result<Verification> {
    let present = list_save_dir(dir)?;
    let wanted: BTreeSet<String> = expected.iter().map(|l| l.decoded.clone()).collect();

    let names: Vec<String> = wanted.symmetric_difference(&present).cloned().collect();
    if names.is_empty() {
        Ok(Verification::Complete {
            count: expected.len(),
        })
    } else {
        Ok(Verification::Mismatch { names })
    }
}
