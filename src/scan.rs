//! Corpus scanning.
//!
//! Each artifact is unpacked and parsed by exactly one worker, which owns a
//! local tally for the duration; locals are merged pairwise by rayon's
//! reduction, which is sound because tally merge is associative and
//! commutative. A failing artifact only loses its own contribution.

use anyhow::{Context, Result};
use memmap2::Mmap;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::classfile;
use crate::extract::extract_classes;
use crate::tally::ReferenceTally;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScanSummary {
    pub artifacts_scanned: usize,
    pub artifacts_failed: usize,
    pub classes_parsed: usize,
    pub classes_skipped: usize,
    pub entries_skipped: usize,
}

impl ScanSummary {
    fn absorb(&mut self, other: ScanSummary) {
        self.artifacts_scanned += other.artifacts_scanned;
        self.artifacts_failed += other.artifacts_failed;
        self.classes_parsed += other.classes_parsed;
        self.classes_skipped += other.classes_skipped;
        self.entries_skipped += other.entries_skipped;
    }
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub tally: ReferenceTally,
    pub summary: ScanSummary,
}

/// Every direct child file of the input directory is one artifact. Sorted so
/// diagnostics come out in a stable order.
pub fn list_artifacts(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(input_dir)
        .with_context(|| format!("failed to read input directory: {}", input_dir.display()))?;

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to list input directory: {}", input_dir.display()))?;
        if entry.file_type()?.is_file() {
            artifacts.push(entry.path());
        }
    }
    artifacts.sort();
    Ok(artifacts)
}

pub fn scan_corpus(artifacts: &[PathBuf]) -> ScanOutcome {
    artifacts
        .par_iter()
        .map(|path| match scan_artifact(path) {
            Ok(outcome) => outcome,
            Err(err) => {
                eprintln!("[refscan] failed to scan {}: {err:#}", path.display());
                ScanOutcome {
                    tally: ReferenceTally::new(),
                    summary: ScanSummary {
                        artifacts_failed: 1,
                        ..ScanSummary::default()
                    },
                }
            }
        })
        .reduce(ScanOutcome::default, |mut acc, local| {
            acc.tally = acc.tally.merge(local.tally);
            acc.summary.absorb(local.summary);
            acc
        })
}

/// Unpacks one artifact and tallies every member reference its classes make.
pub fn scan_artifact(path: &Path) -> Result<ScanOutcome> {
    let file =
        File::open(path).with_context(|| format!("failed to open artifact: {}", path.display()))?;
    // SAFETY: The file is opened read-only and remains valid for the lifetime
    // of the mmap. The mmap is dropped before the file, ensuring memory safety.
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("failed to mmap artifact: {}", path.display()))?;
    let extraction = extract_classes(&mmap[..])
        .with_context(|| format!("failed to unpack artifact: {}", path.display()))?;

    let mut tally = ReferenceTally::new();
    let mut summary = ScanSummary {
        artifacts_scanned: 1,
        entries_skipped: extraction.skipped_entries,
        ..ScanSummary::default()
    };

    for (entry_path, bytes) in &extraction.classes {
        match classfile::parse_references(bytes) {
            Ok(symbols) => {
                summary.classes_parsed += 1;
                for symbol in symbols {
                    tally.record(symbol);
                }
            }
            Err(err) => {
                summary.classes_skipped += 1;
                eprintln!(
                    "[refscan] {}: {entry_path} may be corrupted: {err}",
                    path.display()
                );
            }
        }
    }

    Ok(ScanOutcome { tally, summary })
}
