//! Recursive archive unpacking.
//!
//! Walks a zip-compatible container, collecting every class-file entry into
//! memory and recursing into nested `.jar`/`.zip` entries. Entry paths keep
//! their nesting prefix for diagnostics only; colliding paths overwrite.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::{Cursor, ErrorKind, Read};
use zip::ZipArchive;
use zip::result::ZipError;

const CLASS_SUFFIX: &str = ".class";
const ARCHIVE_SUFFIXES: [&str; 2] = [".jar", ".zip"];

/// Read chunk sized to the largest plausible class file.
const READ_CHUNK: usize = 1 << 15;

#[derive(Debug, Default)]
pub struct Extraction {
    /// Entry path (with nested-archive prefixes) to raw class bytes.
    pub classes: HashMap<String, Vec<u8>>,
    /// Entries dropped for recoverable corruption, including nested archives
    /// that failed to open.
    pub skipped_entries: usize,
}

/// Unpacks `bytes` as an archive, recursing into nested archives.
///
/// A corrupt, encrypted, or checksum-mismatched entry is skipped and counted;
/// a nested archive that cannot be recovered is skipped without affecting its
/// siblings. Any other failure is fatal for the whole input.
pub fn extract_classes(bytes: &[u8]) -> Result<Extraction> {
    let mut extraction = Extraction::default();
    extract_into(bytes, "", &mut extraction)?;
    Ok(extraction)
}

fn extract_into(bytes: &[u8], prefix: &str, out: &mut Extraction) -> Result<()> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).context("not a readable zip container")?;

    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(err) if is_recoverable(&err) => {
                eprintln!("[refscan] skipping {prefix}entry #{i}: {err}");
                out.skipped_entries += 1;
                continue;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to open {prefix}entry #{i}"));
            }
        };

        let name = entry.name().to_string();
        let is_class = name.ends_with(CLASS_SUFFIX);
        let is_archive = ARCHIVE_SUFFIXES.iter().any(|s| name.ends_with(s));
        if !is_class && !is_archive {
            continue;
        }

        let data = match read_entry(&mut entry) {
            Ok(data) => data,
            Err(err) if is_corrupt_read(&err) => {
                eprintln!("[refscan] skipping entry {prefix}{name}: {err}");
                out.skipped_entries += 1;
                continue;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read entry {prefix}{name}"));
            }
        };

        if is_archive {
            // Zip-ception. A broken child never takes down its siblings.
            let child_prefix = format!("{prefix}{name}!");
            if let Err(err) = extract_into(&data, &child_prefix, out) {
                eprintln!("[refscan] skipping nested archive {prefix}{name}: {err:#}");
                out.skipped_entries += 1;
            }
        } else {
            out.classes.insert(format!("{prefix}{name}"), data);
        }
    }

    Ok(())
}

fn read_entry<R: Read>(entry: &mut R) -> std::io::Result<Vec<u8>> {
    let mut data = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = entry.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
    }
    Ok(data)
}

/// Structural classification of entry-level failures: malformed entries,
/// unsupported features (encryption) and checksum mismatches are skippable;
/// everything else aborts the input.
fn is_recoverable(err: &ZipError) -> bool {
    match err {
        ZipError::InvalidArchive(_) | ZipError::UnsupportedArchive(_) => true,
        ZipError::Io(io) => is_corrupt_read(io),
        _ => false,
    }
}

/// The zip entry reader flattens corruption into `io::Error`s: deflate
/// failures surface as `InvalidData`, CRC mismatches as `Other` with
/// "Invalid checksum". Both condemn the entry, not the whole input.
fn is_corrupt_read(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::InvalidData | ErrorKind::Other)
}
