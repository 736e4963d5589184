//! Archive Reader.
//!
//! Streams a ZIP from an in-memory buffer into a name→bytes map,
//! enforcing entry-count, total-size, and zip-slip path-safety limits
//! before any byte reaches a caller.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::{CoreError, CoreResult};

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct ArchiveLimits {
    pub max_total_bytes: u64,
    pub max_entries: u32,
}

/// An in-memory ZIP, fully validated against `ArchiveLimits`.
#[derive(Debug, Default)]
pub struct RawArchive {
    entries: HashMap<String, Vec<u8>>,
}

impl RawArchive {
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(|v| v.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the single entry whose basename, minus extension, equals
    /// `stem` — used to resolve an EPUB study article whose filename
    /// matches the TOC link's captured document id.
    pub fn find_by_stem(&self, stem: &str) -> Option<&str> {
        self.entries
            .keys()
            .find(|name| {
                std::path::Path::new(name.as_str())
                    .file_stem()
                    .map(|f| f.to_string_lossy() == stem)
                    .unwrap_or(false)
            })
            .map(|s| s.as_str())
    }
}

/// An entry is suspicious if its name, after normalizing `\`→`/`,
/// begins with `..`, begins with `/`, or contains `/../`.
fn is_suspicious(name: &str) -> bool {
    let norm = name.replace('\\', "/");
    norm.starts_with("..") || norm.starts_with('/') || norm.contains("/../")
}

fn read_entry_capped(
    file: &mut zip::read::ZipFile,
    total: &mut u64,
    limit: u64,
) -> CoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let n = file
            .read(&mut chunk)
            .map_err(|e| CoreError::InvalidArchive(e.to_string()))?;
        if n == 0 {
            break;
        }
        *total += n as u64;
        if *total > limit {
            return Err(CoreError::FileTooLarge(format!(
                "archive exceeds {limit} total decompressed bytes"
            )));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(buf)
}

/// Parse `bytes` as a ZIP archive, returning its validated contents.
pub fn read_archive(bytes: &[u8], limits: &ArchiveLimits) -> CoreResult<RawArchive> {
    let cursor = Cursor::new(bytes);
    let mut zip =
        ZipArchive::new(cursor).map_err(|e| CoreError::InvalidArchive(e.to_string()))?;

    if zip.len() as u64 > limits.max_entries as u64 {
        return Err(CoreError::TooManyFiles(format!(
            "archive has {} entries, limit is {}",
            zip.len(),
            limits.max_entries
        )));
    }

    let mut entries = HashMap::new();
    let mut total: u64 = 0;

    for i in 0..zip.len() {
        let mut file = zip
            .by_index(i)
            .map_err(|e| CoreError::InvalidArchive(e.to_string()))?;
        if file.is_dir() {
            continue;
        }

        let name = file.name().to_string();
        if is_suspicious(&name) {
            return Err(CoreError::SuspiciousContent(name));
        }

        let buf = read_entry_capped(&mut file, &mut total, limits.max_total_bytes)?;
        entries.insert(name, buf);
    }

    Ok(RawArchive { entries })
}
