//! ZIP archive reader: pulls one named data file out of an in-memory archive.

use std::io::{Cursor, Read};

use poetryhub_shared::{PoetryHubError, Result};
use tracing::{debug, warn};
use zip::ZipArchive;

/// Read the entry called `entry_name` from `bytes` and return it as text.
///
/// The entry matches when its full path equals `entry_name`, or when it sits
/// in a sub-directory and its file name equals `entry_name`. Content that is
/// not valid UTF-8 is decoded lossily.
pub fn read_entry(bytes: &[u8], entry_name: &str) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| PoetryHubError::archive(format!("cannot open archive: {e}")))?;

    let resolved = resolve_entry_name(&archive, entry_name).ok_or_else(|| {
        PoetryHubError::MissingEntry {
            name: entry_name.to_string(),
        }
    })?;

    let mut file = archive
        .by_name(&resolved)
        .map_err(|e| PoetryHubError::archive(format!("cannot read '{resolved}': {e}")))?;

    let mut raw = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
    file.read_to_end(&mut raw)
        .map_err(|e| PoetryHubError::archive(format!("cannot decompress '{resolved}': {e}")))?;

    debug!(entry = %resolved, bytes = raw.len(), "archive entry extracted");

    match String::from_utf8(raw) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(entry = %resolved, "entry is not valid UTF-8, decoding lossily");
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

fn resolve_entry_name<R>(archive: &ZipArchive<R>, entry_name: &str) -> Option<String>
where
    R: Read + std::io::Seek,
{
    if archive.file_names().any(|name| name == entry_name) {
        return Some(entry_name.to_string());
    }

    let mut nested: Vec<&str> = archive
        .file_names()
        .filter(|name| !name.ends_with('/'))
        .filter(|name| name.rsplit('/').next() == Some(entry_name))
        .collect();
    nested.sort_unstable();
    nested.first().map(|name| (*name).to_string())
}
