use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::model::StoreDocument;

/// Load the store document from `path`.
///
/// A missing, unreadable or unparseable file yields an empty document; the
/// store starts fresh rather than refusing to serve.
pub fn load(path: &Path) -> StoreDocument {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("no data file at {}, starting empty", path.display());
            return StoreDocument::default();
        }
        Err(e) => {
            warn!("cannot read data file {}: {e}; starting empty", path.display());
            return StoreDocument::default();
        }
    };
    match serde_json::from_slice(&raw) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("corrupt data file {}: {e}; starting empty", path.display());
            StoreDocument::default()
        }
    }
}

/// Serialize a document the way it is stored on disk (two-space pretty JSON).
pub fn encode(doc: &StoreDocument) -> io::Result<Vec<u8>> {
    serde_json::to_vec_pretty(doc).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Sibling temp file used for atomic replacement.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("bookings"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace the file at `path` with `bytes`.
///
/// Writes a temp file, fsyncs it, then renames it over the target, so a
/// crash leaves either the old or the new document, never a torn one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = tmp_path(path);
    let file = File::create(&tmp)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    fs::rename(&tmp, path)
}
