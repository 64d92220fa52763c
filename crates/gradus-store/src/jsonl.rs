//! JSONL storage: one line per record.
//!
//! Knowledge units and recipes each live in their own file. Blank lines
//! and `#` comment lines are skipped on read.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Read records from a JSONL reader.
pub fn read_records<T: DeserializeOwned>(reader: impl BufRead) -> Result<Vec<T>, JsonlError> {
    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| JsonlError::Io(line_no + 1, e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let record: T = serde_json::from_str(trimmed)
            .map_err(|e| JsonlError::Parse(line_no + 1, e.to_string()))?;
        records.push(record);
    }
    Ok(records)
}

/// Write records to a JSONL writer.
pub fn write_records<T: Serialize>(
    writer: &mut impl Write,
    records: &[T],
) -> Result<(), JsonlError> {
    for record in records {
        let line =
            serde_json::to_string(record).map_err(|e| JsonlError::Serialize(e.to_string()))?;
        writeln!(writer, "{line}").map_err(|e| JsonlError::Io(0, e.to_string()))?;
    }
    Ok(())
}

/// Read records from a JSONL file path.
///
/// A missing file reads as an empty record set.
pub fn read_records_from_path<T: DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<Vec<T>, JsonlError> {
    let path = path.as_ref();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error(path, e)),
    };
    check_text_bytes(path, &bytes)?;
    read_records(bytes.as_slice())
}

/// Replace the file at `path` with `records`.
///
/// Records go to a sibling temp file which is synced and renamed over the
/// target, so readers see either the old file or the new one.
pub fn write_records_to_path<T: Serialize>(
    path: impl AsRef<Path>,
    records: &[T],
) -> Result<(), JsonlError> {
    let path = path.as_ref();
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty());
    if let Some(dir) = dir {
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    }

    let staged = staging_path(path);
    if let Err(error) = write_synced(&staged, records) {
        let _ = fs::remove_file(&staged);
        return Err(error);
    }
    if let Err(e) = fs::rename(&staged, path) {
        let _ = fs::remove_file(&staged);
        return Err(io_error(path, e));
    }

    // Persist the rename itself.
    if let Some(dir) = dir {
        File::open(dir)
            .and_then(|handle| handle.sync_all())
            .map_err(|e| io_error(dir, e))?;
    }
    Ok(())
}

fn write_synced<T: Serialize>(path: &Path, records: &[T]) -> Result<(), JsonlError> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut writer = BufWriter::new(file);
    write_records(&mut writer, records)?;
    let file = writer
        .into_inner()
        .map_err(|e| io_error(path, e.error()))?;
    file.sync_all().map_err(|e| io_error(path, e))
}

fn staging_path(path: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(format!(".tmp.{}.{nanos}", std::process::id()));
    PathBuf::from(name)
}

fn io_error(path: &Path, err: impl std::fmt::Display) -> JsonlError {
    JsonlError::Io(0, format!("{}: {err}", path.display()))
}

/// Store files are UTF-8 text; NUL bytes mean a torn or foreign write.
fn check_text_bytes(path: &Path, bytes: &[u8]) -> Result<(), JsonlError> {
    let problem = if bytes.contains(&0) {
        "contains NUL byte(s)"
    } else if std::str::from_utf8(bytes).is_err() {
        "contains non-UTF-8 byte sequence(s)"
    } else {
        return Ok(());
    };
    Err(JsonlError::Corrupt(format!("{}: {problem}", path.display())))
}

/// Errors from JSONL operations.
#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("line {0}: I/O error: {1}")]
    Io(usize, String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("corrupted store file: {0}")]
    Corrupt(String),
}
