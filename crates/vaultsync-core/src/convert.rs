//! Conversion between JSON record files and flat `.env` text.
//!
//! The flat format keeps record metadata in comments that FOLLOW each entry:
//!
//! ```text
//! DATABASE_URL=postgres://u:p@host/db
//! # ID: 3f1c…
//! # Note: primary database
//! # Note: rotated quarterly
//!
//! ```
//!
//! [`to_env_text`] and [`from_env_text`] are inverses for records whose keys
//! and values contain no line breaks. Parsing is permissive: lines that are
//! not entries or recognized metadata comments are skipped.
//!
//! The leading-comment dialect used for importing hand-written `.env` files
//! lives in [`crate::namespace`]; the two are deliberately separate.

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{info, warn};

use crate::error::ConvertError;
use crate::namespace::from_env_text_namespaced;
use crate::record::SecretRecord;

/// Default location of the flat text export.
pub const DEFAULT_ENV_FILE: &str = "data/secrets.env";

const ID_PREFIX: &str = "# ID:";
const NOTE_PREFIX: &str = "# Note:";

/// Render records as flat `.env` text with trailing metadata comments.
pub fn to_env_text(records: &[SecretRecord]) -> String {
    let mut out = String::new();

    for record in records {
        let _ = writeln!(out, "{}={}", record.key, record.value);
        if !record.id.is_empty() {
            let _ = writeln!(out, "{ID_PREFIX} {}", record.id);
        }
        if !record.note.is_empty() {
            for line in record.note.split('\n') {
                let _ = writeln!(out, "{NOTE_PREFIX} {line}");
            }
        }
        out.push('\n');
    }

    out
}

/// Record under construction while scanning lines.
struct Pending {
    id: String,
    key: String,
    value: String,
    note: Option<String>,
}

impl Pending {
    fn finish(self) -> SecretRecord {
        let id = if self.id.is_empty() {
            SecretRecord::local_id()
        } else {
            self.id
        };
        SecretRecord {
            id,
            key: self.key,
            value: self.value,
            note: self.note.unwrap_or_default(),
        }
    }
}

/// Parse flat `.env` text whose metadata comments follow each entry.
///
/// Every `KEY=VALUE` line starts a new record (split on the first `=`).
/// `# ID:` and `# Note:` comments apply to the most recent entry; other
/// comments and blank lines are ignored. Records left without an id get a
/// synthesized `local-<uuid>` id.
pub fn from_env_text(text: &str) -> Vec<SecretRecord> {
    let mut records = Vec::new();
    let mut current: Option<Pending> = None;

    for raw in text.lines() {
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('#') {
            let Some(pending) = current.as_mut() else {
                continue;
            };
            if let Some(id) = trimmed.strip_prefix(ID_PREFIX) {
                pending.id = id.trim().to_owned();
            } else if let Some(rest) = trimmed.strip_prefix(NOTE_PREFIX) {
                let note_line = rest.strip_prefix(' ').unwrap_or(rest);
                match pending.note.as_mut() {
                    Some(note) => {
                        note.push('\n');
                        note.push_str(note_line);
                    }
                    None => pending.note = Some(note_line.to_owned()),
                }
            }
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        if let Some(done) = current.take() {
            records.push(done.finish());
        }
        current = Some(Pending {
            id: String::new(),
            key: key.to_owned(),
            value: value.trim().to_owned(),
            note: None,
        });
    }

    if let Some(done) = current {
        records.push(done.finish());
    }

    records
}

// ── File operations ──────────────────────────────────────────────────

fn io_error(path: &Path, err: impl std::fmt::Display) -> ConvertError {
    ConvertError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Read a source file, returning `None` (and logging) if it does not exist.
async fn read_source(path: &Path) -> Result<Option<String>, ConvertError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "source file not found, nothing to convert");
            Ok(None)
        }
        Err(e) => Err(io_error(path, e)),
    }
}

async fn write_target(path: &Path, contents: &[u8]) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_error(path, e))?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| io_error(path, e))
}

/// Read a JSON record array. A missing file yields `Ok(None)`.
///
/// # Errors
///
/// Returns [`ConvertError::Io`] if the file exists but cannot be read and
/// [`ConvertError::Json`] if it is not a record array.
pub async fn read_json_file(
    path: impl AsRef<Path>,
) -> Result<Option<Vec<SecretRecord>>, ConvertError> {
    let path = path.as_ref();
    let Some(text) = read_source(path).await? else {
        return Ok(None);
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| ConvertError::Json {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Write records as a pretty-printed JSON array, creating parent directories.
///
/// # Errors
///
/// Returns [`ConvertError::Io`] if the file cannot be written.
pub async fn write_json_file(
    path: impl AsRef<Path>,
    records: &[SecretRecord],
) -> Result<(), ConvertError> {
    let path = path.as_ref();
    let mut bytes = serde_json::to_vec_pretty(records).map_err(|e| io_error(path, e))?;
    bytes.push(b'\n');
    write_target(path, &bytes).await
}

/// Read flat `.env` text. A missing file yields `Ok(None)`.
///
/// # Errors
///
/// Returns [`ConvertError::Io`] if the file exists but cannot be read.
pub async fn read_env_file(path: impl AsRef<Path>) -> Result<Option<String>, ConvertError> {
    read_source(path.as_ref()).await
}

/// Write records as flat `.env` text, creating parent directories.
///
/// # Errors
///
/// Returns [`ConvertError::Io`] if the file cannot be written.
pub async fn write_env_file(
    path: impl AsRef<Path>,
    records: &[SecretRecord],
) -> Result<(), ConvertError> {
    write_target(path.as_ref(), to_env_text(records).as_bytes()).await
}

/// Convert a JSON record file into a flat `.env` file.
///
/// Returns the number of records written, or `None` when the source does
/// not exist and nothing was written.
///
/// # Errors
///
/// Returns [`ConvertError`] on unreadable input, malformed JSON, or an
/// unwritable target.
pub async fn convert_json_to_env(
    json_path: impl AsRef<Path>,
    env_path: impl AsRef<Path>,
) -> Result<Option<usize>, ConvertError> {
    let (json_path, env_path) = (json_path.as_ref(), env_path.as_ref());
    let Some(records) = read_json_file(json_path).await? else {
        return Ok(None);
    };
    write_env_file(env_path, &records).await?;
    info!(
        from = %json_path.display(),
        to = %env_path.display(),
        count = records.len(),
        "converted JSON to env"
    );
    Ok(Some(records.len()))
}

/// Convert a flat `.env` file (trailing metadata comments) into a JSON
/// record file.
///
/// Returns the number of records written, or `None` when the source does
/// not exist and nothing was written.
///
/// # Errors
///
/// Returns [`ConvertError`] on unreadable input or an unwritable target.
pub async fn convert_env_to_json(
    env_path: impl AsRef<Path>,
    json_path: impl AsRef<Path>,
) -> Result<Option<usize>, ConvertError> {
    let (env_path, json_path) = (env_path.as_ref(), json_path.as_ref());
    let Some(text) = read_env_file(env_path).await? else {
        return Ok(None);
    };
    let records = from_env_text(&text);
    write_json_file(json_path, &records).await?;
    info!(
        from = %env_path.display(),
        to = %json_path.display(),
        count = records.len(),
        "converted env to JSON"
    );
    Ok(Some(records.len()))
}

/// Convert a hand-written `.env` file (leading doc comments) into a JSON
/// record file with `PROJECT/ENV/VAR` keys.
///
/// Returns the number of records written, or `None` when the source does
/// not exist and nothing was written.
///
/// # Errors
///
/// Returns [`ConvertError`] on unreadable input or an unwritable target.
pub async fn convert_env_to_json_namespaced(
    env_path: impl AsRef<Path>,
    json_path: impl AsRef<Path>,
    project: &str,
    env: &str,
) -> Result<Option<usize>, ConvertError> {
    let (env_path, json_path) = (env_path.as_ref(), json_path.as_ref());
    let Some(text) = read_env_file(env_path).await? else {
        return Ok(None);
    };
    let records = from_env_text_namespaced(&text, project, env);
    write_json_file(json_path, &records).await?;
    info!(
        from = %env_path.display(),
        to = %json_path.display(),
        project,
        env,
        count = records.len(),
        "converted env to namespaced JSON"
    );
    Ok(Some(records.len()))
}
