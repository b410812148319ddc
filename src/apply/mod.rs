use fs_err as fs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::{Result, UiAgentError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyKind {
    Created,
    Updated,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct FileResult {
    pub kind: ApplyKind,
    pub path: PathBuf,
    pub bytes_before: Option<u64>,
    pub bytes_after: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ApplySummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub bytes_written: u64,
    pub details: Vec<FileResult>,
}

/// Writes each generated file into `out_dir`, replacing files atomically.
/// With `dry` nothing touches the disk but the summary is still computed.
pub fn write_files(out_dir: &Path, files: &BTreeMap<String, String>, dry: bool) -> Result<ApplySummary> {
    let mut sum = ApplySummary::default();
    if !dry {
        fs::create_dir_all(out_dir)?;
    }

    for (name, content) in files {
        if name.contains('/') || name.contains('\\') || name.starts_with('.') {
            return Err(UiAgentError::Validation(format!("refusing to write outside output dir: {name}")));
        }
        let abs = out_dir.join(name);
        let before = if abs.exists() { Some(abs.metadata()?.len()) } else { None };
        let after = content.len() as u64;

        if content.is_empty() {
            sum.skipped += 1;
            sum.details.push(FileResult { kind: ApplyKind::Skipped, path: abs, bytes_before: before, bytes_after: 0 });
            continue;
        }

        if !dry {
            let tmp = NamedTempFile::new_in(out_dir)?;
            fs::write(tmp.path(), content)?;
            tmp.persist(&abs).map_err(|e| UiAgentError::Io(e.error))?;
            debug!(path = %abs.display(), bytes = after, "wrote file");
        }

        let kind = if before.is_some() { ApplyKind::Updated } else { ApplyKind::Created };
        match kind {
            ApplyKind::Created => sum.created += 1,
            _ => sum.updated += 1,
        }
        sum.bytes_written += after;
        sum.details.push(FileResult { kind, path: abs, bytes_before: before, bytes_after: after });
    }

    Ok(sum)
}
