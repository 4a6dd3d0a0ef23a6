use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::AnnounceError;
use crate::manifest::BuildInfo;

const COMMIT_MESSAGE: &str = "Update new IDs and push OTA";
const COMMIT_DESCRIPTION: &str = "Data for following device(s) were changed:";

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(content.as_bytes())?;
    file.flush()
}

/// Previously announced identifiers, one per line.
///
/// A missing file is fatal unless `bootstrap_missing` is set, in which case
/// the store starts out empty and every current build is announced.
pub fn load_identifiers(path: &Path, bootstrap_missing: bool) -> Result<Vec<String>, AnnounceError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound && bootstrap_missing => {
            warn!(path = %path.display(), "Identifier store missing, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(AnnounceError::IdentifierStoreUnreadable {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let ids: Vec<String> = content
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    debug!(path = %path.display(), count = ids.len(), "Loaded identifier store");
    Ok(ids)
}

/// Overwrite the store with `ids`, in the given order.
pub fn save_identifiers(path: &Path, ids: &[String]) -> Result<(), AnnounceError> {
    let mut content = String::new();
    for id in ids {
        content.push_str(id);
        content.push('\n');
    }
    write_file(path, &content).map_err(|source| AnnounceError::StoreWrite {
        path: path.to_path_buf(),
        source,
    })
}

pub fn render_commit_note(prefix: &str, announced: &[BuildInfo]) -> String {
    let mut note = format!("{}: {} [BOT]\n\n{}\n", prefix, COMMIT_MESSAGE, COMMIT_DESCRIPTION);
    for info in announced {
        note.push_str(&format!("- {} ({})\n", info.device_name, info.codename));
    }
    note
}

pub fn write_commit_note(path: &Path, prefix: &str, announced: &[BuildInfo]) -> Result<(), AnnounceError> {
    write_file(path, &render_commit_note(prefix, announced)).map_err(|source| {
        AnnounceError::StoreWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}
