use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{PechaError, Result};
use crate::pipeline::IndependentText;
use crate::types::RecitationText;

pub const BASE_TEXT_FILE: &str = "base.txt";
pub const META_FILE: &str = "meta.json";

/// Direct children of `dir`, sorted by path. Hidden entries are skipped.
pub fn list_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PechaError::InvalidInput {
            message: format!("not a directory: {}", dir.display()),
        });
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| PechaError::InvalidInput {
            message: format!("reading {}: {}", dir.display(), e),
        })?;
        let hidden = entry.file_name().to_str().map(|n| n.starts_with('.')).unwrap_or(false);
        if !hidden {
            entries.push(entry.into_path());
        }
    }

    entries.sort();
    Ok(entries)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load a standalone text directory containing `base.txt` and `meta.json`.
pub fn load_independent_text(dir: &Path) -> Result<IndependentText> {
    let base_path = dir.join(BASE_TEXT_FILE);
    let raw_text = fs::read_to_string(&base_path)
        .map_err(|e| PechaError::io(format!("reading {}", base_path.display()), e))?;

    let meta_path = dir.join(META_FILE);
    let meta_str = fs::read_to_string(&meta_path)
        .map_err(|e| PechaError::io(format!("reading {}", meta_path.display()), e))?;
    let metadata = serde_json::from_str(&meta_str)
        .map_err(|e| PechaError::json(format!("parsing {}", meta_path.display()), e))?;

    Ok(IndependentText {
        name: entry_name(dir),
        raw_text,
        metadata,
    })
}

pub fn load_recitation_text(path: &Path) -> Result<RecitationText> {
    let content = fs::read_to_string(path)
        .map_err(|e| PechaError::io(format!("reading {}", path.display()), e))?;
    serde_json::from_str(&content)
        .map_err(|e| PechaError::json(format!("parsing {}", path.display()), e))
}

/// Write the identifiers of a batch as a JSON list.
pub fn write_id_list<T: Serialize>(path: &Path, ids: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| PechaError::io(format!("creating {}", parent.display()), e))?;
        }
    }

    let json = serde_json::to_string_pretty(ids)
        .map_err(|e| PechaError::json("encoding identifier list", e))?;
    fs::write(path, json)
        .map_err(|e| PechaError::io(format!("writing {}", path.display()), e))
}
