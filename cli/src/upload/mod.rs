pub mod independent_text;
pub mod recitation;

use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use pecha_backend::loader::{list_entries, write_id_list};
use pecha_backend::logger;

pub use independent_text::IndependentTextBatch;
pub use recitation::RecitationBatch;

/// Uploads one document per directory entry.
pub trait BatchUploader {
    type Ids: Serialize;

    fn label(&self) -> &'static str;

    fn upload_entry(&mut self, path: &Path) -> Result<Self::Ids>;
}

/// Summary of a batch run.
#[derive(Debug)]
pub struct BatchReport {
    pub uploaded: usize,
    pub failed: Vec<String>,
}

/// Upload every entry of `input_dir` in name order, one at a time, and write
/// the identifiers of the successful ones to `output_path`.
///
/// A failed document is logged and skipped, the rest of the batch still runs.
pub fn run_batch<U: BatchUploader>(uploader: &mut U, input_dir: &Path, output_path: &Path) -> Result<BatchReport> {
    let entries = list_entries(input_dir)
        .with_context(|| format!("Failed to list {}", input_dir.display()))?;

    logger::info(&format!("=== {}: {} documents in {} ===", uploader.label(), entries.len(), input_dir.display()));

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let mut ids = Vec::new();
    let mut failed = Vec::new();

    for path in entries {
        let name = path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pb.set_message(name.clone());

        match uploader.upload_entry(&path) {
            Ok(entry_ids) => ids.push(entry_ids),
            Err(e) => {
                logger::error(&format!("{}: {:#}", name, e));
                failed.push(name);
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    write_id_list(output_path, &ids)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    logger::info(&format!("{}: {} uploaded, {} failed, ids written to {}",
                          uploader.label(), ids.len(), failed.len(), output_path.display()));

    Ok(BatchReport { uploaded: ids.len(), failed })
}
