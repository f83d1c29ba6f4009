use std::path::Path;

use anyhow::Result;

use pecha_backend::loader::load_recitation_text;
use pecha_backend::logger;
use pecha_backend::pipeline::Uploader;
use pecha_backend::types::RecitationBundle;

use crate::upload::BatchUploader;

/// Recitation texts: one JSON file per prayer, with row-aligned segments per language.
pub struct RecitationBatch<'a> {
    uploader: Uploader<'a>,
    root_lang: String,
    translation_langs: Vec<String>,
}

impl<'a> RecitationBatch<'a> {
    pub fn new(uploader: Uploader<'a>, root_lang: &str, translation_langs: Vec<String>) -> Self {
        Self {
            uploader,
            root_lang: root_lang.to_string(),
            translation_langs,
        }
    }
}

impl<'a> BatchUploader for RecitationBatch<'a> {
    type Ids = RecitationBundle;

    fn label(&self) -> &'static str {
        "recitation texts"
    }

    /// Translation failures are logged by the pipeline. The languages that did
    /// upload are still returned.
    fn upload_entry(&mut self, path: &Path) -> Result<RecitationBundle> {
        let name = path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = load_recitation_text(path)?;

        let upload = self.uploader.upload_recitation_text(&name, &text, &self.root_lang, &self.translation_langs)?;

        if !upload.is_complete() {
            logger::warn(&format!("{}: {} translation(s) not uploaded", name, upload.failures.len()));
        }

        Ok(upload.ids)
    }
}
