use std::path::Path;

use anyhow::Result;

use pecha_backend::loader::load_independent_text;
use pecha_backend::pipeline::Uploader;
use pecha_backend::types::IdentifierBundle;

use crate::upload::BatchUploader;

/// Standalone texts: one directory per text, holding `base.txt` and `meta.json`.
pub struct IndependentTextBatch<'a> {
    uploader: Uploader<'a>,
    lang: String,
}

impl<'a> IndependentTextBatch<'a> {
    pub fn new(uploader: Uploader<'a>, lang: &str) -> Self {
        Self { uploader, lang: lang.to_string() }
    }
}

impl<'a> BatchUploader for IndependentTextBatch<'a> {
    type Ids = IdentifierBundle;

    fn label(&self) -> &'static str {
        "independent texts"
    }

    fn upload_entry(&mut self, path: &Path) -> Result<IdentifierBundle> {
        let doc = load_independent_text(path)?;
        let ids = self.uploader.upload_independent_text(&doc, &self.lang)?;
        Ok(ids)
    }
}
