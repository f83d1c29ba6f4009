//! Upload orchestration.
//!
//! Each document is uploaded as a chain of steps:
//!
//! ```text
//! CreateText -> CreateInstance -> CreateSearchSegmentation            (root)
//! CreateTranslationInstance -> CreateSearchSegmentation               (per translation)
//! ```
//!
//! Every step takes the identifier its dependency returned, so a step can't
//! run before its dependency has succeeded. A failed step stops its branch.
//! Objects created by earlier steps are not rolled back.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::collaborators::{SearchSegmenter, Tokenizer};
use crate::error::PechaError;
use crate::instance::{
    assemble_translation_instance, prepare_independent_instance, prepare_root_instance,
    prepare_search_segmentation, prepare_text_metadata, stamp_text_metadata, wrap_search_segmentation,
    AssemblerConfig,
};
use crate::logger;
use crate::normalize::normalize;
use crate::server::ContentServer;
use crate::types::{
    AnnotationId, IdentifierBundle, Instance, InstanceId, RecitationBundle, RecitationText,
    SearchSegmentation, SegmentAnnotation, TextId, TranslationInstance,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    CreateText,
    CreateInstance,
    CreateSearchSegmentation,
    CreateTranslationInstance,
}

impl UploadStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStep::CreateText => "create text",
            UploadStep::CreateInstance => "create instance",
            UploadStep::CreateSearchSegmentation => "create search segmentation",
            UploadStep::CreateTranslationInstance => "create translation instance",
        }
    }
}

impl fmt::Display for UploadStep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    Root(String),
    Translation(String),
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Branch::Root(lang) => write!(f, "root:{}", lang),
            Branch::Translation(lang) => write!(f, "translation:{}", lang),
        }
    }
}

/// A failure with the document, branch and step it happened in.
#[derive(Debug, Error)]
#[error("{document} [{branch}] {step}: {source}")]
pub struct StepError {
    pub document: String,
    pub branch: Branch,
    pub step: UploadStep,
    #[source]
    pub source: PechaError,
}

/// A standalone text as loaded from disk: raw text and the caller's metadata object.
#[derive(Debug, Clone)]
pub struct IndependentText {
    pub name: String,
    pub raw_text: String,
    pub metadata: Value,
}

#[derive(Debug)]
pub struct RecitationUpload {
    pub ids: RecitationBundle,
    pub failures: Vec<StepError>,
}

impl RecitationUpload {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Uploader<'a> {
    pub server: &'a dyn ContentServer,
    pub tokenizer: &'a dyn Tokenizer,
    pub search_segmenter: &'a dyn SearchSegmenter,
    pub config: &'a AssemblerConfig,
}

/// Runs the steps of one branch, attaching context to failures.
struct BranchRun<'a, 'b> {
    uploader: &'b Uploader<'a>,
    document: &'b str,
    branch: Branch,
}

impl<'a, 'b> BranchRun<'a, 'b> {
    fn fail(&self, step: UploadStep) -> impl FnOnce(PechaError) -> StepError + '_ {
        move |source| StepError {
            document: self.document.to_string(),
            branch: self.branch.clone(),
            step,
            source,
        }
    }

    fn done(&self, step: UploadStep, id: &dyn fmt::Display) {
        logger::info(&format!("{} [{}] {}: {}", self.document, self.branch, step, id));
    }

    fn create_text(&self, metadata: &Value) -> Result<TextId, StepError> {
        let step = UploadStep::CreateText;
        let id = self.uploader.server.create_text(metadata).map_err(self.fail(step))?;
        self.done(step, &id);
        Ok(id)
    }

    fn create_instance(&self, text_id: &TextId, instance: &Instance) -> Result<InstanceId, StepError> {
        let step = UploadStep::CreateInstance;
        let id = self.uploader.server.create_instance(text_id, instance).map_err(self.fail(step))?;
        self.done(step, &id);
        Ok(id)
    }

    fn create_search_segmentation(
        &self,
        instance_id: &InstanceId,
        annotation: &SearchSegmentation,
    ) -> Result<AnnotationId, StepError> {
        let step = UploadStep::CreateSearchSegmentation;
        let id = self.uploader.server
            .create_search_segmentation(instance_id, annotation)
            .map_err(self.fail(step))?;
        self.done(step, &id);
        Ok(id)
    }

    fn create_translation_instance(
        &self,
        root_instance_id: &InstanceId,
        translation: &TranslationInstance,
    ) -> Result<(TextId, InstanceId), StepError> {
        let step = UploadStep::CreateTranslationInstance;
        let (text_id, instance_id) = self.uploader.server
            .create_translation_instance(root_instance_id, translation)
            .map_err(self.fail(step))?;
        self.done(step, &instance_id);
        Ok((text_id, instance_id))
    }
}

impl<'a> Uploader<'a> {
    fn branch<'b>(&'b self, document: &'b str, branch: Branch) -> BranchRun<'a, 'b> {
        BranchRun { uploader: self, document, branch }
    }

    /// Normalize, segment and upload a standalone text in `lang`.
    pub fn upload_independent_text(&self, doc: &IndependentText, lang: &str) -> Result<IdentifierBundle, StepError> {
        let run = self.branch(&doc.name, Branch::Root(lang.to_string()));
        let content = normalize(&doc.raw_text);

        let metadata = stamp_text_metadata(doc.metadata.clone(), &self.config.date)
            .map_err(run.fail(UploadStep::CreateText))?;
        let instance = prepare_independent_instance(self.config, self.tokenizer, &content)
            .map_err(run.fail(UploadStep::CreateInstance))?;
        let search_ann = prepare_search_segmentation(self.search_segmenter, &content, lang)
            .map_err(run.fail(UploadStep::CreateSearchSegmentation))?;

        let text_id = run.create_text(&metadata)?;
        let instance_id = run.create_instance(&text_id, &instance)?;
        let search_seg_ann_id = run.create_search_segmentation(&instance_id, &search_ann)?;

        logger::info(&format!("{}: independent text uploaded", doc.name));

        Ok(IdentifierBundle { text_id, instance_id, search_seg_ann_id })
    }

    /// Upload a recitation text's root language, then each translation against the root instance.
    ///
    /// A failed root aborts the document. A failed translation is recorded and the others still run.
    /// `root_lang` is skipped if it also appears in `translation_langs`.
    pub fn upload_recitation_text(
        &self,
        name: &str,
        text: &RecitationText,
        root_lang: &str,
        translation_langs: &[String],
    ) -> Result<RecitationUpload, StepError> {
        let run = self.branch(name, Branch::Root(root_lang.to_string()));

        let text_metadata = prepare_text_metadata(self.config, text, "root", root_lang)
            .and_then(|m| serde_json::to_value(m).map_err(|e| PechaError::json("encoding text metadata", e)))
            .map_err(run.fail(UploadStep::CreateText))?;
        let root_instance = prepare_root_instance(self.config, text, root_lang)
            .map_err(run.fail(UploadStep::CreateInstance))?;

        let text_id = run.create_text(&text_metadata)?;
        let instance_id = run.create_instance(&text_id, &root_instance)?;
        let search_ann = wrap_search_segmentation(root_instance.annotation.clone());
        let search_seg_ann_id = run.create_search_segmentation(&instance_id, &search_ann)?;

        let mut ids = RecitationBundle::new();
        ids.insert(root_lang.to_string(), IdentifierBundle {
            text_id,
            instance_id: instance_id.clone(),
            search_seg_ann_id,
        });

        let mut failures = Vec::new();

        for lang in translation_langs {
            if lang == root_lang {
                logger::warn(&format!("{}: skipping translation into the root language '{}'", name, lang));
                continue;
            }
            match self.upload_translation(name, text, &instance_id, &root_instance.annotation, lang) {
                Ok(bundle) => {
                    ids.insert(lang.clone(), bundle);
                }
                Err(e) => {
                    logger::error(&e.to_string());
                    failures.push(e);
                }
            }
        }

        logger::info(&format!("{}: recitation text uploaded ({} languages, {} failed)",
                              name, ids.len(), failures.len()));

        Ok(RecitationUpload { ids, failures })
    }

    fn upload_translation(
        &self,
        name: &str,
        text: &RecitationText,
        root_instance_id: &InstanceId,
        root_segments: &SegmentAnnotation,
        lang: &str,
    ) -> Result<IdentifierBundle, StepError> {
        let run = self.branch(name, Branch::Translation(lang.to_string()));

        let translation = assemble_translation_instance(self.config, root_segments, lang, text)
            .map_err(run.fail(UploadStep::CreateTranslationInstance))?;

        let (text_id, instance_id) = run.create_translation_instance(root_instance_id, &translation)?;
        let search_ann = wrap_search_segmentation(translation.segmentation.clone());
        let search_seg_ann_id = run.create_search_segmentation(&instance_id, &search_ann)?;

        Ok(IdentifierBundle { text_id, instance_id, search_seg_ann_id })
    }
}
