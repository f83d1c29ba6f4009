use std::cell::RefCell;
use std::collections::HashSet;
use std::env;
use std::sync::Once;

use serde_json::Value;

use pecha_backend::PechaError;
use pecha_backend::collaborators::{SentenceSearchSegmenter, ShadTokenizer};
use pecha_backend::instance::AssemblerConfig;
use pecha_backend::pipeline::Uploader;
use pecha_backend::server::ContentServer;
use pecha_backend::types::{
    AnnotationId, Instance, InstanceId, RecitationText, SearchSegmentation, TextId, TranslationInstance,
};

static SETUP: Once = Once::new();

pub fn test_setup() {
    SETUP.call_once(|| {
        unsafe { env::set_var("DISABLE_LOG", "true"); }
    });
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateText { metadata: Value },
    CreateInstance { text_id: String, content: String },
    CreateSearchSegmentation { instance_id: String, segment_count: usize },
    CreateTranslationInstance { root_instance_id: String, language: String, content: String },
}

/// Content server double. Hands out sequential ids and records every call.
///
/// `order_violations` collects calls that consumed an id the server hadn't issued yet.
pub struct MockServer {
    pub calls: RefCell<Vec<Call>>,
    pub order_violations: RefCell<Vec<String>>,
    issued: RefCell<HashSet<String>>,
    counter: RefCell<usize>,
    fail_when: Box<dyn Fn(&Call) -> bool>,
}

#[allow(dead_code)]
impl MockServer {
    pub fn new() -> Self {
        Self::failing_when(|_| false)
    }

    pub fn failing_when<F: Fn(&Call) -> bool + 'static>(f: F) -> Self {
        MockServer {
            calls: RefCell::new(Vec::new()),
            order_violations: RefCell::new(Vec::new()),
            issued: RefCell::new(HashSet::new()),
            counter: RefCell::new(0),
            fail_when: Box::new(f),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call, operation: &'static str) -> Result<(), PechaError> {
        let fail = (self.fail_when)(&call);
        self.calls.borrow_mut().push(call);
        if fail {
            return Err(PechaError::UploadTransport {
                operation,
                message: "mock failure".to_string(),
            });
        }
        Ok(())
    }

    fn consume(&self, id: &str) {
        if !self.issued.borrow().contains(id) {
            self.order_violations.borrow_mut().push(id.to_string());
        }
    }

    fn issue(&self, prefix: &str) -> String {
        let mut counter = self.counter.borrow_mut();
        *counter += 1;
        let id = format!("{}-{}", prefix, *counter);
        self.issued.borrow_mut().insert(id.clone());
        id
    }
}

impl ContentServer for MockServer {
    fn create_text(&self, metadata: &Value) -> Result<TextId, PechaError> {
        self.record(Call::CreateText { metadata: metadata.clone() }, "create text")?;
        Ok(TextId(self.issue("text")))
    }

    fn create_instance(&self, text_id: &TextId, instance: &Instance) -> Result<InstanceId, PechaError> {
        self.consume(&text_id.0);
        self.record(Call::CreateInstance {
            text_id: text_id.0.clone(),
            content: instance.content.clone(),
        }, "create instance")?;
        Ok(InstanceId(self.issue("instance")))
    }

    fn create_search_segmentation(
        &self,
        instance_id: &InstanceId,
        annotation: &SearchSegmentation,
    ) -> Result<AnnotationId, PechaError> {
        self.consume(&instance_id.0);
        self.record(Call::CreateSearchSegmentation {
            instance_id: instance_id.0.clone(),
            segment_count: annotation.annotation.len(),
        }, "create search segmentation")?;
        Ok(AnnotationId(self.issue("ann")))
    }

    fn create_translation_instance(
        &self,
        root_instance_id: &InstanceId,
        translation: &TranslationInstance,
    ) -> Result<(TextId, InstanceId), PechaError> {
        self.consume(&root_instance_id.0);
        self.record(Call::CreateTranslationInstance {
            root_instance_id: root_instance_id.0.clone(),
            language: translation.language.clone(),
            content: translation.content.clone(),
        }, "create translation instance")?;
        Ok((TextId(self.issue("text")), InstanceId(self.issue("instance"))))
    }
}

pub static TOKENIZER: ShadTokenizer = ShadTokenizer;
pub static SEARCH_SEGMENTER: SentenceSearchSegmenter = SentenceSearchSegmenter;

pub fn test_config() -> AssemblerConfig {
    AssemblerConfig::new("CATEGORY", "P0001").with_date("2024-03-01")
}

pub fn uploader<'a>(server: &'a MockServer, config: &'a AssemblerConfig) -> Uploader<'a> {
    Uploader {
        server,
        tokenizer: &TOKENIZER,
        search_segmenter: &SEARCH_SEGMENTER,
        config,
    }
}

#[allow(dead_code)]
pub fn sample_prayer() -> RecitationText {
    let s = std::fs::read_to_string("tests/data/prayer.json").expect("Failed to read prayer.json");
    serde_json::from_str(&s).expect("Failed to parse prayer.json")
}

#[allow(dead_code)]
pub fn langs(list: &[&str]) -> Vec<String> {
    list.iter().map(|l| l.to_string()).collect()
}
