use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{PechaError, Result};
use crate::logger;
use crate::types::{AnnotationId, Instance, InstanceId, SearchSegmentation, TextId, TranslationInstance};

/// The remote content server, the system of record for texts, instances and annotations.
///
/// Each call blocks until the server answers with the new object's identifier.
pub trait ContentServer {
    fn create_text(&self, metadata: &Value) -> Result<TextId>;

    fn create_instance(&self, text_id: &TextId, instance: &Instance) -> Result<InstanceId>;

    fn create_search_segmentation(
        &self,
        instance_id: &InstanceId,
        annotation: &SearchSegmentation,
    ) -> Result<AnnotationId>;

    /// Creates both the translation's text and its instance.
    fn create_translation_instance(
        &self,
        root_instance_id: &InstanceId,
        translation: &TranslationInstance,
    ) -> Result<(TextId, InstanceId)>;
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TranslationResponse {
    text_id: String,
    instance_id: String,
}

pub struct HttpContentServer {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpContentServer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PechaError::transport("create HTTP client", e))?;

        Ok(HttpContentServer {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn post<B, R>(&self, operation: &'static str, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        logger::debug(&format!("POST {}", url));

        let response = self.client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| PechaError::transport(operation, e))?;

        let status = response.status();
        let text = response.text()
            .map_err(|e| PechaError::transport(operation, e))?;

        if !status.is_success() {
            return Err(PechaError::transport(operation, format!("server returned {}: {}", status, text)));
        }

        parse_response(operation, &text)
    }
}

pub(crate) fn parse_response<R: DeserializeOwned>(operation: &'static str, body: &str) -> Result<R> {
    serde_json::from_str(body)
        .map_err(|e| PechaError::transport(operation, format!("unexpected response {:?}: {}", body, e)))
}

impl ContentServer for HttpContentServer {
    fn create_text(&self, metadata: &Value) -> Result<TextId> {
        let res: IdResponse = self.post("create text", "texts", metadata)?;
        Ok(TextId(res.id))
    }

    fn create_instance(&self, text_id: &TextId, instance: &Instance) -> Result<InstanceId> {
        let path = format!("texts/{}/instances", text_id);
        let res: IdResponse = self.post("create instance", &path, instance)?;
        Ok(InstanceId(res.id))
    }

    fn create_search_segmentation(
        &self,
        instance_id: &InstanceId,
        annotation: &SearchSegmentation,
    ) -> Result<AnnotationId> {
        let path = format!("instances/{}/annotation", instance_id);
        let res: IdResponse = self.post("create search segmentation", &path, annotation)?;
        Ok(AnnotationId(res.id))
    }

    fn create_translation_instance(
        &self,
        root_instance_id: &InstanceId,
        translation: &TranslationInstance,
    ) -> Result<(TextId, InstanceId)> {
        let path = format!("instances/{}/translation", root_instance_id);
        let res: TranslationResponse = self.post("create translation instance", &path, translation)?;
        Ok((TextId(res.text_id), InstanceId(res.instance_id)))
    }
}
