use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;

use dotenvy::dotenv;

use crate::error::{PechaError, Result};
use crate::instance::AssemblerConfig;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000/v2";
/// Recitation texts category on the content server.
pub const DEFAULT_CATEGORY_ID: &str = "A6uBwcy0ZvFj1GfRWThAn";
pub const DEFAULT_AUTHOR_ID: &str = "P4954";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Uploader settings, read from the environment (and `.env` via dotenvy).
///
/// | Variable                  | Default                   |
/// |---------------------------|---------------------------|
/// | `PECHA_SERVER_URL`        | `http://localhost:8000/v2`|
/// | `PECHA_CATEGORY_ID`       | recitation category       |
/// | `PECHA_AUTHOR_ID`         | `P4954`                   |
/// | `PECHA_ROOT_LANG`         | `bo`                      |
/// | `PECHA_TRANSLATION_LANGS` | `en,lzh`                  |
/// | `REQUEST_TIMEOUT_SECS`    | `30`                      |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderConfig {
    pub server_url: String,
    pub category_id: String,
    pub author_person_id: String,
    pub root_lang: String,
    pub translation_langs: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        UploaderConfig {
            server_url: DEFAULT_SERVER_URL.to_string(),
            category_id: DEFAULT_CATEGORY_ID.to_string(),
            author_person_id: DEFAULT_AUTHOR_ID.to_string(),
            root_lang: "bo".to_string(),
            translation_langs: vec!["en".to_string(), "lzh".to_string()],
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl UploaderConfig {
    /// Read the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Read settings from an env file. Variables already set in the process
    /// environment take precedence over the file.
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let invalid = |e: dotenvy::Error| PechaError::InvalidInput {
            message: format!("reading {}: {}", path.display(), e),
        };

        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(invalid)? {
            let (key, value) = item.map_err(invalid)?;
            vars.insert(key, value);
        }

        Ok(Self::from_vars(|key| env::var(key).ok().or_else(|| vars.get(key).cloned())))
    }

    /// Build from a variable lookup. Empty values count as unset.
    pub fn from_vars<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let mut config = UploaderConfig::default();

        if let Some(url) = get("PECHA_SERVER_URL") {
            config.server_url = url;
        }
        if let Some(id) = get("PECHA_CATEGORY_ID") {
            config.category_id = id;
        }
        if let Some(id) = get("PECHA_AUTHOR_ID") {
            config.author_person_id = id;
        }
        if let Some(lang) = get("PECHA_ROOT_LANG") {
            config.root_lang = lang.trim().to_string();
        }
        if let Some(langs) = get("PECHA_TRANSLATION_LANGS") {
            config.translation_langs = parse_langs(&langs);
        }
        if let Some(secs) = get("REQUEST_TIMEOUT_SECS").and_then(|s| s.trim().parse().ok()) {
            config.request_timeout_secs = secs;
        }

        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn assembler_config(&self) -> AssemblerConfig {
        AssemblerConfig::new(&self.category_id, &self.author_person_id)
    }
}

/// "en, lzh" to ["en", "lzh"]
pub fn parse_langs(s: &str) -> Vec<String> {
    s.split(',')
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect()
}
