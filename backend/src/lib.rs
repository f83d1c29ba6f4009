pub mod types;
pub mod error;
pub mod config;
pub mod logger;

pub mod normalize;
pub mod segmenter;
pub mod alignment;
pub mod instance;
pub mod collaborators;
pub mod server;
pub mod pipeline;
pub mod loader;

use std::env;
use std::fs::create_dir_all;
use std::path::PathBuf;
use std::error::Error;
use app_dirs::{get_app_root, AppDataType, AppInfo};

pub use error::{PechaError, Result};

pub const APP_INFO: AppInfo = AppInfo{name: "pecha-uploader", author: "openpecha"};

/// The uploader's data directory, for logs and default output files.
///
/// `PECHA_DIR` takes precedence over the platform user data directory.
pub fn get_create_pecha_dir() -> std::result::Result<PathBuf, Box<dyn Error>> {
    let p = match env::var("PECHA_DIR") {
        Ok(s) if !s.is_empty() => PathBuf::from(s),
        _ => get_app_root(AppDataType::UserData, &APP_INFO)?,
    };
    if !p.exists() {
        create_dir_all(&p)?;
    }
    Ok(p)
}
