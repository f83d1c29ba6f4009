mod upload;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use pecha_backend::collaborators::{SentenceSearchSegmenter, ShadTokenizer};
use pecha_backend::config::{parse_langs, UploaderConfig};
use pecha_backend::get_create_pecha_dir;
use pecha_backend::instance::{
    assemble_translation_instance, prepare_root_instance, prepare_text_metadata, wrap_search_segmentation,
};
use pecha_backend::loader::load_recitation_text;
use pecha_backend::logger;
use pecha_backend::normalize::normalize;
use pecha_backend::pipeline::Uploader;
use pecha_backend::server::HttpContentServer;

use upload::{run_batch, BatchReport, IndependentTextBatch, RecitationBatch};

#[derive(Parser, Debug)]
#[command(author, version, about = "Pecha uploader CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the content server API.
    /// If not provided, the PECHA_SERVER_URL environment variable will be used.
    #[arg(long, global = true, value_name = "URL", env = "PECHA_SERVER_URL")]
    server_url: Option<String>,

    /// Read settings from this env file instead of `.env`.
    #[arg(long, global = true, value_name = "FILE_PATH")]
    env_file: Option<PathBuf>,

    /// Log level for this run, overriding LOG_LEVEL.
    #[arg(long, global = true, value_name = "LEVEL",
          value_parser = ["silent", "error", "warn", "info", "debug"])]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload standalone texts, one directory per text containing base.txt and meta.json
    #[command(arg_required_else_help = true)]
    UploadTexts {
        #[arg(value_name = "DIRECTORY_PATH")]
        input_dir: PathBuf,

        /// Where to write the list of uploaded identifiers
        #[arg(long, value_name = "FILE_PATH")]
        output: Option<PathBuf>,

        /// Language of the texts
        #[arg(long, default_value = "bo")]
        lang: String,
    },

    /// Upload recitation texts (prayers), one JSON file per prayer
    #[command(arg_required_else_help = true)]
    UploadPrayers {
        #[arg(value_name = "DIRECTORY_PATH")]
        input_dir: PathBuf,

        /// Where to write the list of uploaded identifiers
        #[arg(long, value_name = "FILE_PATH")]
        output: Option<PathBuf>,

        /// Comma separated translation languages, e.g. "en,lzh"
        #[arg(long, value_name = "LANGS")]
        langs: Option<String>,
    },

    /// Print the payloads a prayer would be uploaded with, without contacting the server
    #[command(arg_required_else_help = true)]
    PreviewPrayer {
        #[arg(value_name = "FILE_PATH")]
        path: PathBuf,

        /// Translation language to preview
        #[arg(long, default_value = "en")]
        lang: String,
    },

    /// Print the normalized content of a raw text file
    #[command(arg_required_else_help = true)]
    Normalize {
        #[arg(value_name = "FILE_PATH")]
        path: PathBuf,
    },
}

fn default_output(file_name: &str) -> Result<PathBuf> {
    let dir = get_create_pecha_dir()
        .map_err(|e| anyhow::anyhow!("Failed to get pecha directory: {}", e))?;
    Ok(dir.join(file_name))
}

fn check_report(report: BatchReport) -> Result<()> {
    println!("Uploaded: {}", report.uploaded);
    if report.failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} document(s) failed: {}", report.failed.len(), report.failed.join(", "))
    }
}

fn upload_texts(config: &UploaderConfig, input_dir: &Path, output: Option<PathBuf>, lang: &str) -> Result<()> {
    let server = HttpContentServer::new(&config.server_url, config.request_timeout())?;
    let assembler = config.assembler_config();
    let uploader = Uploader {
        server: &server,
        tokenizer: &ShadTokenizer,
        search_segmenter: &SentenceSearchSegmenter,
        config: &assembler,
    };

    let output = match output {
        Some(p) => p,
        None => default_output("independent_text_list.json")?,
    };

    let mut batch = IndependentTextBatch::new(uploader, lang);
    check_report(run_batch(&mut batch, input_dir, &output)?)
}

fn upload_prayers(config: &UploaderConfig, input_dir: &Path, output: Option<PathBuf>) -> Result<()> {
    let server = HttpContentServer::new(&config.server_url, config.request_timeout())?;
    let assembler = config.assembler_config();
    let uploader = Uploader {
        server: &server,
        tokenizer: &ShadTokenizer,
        search_segmenter: &SentenceSearchSegmenter,
        config: &assembler,
    };

    let output = match output {
        Some(p) => p,
        None => default_output("recitation_text_list.json")?,
    };

    let mut batch = RecitationBatch::new(uploader, &config.root_lang, config.translation_langs.clone());
    check_report(run_batch(&mut batch, input_dir, &output)?)
}

fn preview_prayer(config: &UploaderConfig, path: &Path, lang: &str) -> Result<()> {
    let assembler = config.assembler_config();
    let text = load_recitation_text(path)?;
    let root_lang = &config.root_lang;

    let text_metadata = prepare_text_metadata(&assembler, &text, "root", root_lang)?;
    let root = prepare_root_instance(&assembler, &text, root_lang)?;
    let translation = assemble_translation_instance(&assembler, &root.annotation, lang, &text)?;
    let search_segmentation = wrap_search_segmentation(root.annotation.clone());

    let preview = serde_json::json!({
        "text": text_metadata,
        "instance": root,
        "search_segmentation": search_segmentation,
        "translation_instance": translation,
    });

    println!("{}", serde_json::to_string_pretty(&preview)?);
    Ok(())
}

fn normalize_file(path: &Path) -> Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    println!("{}", normalize(&raw));
    Ok(())
}

fn main() {
    if dotenv().is_err() {
        eprintln!("Info: No .env file found or failed to load.");
    }

    let cli = Cli::parse();

    if let Some(level) = &cli.log_level {
        if !logger::set_log_level_str(level) {
            eprintln!("Invalid log level: {}", level);
            exit(1);
        }
    }

    let mut config = match &cli.env_file {
        Some(path) => match UploaderConfig::from_env_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error reading config: {}", e);
                exit(1);
            }
        },
        None => UploaderConfig::from_env(),
    };
    if let Some(url) = cli.server_url {
        config.server_url = url;
    }

    let command_result = match cli.command {
        Commands::UploadTexts { input_dir, output, lang } => {
            upload_texts(&config, &input_dir, output, &lang)
        }

        Commands::UploadPrayers { input_dir, output, langs } => {
            if let Some(langs) = langs {
                config.translation_langs = parse_langs(&langs);
            }
            upload_prayers(&config, &input_dir, output)
        }

        Commands::PreviewPrayer { path, lang } => {
            preview_prayer(&config, &path, &lang)
        }

        Commands::Normalize { path } => {
            normalize_file(&path)
        }
    };

    if let Err(e) = command_result {
        logger::error(&format!("{:#}", e));
        eprintln!("Error executing command: {:#}", e);
        exit(1);
    }
}
