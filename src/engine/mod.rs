//! Media retrieval backends.
//!
//! The rest of the crate only sees [`RetrievalEngine`]; `yt-dlp` is one
//! implementation of it and tests substitute a fake.

pub mod models;
pub mod ytdlp;

use thiserror::Error;

use crate::domain::MediaInfo;

pub use models::{EngineOptions, Postprocessor, ProgressEvent, ProgressStatus};
pub use ytdlp::YtDlpEngine;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to start {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine exited with {}: {}", describe_exit(.code), .stderr)]
    Failed { code: Option<i32>, stderr: String },

    #[error("Invalid engine output: {0}")]
    InvalidOutput(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

pub trait RetrievalEngine {
    /// Fetch item or collection metadata without downloading anything.
    fn inspect(&self, url: &str, options: &EngineOptions) -> Result<MediaInfo>;

    /// Download every target, reporting progress through `progress`.
    fn download(
        &self,
        targets: &[String],
        options: &EngineOptions,
        progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<()>;
}
