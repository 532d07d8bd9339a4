use serde::Deserialize;

use crate::domain::{MediaInfo, MediaItem};

/// Post-processing steps applied by the engine after download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Postprocessor {
    ConvertVideo { preferred_format: String },
}

/// Options handed to the engine for both inspection and download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub format: String,
    pub output_template: String,
    pub merge_output_format: String,
    pub postprocessors: Vec<Postprocessor>,
    pub no_playlist: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            format: "best[ext=mp4]".to_string(),
            output_template: "./%(title)s.%(ext)s".to_string(),
            merge_output_format: "mp4".to_string(),
            postprocessors: vec![Postprocessor::ConvertVideo {
                preferred_format: "mp4".to_string(),
            }],
            no_playlist: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressStatus {
    Downloading,
    Finished,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    pub percent: Option<f32>,
    pub speed: String,
}

/// Output of `yt-dlp --dump-single-json`
#[derive(Debug, Clone, Deserialize)]
pub struct InfoResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub entries: Option<Vec<Option<EntryResponse>>>,
}

/// One entry of a flat playlist dump
#[derive(Debug, Clone, Deserialize)]
pub struct EntryResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
}

impl EntryResponse {
    fn into_item(self) -> MediaItem {
        let url = self
            .url
            .or(self.webpage_url)
            .unwrap_or_else(|| self.id.clone());
        MediaItem {
            id: self.id,
            title: self.title,
            url,
        }
    }
}

impl InfoResponse {
    /// `fallback_url` is used when the dump carries no URL of its own.
    pub fn into_media_info(self, fallback_url: &str) -> MediaInfo {
        match self.entries {
            // Unavailable entries keep their slot so positions stay 1:1 with the playlist.
            Some(entries) => MediaInfo::Collection {
                title: self.title,
                items: entries
                    .into_iter()
                    .map(|entry| {
                        entry.map(EntryResponse::into_item).unwrap_or(MediaItem {
                            id: String::new(),
                            title: "[unavailable]".to_string(),
                            url: String::new(),
                        })
                    })
                    .collect(),
            },
            None => MediaInfo::Item(MediaItem {
                url: self
                    .webpage_url
                    .or(self.url)
                    .unwrap_or_else(|| fallback_url.to_string()),
                id: self.id,
                title: self.title,
            }),
        }
    }
}
