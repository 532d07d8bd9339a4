use std::{path::PathBuf, time::Duration};

use crate::{
    application::{
        planner::{build_format_expression, plan_target, resolve_index, select_quality},
        presenter::{Notice, Prompt, PromptRequest, StatusDisplay},
    },
    domain::{
        AppError, DownloadOutcome, DownloadRequest, DownloadTarget, MediaInfo, PlanError,
        QualitySelection, QualityTier, UserInput,
    },
    engine::{EngineOptions, Postprocessor, ProgressEvent, ProgressStatus, RetrievalEngine},
};

/// Configuration for the download flow
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    pub save_path: PathBuf,
    pub completion_dismiss: Duration,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("."),
            completion_dismiss: Duration::from_secs(60),
        }
    }
}

pub struct DownloadCoordinator<E> {
    engine: E,
    config: DownloaderConfig,
}

impl<E: RetrievalEngine> DownloadCoordinator<E> {
    pub fn new(engine: E, config: DownloaderConfig) -> Self {
        Self { engine, config }
    }

    /// Ask for the URL, then the quality. Dismissing the URL prompt ends the
    /// flow; dismissing the quality prompt keeps the top tier.
    pub fn collect_input(&self, prompt: &mut dyn Prompt) -> Result<UserInput, AppError> {
        let url = prompt
            .ask(PromptRequest {
                title: "YouTube Downloader".to_string(),
                message: "Enter the YouTube video URL:".to_string(),
                default_text: String::new(),
            })
            .ok_or(AppError::Cancelled)?;

        let labels: Vec<&str> = QualityTier::ALL.iter().map(|t| t.label()).collect();
        let quality = prompt
            .ask(PromptRequest {
                title: "Select Quality".to_string(),
                message: format!("Choose a video quality ({}):", labels.join(", ")),
                default_text: QualityTier::default().label().to_string(),
            })
            .unwrap_or_else(|| QualityTier::default().label().to_string());

        Ok(UserInput { url, quality })
    }

    pub fn prepare(&self, input: &UserInput, status: &dyn StatusDisplay) -> DownloadRequest {
        let selection = select_quality(&input.quality);
        if let QualitySelection::Fallback { requested, tier } = &selection {
            tracing::warn!(requested = %requested, fallback = %tier, "invalid quality");
            status.notify(Notice::warning(
                "Warning",
                "Invalid choice! Defaulting to best available quality.",
            ));
        }

        DownloadRequest {
            url: input.url.trim().to_string(),
            quality: selection.tier(),
            resolved_index: resolve_index(&input.url),
        }
    }

    pub fn engine_options(&self, tier: QualityTier) -> EngineOptions {
        EngineOptions {
            format: build_format_expression(tier),
            output_template: self
                .config
                .save_path
                .join("%(title)s.%(ext)s")
                .to_string_lossy()
                .into_owned(),
            merge_output_format: "mp4".to_string(),
            postprocessors: vec![Postprocessor::ConvertVideo {
                preferred_format: "mp4".to_string(),
            }],
            no_playlist: true,
        }
    }

    pub fn execute(
        &self,
        request: &DownloadRequest,
        status: &dyn StatusDisplay,
    ) -> Result<DownloadOutcome, AppError> {
        let options = self.engine_options(request.quality);
        let metadata = self.engine.inspect(&request.url, &options)?;

        let target = match plan_target(request, &metadata) {
            Ok(target) => target,
            Err(err @ PlanError::IndexOutOfRange { .. }) => {
                tracing::error!(%err, "not downloading");
                status.notify(Notice::error("Error", err.to_string()));
                return Err(err.into());
            }
        };

        match &target {
            DownloadTarget::CollectionItem { position, item } => {
                if let MediaInfo::Collection { title, .. } = &metadata {
                    tracing::info!(
                        playlist = %title,
                        "Playlist detected! Downloading only video at index {}",
                        position
                    );
                }
                tracing::info!("Downloading: {} ({})", item.title, item.id);
            }
            DownloadTarget::WholeUrl(url) => {
                tracing::info!("Single video detected! Downloading {}", url);
            }
        }

        let mut on_progress = |event: ProgressEvent| {
            if let Some(line) = progress_line(&event) {
                status.progress(&line);
            }
        };
        self.engine
            .download(&[target.url().to_string()], &options, &mut on_progress)?;

        status.notify(Notice::info(
            "Success",
            "Download completed!",
            self.config.completion_dismiss,
        ));

        Ok(DownloadOutcome {
            target,
            save_path: self.config.save_path.clone(),
        })
    }

    pub fn run(
        &self,
        prompt: &mut dyn Prompt,
        status: &dyn StatusDisplay,
    ) -> Result<DownloadOutcome, AppError> {
        let input = self.collect_input(prompt)?;
        let request = self.prepare(&input, status);
        self.execute(&request, status)
    }
}

/// `Downloading... 42.7% (1.21MiB/s)` for in-flight events, nothing otherwise.
pub fn progress_line(event: &ProgressEvent) -> Option<String> {
    if event.status != ProgressStatus::Downloading {
        return None;
    }
    let percent = event
        .percent
        .map(|p| format!("{:.1}", p))
        .unwrap_or_else(|| "--".to_string());
    Some(format!("Downloading... {}% ({})", percent, event.speed))
}
