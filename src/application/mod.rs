pub mod download_coordinator;
pub mod planner;
pub mod presenter;

pub use download_coordinator::{DownloadCoordinator, DownloaderConfig};
pub use presenter::{Notice, NoticeLevel, Prompt, PromptRequest, StatusDisplay};
