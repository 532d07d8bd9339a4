pub mod error;
pub mod model;

pub use error::{AppError, PlanError};
pub use model::{
    DownloadOutcome, DownloadPhase, DownloadRequest, DownloadTarget, MediaInfo, MediaItem,
    QualitySelection, QualityTier, UserInput,
};
