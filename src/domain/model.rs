use std::{fmt, num::NonZeroUsize, path::PathBuf, str::FromStr};

/// Nominal vertical resolution, ordered by descending preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum QualityTier {
    #[default]
    P2160,
    P1440,
    P1080,
    P720,
    P480,
}

impl QualityTier {
    pub const ALL: [QualityTier; 5] = [
        QualityTier::P2160,
        QualityTier::P1440,
        QualityTier::P1080,
        QualityTier::P720,
        QualityTier::P480,
    ];

    pub fn height(self) -> u32 {
        match self {
            QualityTier::P2160 => 2160,
            QualityTier::P1440 => 1440,
            QualityTier::P1080 => 1080,
            QualityTier::P720 => 720,
            QualityTier::P480 => 480,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityTier::P2160 => "2160",
            QualityTier::P1440 => "1440",
            QualityTier::P1080 => "1080",
            QualityTier::P720 => "720",
            QualityTier::P480 => "480",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QualityTier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QualityTier::ALL
            .into_iter()
            .find(|tier| tier.label() == s)
            .ok_or(())
    }
}

/// Outcome of validating a user-entered quality label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualitySelection {
    Valid(QualityTier),
    Fallback {
        requested: String,
        tier: QualityTier,
    },
}

impl QualitySelection {
    pub fn tier(&self) -> QualityTier {
        match self {
            QualitySelection::Valid(tier) | QualitySelection::Fallback { tier, .. } => *tier,
        }
    }
}

/// The two raw strings collected from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInput {
    pub url: String,
    pub quality: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub quality: QualityTier,
    /// 1-based position taken from the URL's `index` query parameter.
    /// Not yet checked against the collection it points into.
    pub resolved_index: Option<NonZeroUsize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// Metadata returned by an engine inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaInfo {
    Item(MediaItem),
    Collection { title: String, items: Vec<MediaItem> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    WholeUrl(String),
    CollectionItem { position: NonZeroUsize, item: MediaItem },
}

impl DownloadTarget {
    /// The URL handed to the engine's download call.
    pub fn url(&self) -> &str {
        match self {
            DownloadTarget::WholeUrl(url) => url,
            DownloadTarget::CollectionItem { item, .. } => &item.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub target: DownloadTarget,
    pub save_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    Prompting,
    Downloading,
    Completed,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_descend() {
        let heights: Vec<u32> = QualityTier::ALL.iter().map(|t| t.height()).collect();
        assert_eq!(heights, vec![2160, 1440, 1080, 720, 480]);
        assert!(QualityTier::P2160 < QualityTier::P480);
        assert_eq!(QualityTier::default(), QualityTier::P2160);
    }

    #[test]
    fn test_tier_from_label() {
        assert_eq!("720".parse::<QualityTier>(), Ok(QualityTier::P720));
        assert!("720p".parse::<QualityTier>().is_err());
    }
}
