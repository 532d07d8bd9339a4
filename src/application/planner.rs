use std::num::NonZeroUsize;

use url::{ParseError, Url};

use crate::domain::{
    DownloadRequest, DownloadTarget, MediaInfo, PlanError, QualitySelection, QualityTier,
};

/// Read the 1-based `index` query parameter, if the URL carries a usable one.
/// Scheme-less input such as `youtube.com/playlist?...` is read as `https`.
pub fn resolve_index(url: &str) -> Option<NonZeroUsize> {
    let url = url.trim();
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{}", url)).ok()?,
        Err(_) => return None,
    };
    let (_, value) = parsed.query_pairs().find(|(key, _)| key == "index")?;
    value.trim().parse::<NonZeroUsize>().ok()
}

pub fn select_quality(requested: &str) -> QualitySelection {
    match requested.trim().parse::<QualityTier>() {
        Ok(tier) => QualitySelection::Valid(tier),
        Err(()) => QualitySelection::Fallback {
            requested: requested.to_string(),
            tier: QualityTier::default(),
        },
    }
}

/// Best MP4 video no taller than `tier` plus the best M4A audio, or the best
/// single MP4 stream when no such pair exists.
pub fn build_format_expression(tier: QualityTier) -> String {
    format!(
        "bestvideo[height<={}][ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]",
        tier.height()
    )
}

pub fn plan_target(
    request: &DownloadRequest,
    metadata: &MediaInfo,
) -> Result<DownloadTarget, PlanError> {
    match (request.resolved_index, metadata) {
        (Some(position), MediaInfo::Collection { items, .. }) => items
            .get(position.get() - 1)
            .map(|item| DownloadTarget::CollectionItem {
                position,
                item: item.clone(),
            })
            .ok_or(PlanError::IndexOutOfRange {
                index: position.get(),
                len: items.len(),
            }),
        _ => Ok(DownloadTarget::WholeUrl(request.url.clone())),
    }
}
