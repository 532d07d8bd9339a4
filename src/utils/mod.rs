use std::path::{Path, PathBuf};

/// Places package managers commonly install yt-dlp to, checked before `PATH`.
const YTDLP_CANDIDATES: &[&str] = &[
    "/opt/homebrew/bin/yt-dlp",
    "/usr/local/bin/yt-dlp",
    "/usr/bin/yt-dlp",
];

/// Locate the yt-dlp executable, falling back to a bare `yt-dlp` looked up on `PATH`
pub fn find_ytdlp() -> PathBuf {
    find_in(YTDLP_CANDIDATES.iter().map(Path::new)).unwrap_or_else(|| PathBuf::from("yt-dlp"))
}

fn find_in<'a>(candidates: impl IntoIterator<Item = &'a Path>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .find(|path| path.is_file())
        .map(Path::to_path_buf)
}

/// Shorten text for single-line status display
pub fn truncate_text(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    let mut short: String = title.chars().take(max_chars.saturating_sub(3)).collect();
    short.push_str("...");
    short
}
