use std::{
    io::{BufRead, BufReader, Read},
    path::PathBuf,
    process::{Command, Stdio},
    sync::LazyLock,
};

use regex::Regex;

use super::{
    models::{InfoResponse, Postprocessor},
    EngineError, EngineOptions, ProgressEvent, ProgressStatus, Result, RetrievalEngine,
};
use crate::domain::MediaInfo;

/// Each progress update is printed on its own line in this shape so it can be
/// told apart from the rest of yt-dlp's output.
const PROGRESS_TEMPLATE: &str =
    "download:PROGRESS|%(progress.status)s|%(progress._percent_str)s|%(progress._speed_str)s";

static PROGRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PROGRESS\|([^|]*)\|([^|]*)\|(.*)$").unwrap());
static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

/// Retrieval engine backed by the `yt-dlp` executable
#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    binary: PathBuf,
}

impl YtDlpEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn inspect_args(url: &str, options: &EngineOptions) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            "--flat-playlist".to_string(),
            "--no-warnings".to_string(),
        ];
        if options.no_playlist {
            args.push("--no-playlist".to_string());
        }
        args.push(url.to_string());
        args
    }

    fn download_args(targets: &[String], options: &EngineOptions) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            options.format.clone(),
            "-o".to_string(),
            options.output_template.clone(),
            "--merge-output-format".to_string(),
            options.merge_output_format.clone(),
        ];

        for postprocessor in &options.postprocessors {
            match postprocessor {
                Postprocessor::ConvertVideo { preferred_format } => {
                    args.push("--recode-video".to_string());
                    args.push(preferred_format.clone());
                }
            }
        }

        if options.no_playlist {
            args.push("--no-playlist".to_string());
        }

        args.extend([
            "--newline".to_string(),
            "--progress-template".to_string(),
            PROGRESS_TEMPLATE.to_string(),
        ]);
        args.extend(targets.iter().cloned());
        args
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> EngineError {
        EngineError::Spawn {
            binary: self.binary.display().to_string(),
            source,
        }
    }
}

/// Parse one stdout line printed through [`PROGRESS_TEMPLATE`].
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let line = ANSI_RE.replace_all(line.trim(), "");
    let caps = PROGRESS_RE.captures(&line)?;

    let status = match caps[1].trim() {
        "downloading" => ProgressStatus::Downloading,
        "finished" => ProgressStatus::Finished,
        other => ProgressStatus::Other(other.to_string()),
    };
    let percent = caps[2].trim().trim_end_matches('%').trim().parse::<f32>().ok();

    Some(ProgressEvent {
        status,
        percent,
        speed: caps[3].trim().to_string(),
    })
}

impl RetrievalEngine for YtDlpEngine {
    fn inspect(&self, url: &str, options: &EngineOptions) -> Result<MediaInfo> {
        tracing::debug!(binary = %self.binary.display(), url, "inspecting");

        let output = self
            .command(&Self::inspect_args(url, options))
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let info: InfoResponse = serde_json::from_slice(&output.stdout)
            .map_err(|e| EngineError::InvalidOutput(format!("JSON decode error: {}", e)))?;

        Ok(info.into_media_info(url))
    }

    fn download(
        &self,
        targets: &[String],
        options: &EngineOptions,
        progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<()> {
        tracing::debug!(binary = %self.binary.display(), ?targets, "downloading");

        let mut child = self
            .command(&Self::download_args(targets, options))
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Drain stderr on its own thread so a chatty engine can't block on a full pipe.
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                if let Err(e) = stderr.read_to_end(&mut buf) {
                    tracing::debug!("failed to read yt-dlp stderr: {}", e);
                }
                String::from_utf8_lossy(&buf).into_owned()
            })
        });

        if let Some(stdout) = child.stdout.take() {
            // Titles aren't guaranteed to be UTF-8 on every console code page,
            // so lines are read as bytes and decoded lossily.
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf);
                        match parse_progress_line(&line) {
                            Some(event) => progress(event),
                            None => tracing::trace!(target: "yt-dlp", "{}", line.trim_end()),
                        }
                    }
                    Err(e) => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(EngineError::InvalidOutput(format!(
                            "Failed to read engine output: {}",
                            e
                        )));
                    }
                }
            }
        }

        let status = child.wait().map_err(|e| self.spawn_error(e))?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if !status.success() {
            return Err(EngineError::Failed {
                code: status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_downloading_line() {
        let event = parse_progress_line("PROGRESS|downloading|  42.7%|   1.21MiB/s").unwrap();
        assert_eq!(event.status, ProgressStatus::Downloading);
        assert_eq!(event.percent, Some(42.7));
        assert_eq!(event.speed, "1.21MiB/s");
    }

    #[test]
    fn test_parse_colored_line() {
        let event =
            parse_progress_line("PROGRESS|downloading|\x1b[0;94m  5.0%\x1b[0m|\x1b[0;32m 800.00KiB/s\x1b[0m")
                .unwrap();
        assert_eq!(event.percent, Some(5.0));
        assert_eq!(event.speed, "800.00KiB/s");
    }

    #[test]
    fn test_parse_unknown_speed() {
        let event = parse_progress_line("PROGRESS|finished|100%|Unknown B/s").unwrap();
        assert_eq!(event.status, ProgressStatus::Finished);
        assert_eq!(event.percent, Some(100.0));

        let event = parse_progress_line("PROGRESS|downloading|N/A|N/A").unwrap();
        assert_eq!(event.percent, None);
    }

    #[test]
    fn test_ignores_other_output() {
        assert!(parse_progress_line("[youtube] abc123: Downloading webpage").is_none());
        assert!(parse_progress_line("[Merger] Merging formats into \"a.mp4\"").is_none());
    }

    #[test]
    fn test_inspect_args() {
        let args = YtDlpEngine::inspect_args("https://youtu.be/abc123", &EngineOptions::default());
        assert_eq!(
            args,
            vec![
                "--dump-single-json",
                "--flat-playlist",
                "--no-warnings",
                "--no-playlist",
                "https://youtu.be/abc123",
            ]
        );
    }

    #[test]
    fn test_download_args() {
        let options = EngineOptions {
            format: "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]".to_string(),
            output_template: "out/%(title)s.%(ext)s".to_string(),
            ..EngineOptions::default()
        };
        let args = YtDlpEngine::download_args(&["https://youtu.be/abc123".to_string()], &options);

        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("-f") + 1], options.format);
        assert_eq!(args[pos("-o") + 1], "out/%(title)s.%(ext)s");
        assert_eq!(args[pos("--merge-output-format") + 1], "mp4");
        assert_eq!(args[pos("--recode-video") + 1], "mp4");
        assert_eq!(args[pos("--progress-template") + 1], PROGRESS_TEMPLATE);
        assert!(args.contains(&"--no-playlist".to_string()));
        assert_eq!(args.last().unwrap(), "https://youtu.be/abc123");
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let engine = YtDlpEngine::new("/nonexistent/yt-dlp-binary");
        let err = engine
            .inspect("https://youtu.be/abc123", &EngineOptions::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[cfg(unix)]
    mod process {
        use std::{fs, os::unix::fs::PermissionsExt};

        use tempfile::TempDir;

        use super::*;

        /// Write an executable shell script standing in for yt-dlp.
        fn fake_ytdlp(dir: &TempDir, body: &str) -> YtDlpEngine {
            let path = dir.path().join("yt-dlp");
            fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            YtDlpEngine::new(path)
        }

        fn collect_download(engine: &YtDlpEngine) -> (Result<()>, Vec<ProgressEvent>) {
            let mut events = Vec::new();
            let result = engine.download(
                &["https://youtu.be/abc123".to_string()],
                &EngineOptions::default(),
                &mut |event| events.push(event),
            );
            (result, events)
        }

        #[test]
        fn test_download_forwards_progress_past_non_utf8_lines() {
            let dir = tempfile::tempdir().unwrap();
            let engine = fake_ytdlp(
                &dir,
                r"printf '[download] Destination: caf\351.mp4\n'
printf 'PROGRESS|downloading|  50.0%%|1.00MiB/s\n'
printf 'PROGRESS|finished|100%%|Unknown B/s\n'
exit 0",
            );

            let (result, events) = collect_download(&engine);

            assert!(result.is_ok(), "{:?}", result);
            assert_eq!(events.len(), 2);
            assert_eq!(events[0].status, ProgressStatus::Downloading);
            assert_eq!(events[0].percent, Some(50.0));
            assert_eq!(events[0].speed, "1.00MiB/s");
            assert_eq!(events[1].status, ProgressStatus::Finished);
        }

        #[test]
        fn test_download_nonzero_exit_reports_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let engine = fake_ytdlp(
                &dir,
                "printf 'PROGRESS|downloading|  10.0%%|2.00MiB/s\n'
echo 'ERROR: [youtube] abc123: Video unavailable' >&2
exit 2",
            );

            let (result, events) = collect_download(&engine);

            assert_eq!(events.len(), 1);
            match result {
                Err(EngineError::Failed { code, stderr }) => {
                    assert_eq!(code, Some(2));
                    assert_eq!(stderr, "ERROR: [youtube] abc123: Video unavailable");
                }
                other => panic!("expected a failed exit, got {:?}", other),
            }
        }

        #[test]
        fn test_inspect_nonzero_exit_reports_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let engine = fake_ytdlp(&dir, "echo 'ERROR: Unsupported URL' >&2\nexit 1");

            let err = engine
                .inspect("https://example.com/nothing", &EngineOptions::default())
                .unwrap_err();

            assert!(matches!(
                err,
                EngineError::Failed { code: Some(1), ref stderr } if stderr == "ERROR: Unsupported URL"
            ));
            assert_eq!(err.to_string(), "Engine exited with code 1: ERROR: Unsupported URL");
        }

        #[test]
        fn test_inspect_parses_playlist_dump() {
            let dir = tempfile::tempdir().unwrap();
            let engine = fake_ytdlp(
                &dir,
                r#"cat <<'EOF'
{"_type": "playlist", "id": "xyz", "title": "Mix", "entries": [{"id": "a1", "title": "First", "url": "https://www.youtube.com/watch?v=a1"}, {"id": "b2", "title": "Second", "url": "https://www.youtube.com/watch?v=b2"}]}
EOF"#,
            );

            let info = engine
                .inspect("https://youtube.com/playlist?list=xyz&index=2", &EngineOptions::default())
                .unwrap();

            match info {
                MediaInfo::Collection { title, items } => {
                    assert_eq!(title, "Mix");
                    assert_eq!(items[1].id, "b2");
                }
                other => panic!("expected a collection, got {:?}", other),
            }
        }

        #[test]
        fn test_inspect_rejects_non_json_output() {
            let dir = tempfile::tempdir().unwrap();
            let engine = fake_ytdlp(&dir, "echo 'not json'");

            let err = engine
                .inspect("https://youtu.be/abc123", &EngineOptions::default())
                .unwrap_err();

            assert!(matches!(err, EngineError::InvalidOutput(_)));
        }
    }
}
