use crate::error::LinkError;
use crate::models::LinkEntry;
use crate::source::Source;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

pub const DEFAULT_PROGRAM: &str = "wget";

/// Per-file exit tallies. Informational only; verification decides success.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs an external `wget`-compatible program once per link.
pub struct Downloader {
    program: String,
    output_dir: PathBuf,
    verbose: bool,
}

impl Downloader {
    pub fn new(program: &str, output_dir: &Path, verbose: bool) -> Result<Self> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)
                .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        }

        Ok(Self {
            program: program.to_string(),
            output_dir: output_dir.to_path_buf(),
            verbose,
        })
    }

    /// Resume, timestamp-conditional, flat into the save directory.
    pub fn args_for(&self, file_url: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if !self.verbose {
            args.push("-nv".into());
        }
        args.extend(["-c", "-N", "-P"].map(OsString::from));
        args.push(self.output_dir.clone().into_os_string());
        args.push("--no-directories".into());
        args.push(file_url.into());
        args
    }

    async fn download_file(&self, file_url: &str) -> Result<bool, LinkError> {
        let mut command = Command::new(&self.program);
        command.args(self.args_for(file_url)).stdin(Stdio::null());

        let spawn_err = |source| LinkError::Spawn {
            program: self.program.clone(),
            source,
        };

        if self.verbose {
            let status = command.status().await.map_err(spawn_err)?;
            if !status.success() {
                warn!("{} exited with {} for {}", self.program, status, file_url);
            }
            return Ok(status.success());
        }

        let output = command
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(spawn_err)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "{} exited with {} for {}: {}",
                self.program,
                output.status,
                file_url,
                stderr.trim()
            );
        }
        Ok(output.status.success())
    }

    /// The file-count bar only runs in quiet mode; otherwise wget owns the terminal.
    pub fn shows_progress(&self) -> bool {
        !self.verbose
    }

    /// Fetch every link in order, one at a time.
    pub async fn download_all(&self, source: &Source, links: &[LinkEntry]) -> Result<DownloadSummary> {
        let pb = if self.shows_progress() {
            ProgressBar::new(links.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg:30} {bar:40} {pos}/{len}")
                .unwrap()
                .progress_chars("=>-"),
        );

        let mut summary = DownloadSummary::default();
        for (idx, link) in links.iter().enumerate() {
            let file_url = source.file_url(&link.raw);
            pb.set_message(link.decoded.clone());
            debug!("[{:>3}/{}] {}", idx + 1, links.len(), file_url);

            if self.download_file(&file_url).await? {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn verbose_args_resume_and_timestamp() {
        let dir = TempDir::new().unwrap();
        let dl = Downloader::new(DEFAULT_PROGRAM, dir.path(), true).unwrap();
        let dest = dir.path().to_string_lossy().into_owned();

        assert_eq!(
            strings(dl.args_for("https://archive.org/download/item/a.jpg")),
            vec![
                "-c",
                "-N",
                "-P",
                dest.as_str(),
                "--no-directories",
                "https://archive.org/download/item/a.jpg"
            ]
        );
    }

    #[test]
    fn quiet_args_add_no_verbose() {
        let dir = TempDir::new().unwrap();
        let dl = Downloader::new(DEFAULT_PROGRAM, dir.path(), false).unwrap();
        let args = strings(dl.args_for("u"));
        assert_eq!(args[0], "-nv");
        assert_eq!(args.last().map(String::as_str), Some("u"));
    }

    #[test]
    fn progress_bar_only_when_quiet() {
        let dir = TempDir::new().unwrap();
        let quiet = Downloader::new(DEFAULT_PROGRAM, dir.path(), false).unwrap();
        let verbose = Downloader::new(DEFAULT_PROGRAM, dir.path(), true).unwrap();
        assert!(quiet.shows_progress());
        assert!(!verbose.shows_progress());
    }

    #[test]
    fn new_creates_missing_save_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        Downloader::new(DEFAULT_PROGRAM, &nested, false).unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let dir = TempDir::new().unwrap();
        let dl = Downloader::new("archive-dl-no-such-program", dir.path(), false).unwrap();
        let source = Source::parse("https://archive.org/download/item").unwrap();

        let err = dl
            .download_all(&source, &[LinkEntry::new("a.jpg")])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LinkError>(),
            Some(LinkError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_program_is_counted_not_fatal() {
        let dir = TempDir::new().unwrap();
        let dl = Downloader::new("false", dir.path(), false).unwrap();
        let source = Source::parse("https://archive.org/download/item").unwrap();
        let links = [LinkEntry::new("a.jpg"), LinkEntry::new("b.jpg")];

        let summary = dl.download_all(&source, &links).await.unwrap();
        assert_eq!(summary, DownloadSummary { succeeded: 0, failed: 2 });
    }
}
