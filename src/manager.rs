use crate::config_file;
use crate::downloader::{DownloadSummary, Downloader};
use crate::error::LinkError;
use crate::models::{Decision, LinkEntry, RunReport};
use crate::paths;
use crate::scrape::{self, PageFetcher};
use crate::source::Source;
use crate::state::ReportStore;
use crate::verify::{self, Verification};
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A validated item, its scraped links, and where they go locally.
pub struct LinkManager {
    source: Source,
    links: Vec<LinkEntry>,
    save_dir: PathBuf,
    verbose: bool,
}

impl LinkManager {
    /// Validate `url`, then scrape its listing page once.
    pub async fn new(url: &str, save_dir: &str, verbose: bool, fetcher: &PageFetcher) -> Result<Self> {
        let source = Source::validate(url, fetcher).await?;
        let links = scrape::scrape_links(fetcher, &source.listing_url).await?;
        let save_dir = paths::resolve_save_dir(save_dir)?;
        info!("URL list ready: {} files from {}", links.len(), source.listing_url);

        Ok(Self::from_parts(source, links, save_dir, verbose))
    }

    pub fn from_parts(source: Source, links: Vec<LinkEntry>, save_dir: PathBuf, verbose: bool) -> Self {
        Self {
            source,
            links,
            save_dir,
            verbose,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn links(&self) -> &[LinkEntry] {
        &self.links
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Scraped link counts per extension; links without one are grouped under "(none)".
    pub fn extension_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for link in &self.links {
            let ext = link.extension.clone().unwrap_or_else(|| "(none)".to_string());
            *counts.entry(ext).or_insert(0) += 1;
        }
        counts
    }

    pub fn generate_config(&self, path: &Path, default_decision: Decision) -> Result<()> {
        let title = format!("archive-dl download list for {}", self.source.listing_url);
        config_file::generate(&title, &self.links, default_decision, path)?;
        Ok(())
    }

    /// Links to fetch. Without a readable config this is every scraped link.
    pub fn selected_links(&self, config: Option<&Path>) -> Result<Vec<LinkEntry>> {
        let Some(path) = config else {
            return Ok(self.links.clone());
        };

        match config_file::load(path) {
            Ok(table) => Ok(config_file::reconcile(&self.links, &table)?),
            Err(err @ LinkError::ConfigUnreadable { .. }) => {
                warn!("{}; downloading every link", err);
                Ok(self.links.clone())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Download the selected links, then verify the save directory.
    pub async fn get(&self, program: &str, config: Option<&Path>) -> Result<Verification> {
        let selected = self.selected_links(config)?;
        let downloader = Downloader::new(program, &self.save_dir, self.verbose)?;

        info!(
            "Downloading {} files from {} ...",
            selected.len(),
            self.source.listing_url
        );
        let DownloadSummary { succeeded, failed } =
            downloader.download_all(&self.source, &selected).await?;
        info!("{} exited cleanly {} time(s), failed {} time(s)", program, succeeded, failed);

        self.verify_links(&selected)
    }

    pub fn verify(&self, config: Option<&Path>) -> Result<Verification> {
        let selected = self.selected_links(config)?;
        self.verify_links(&selected)
    }

    fn verify_links(&self, expected: &[LinkEntry]) -> Result<Verification> {
        let result = verify::verify(&self.save_dir, expected)?;

        if self.save_dir.is_dir() {
            let mismatched = match &result {
                Verification::Complete { .. } => Vec::new(),
                Verification::Mismatch { names } => names.clone(),
            };
            let report = RunReport {
                source: self.source.input_url.clone(),
                listing_url: self.source.listing_url.clone(),
                expected: expected.len(),
                complete: result.is_complete(),
                mismatched,
            };
            let store = ReportStore::new(&self.save_dir);
            match store.load_report() {
                Ok(Some(previous)) => debug!(
                    "Previous run: {} expected, {} mismatched",
                    previous.expected,
                    previous.mismatched.len()
                ),
                Ok(None) => {}
                Err(e) => debug!("Ignoring old run report: {:#}", e),
            }
            if let Err(e) = store.save_report(&report) {
                warn!("Could not save run report: {:#}", e);
            }
        }

        Ok(result)
    }
}
