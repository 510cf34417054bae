use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One file reference scraped from a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// Href as it appears in the page, percent-encoding intact.
    pub raw: String,
    /// Name `wget` writes to disk.
    pub decoded: String,
    pub extension: Option<String>,
}

impl LinkEntry {
    pub fn new(raw: &str) -> Self {
        let decoded = urlencoding::decode(raw)
            .map(|d| d.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        let extension = decoded
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_string())
            .filter(|ext| !ext.is_empty());

        Self {
            raw: raw.to_string(),
            decoded,
            extension,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Decision {
    #[value(name = "y", alias = "yes")]
    Yes,
    #[value(name = "n", alias = "no")]
    No,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Yes => write!(f, "Y"),
            Decision::No => write!(f, "N"),
        }
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(Decision::Yes),
            "n" | "no" => Ok(Decision::No),
            _ => Err(format!("expected Y or N, got {:?}", s)),
        }
    }
}

/// A row of the config table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRow {
    pub index: usize,
    pub file: String,
    pub decision: Decision,
}

/// Outcome of the last verification, persisted next to the downloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunReport {
    pub source: String,
    pub listing_url: String,
    pub expected: usize,
    pub mismatched: Vec<String>,
    pub complete: bool,
}
