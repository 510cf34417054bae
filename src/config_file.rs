//! Per-item download decision table.
//!
//! Layout on disk:
//!
//! ```text
//! ================================================================================
//! <title>
//! ================================================================================
//! \tFile\tDownload
//! 1\ta.jpg\tY
//! 2\tb%20c.png\tN
//! ```
//!
//! Only [`ConfigTable::render`] and [`ConfigTable::parse`] know this layout.

use crate::error::LinkError;
use crate::models::{ConfigRow, Decision, LinkEntry};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

const RULE_WIDTH: usize = 80;
const HEADER_LINES: usize = 3;
const FILE_COLUMN: &str = "File";
const DOWNLOAD_COLUMN: &str = "Download";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTable {
    pub title: String,
    pub rows: Vec<ConfigRow>,
}

impl ConfigTable {
    pub fn from_links(title: &str, links: &[LinkEntry], decision: Decision) -> Self {
        let rows = links
            .iter()
            .enumerate()
            .map(|(i, link)| ConfigRow {
                index: i + 1,
                file: link.raw.clone(),
                decision,
            })
            .collect();

        Self {
            title: title.to_string(),
            rows,
        }
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = format!(
            "{rule}\n{}\n{rule}\n\t{FILE_COLUMN}\t{DOWNLOAD_COLUMN}\n",
            self.title
        );
        for row in &self.rows {
            out.push_str(&format!("{}\t{}\t{}\n", row.index, row.file, row.decision));
        }
        out
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, LinkError> {
        let bad = |reason: String| LinkError::unreadable(path, reason);
        let rule = "=".repeat(RULE_WIDTH);

        let mut lines = text.lines();
        let header: Vec<&str> = lines.by_ref().take(HEADER_LINES).collect();
        if header.len() < HEADER_LINES {
            return Err(bad("missing header".into()));
        }
        if header[0] != rule || header[2] != rule {
            return Err(bad("header is not framed by '=' rules".into()));
        }

        let columns = lines.next().ok_or_else(|| bad("missing column header".into()))?;
        let columns: Vec<&str> = columns.split('\t').skip_while(|c| c.is_empty()).collect();
        if columns != [FILE_COLUMN, DOWNLOAD_COLUMN] {
            return Err(bad(format!("unexpected columns {:?}", columns)));
        }

        let mut rows = Vec::new();
        for (n, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let lineno = HEADER_LINES + 2 + n;
            let fields: Vec<&str> = line.split('\t').collect();
            let [index, file, decision] = fields.as_slice() else {
                return Err(bad(format!("line {}: expected 3 fields", lineno)));
            };
            let index = index
                .trim()
                .parse::<usize>()
                .map_err(|e| bad(format!("line {}: bad index: {}", lineno, e)))?;
            let decision = Decision::from_str(decision.trim())
                .map_err(|e| bad(format!("line {}: {}", lineno, e)))?;

            rows.push(ConfigRow {
                index,
                file: file.to_string(),
                decision,
            });
        }

        Ok(Self {
            title: header[1].to_string(),
            rows,
        })
    }
}

/// Predicates understood by [`edit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCriterion {
    Extension,
}

impl FromStr for EditCriterion {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "extension" | "ext" => Ok(EditCriterion::Extension),
            _ => Err(LinkError::UnsupportedCriterion(s.to_string())),
        }
    }
}

impl EditCriterion {
    fn matches(self, file: &str, operand: &str) -> bool {
        match self {
            EditCriterion::Extension => {
                let ext = operand.trim_start_matches('.');
                !ext.is_empty() && file.ends_with(&format!(".{}", ext))
            }
        }
    }
}

pub fn generate(
    title: &str,
    links: &[LinkEntry],
    default_decision: Decision,
    path: &Path,
) -> Result<(), LinkError> {
    let table = ConfigTable::from_links(title, links, default_decision);
    fs::write(path, table.render())?;
    info!(
        "Wrote {} config rows (default {}) to {}",
        table.rows.len(),
        default_decision,
        path.display()
    );
    Ok(())
}

pub fn load(path: &Path) -> Result<ConfigTable, LinkError> {
    let text = fs::read_to_string(path).map_err(|e| LinkError::unreadable(path, e.to_string()))?;
    ConfigTable::parse(&text, path)
}

/// Narrow `links` to those the table marks for download.
///
/// Every link must be listed in the table; links with any `N` row are dropped.
pub fn reconcile(links: &[LinkEntry], table: &ConfigTable) -> Result<Vec<LinkEntry>, LinkError> {
    let listed: HashSet<&str> = table.rows.iter().map(|r| r.file.as_str()).collect();
    let missing: Vec<String> = links
        .iter()
        .filter(|l| !listed.contains(l.raw.as_str()))
        .map(|l| l.raw.clone())
        .collect();
    if !missing.is_empty() {
        return Err(LinkError::ConfigMismatch { missing });
    }

    let skipped: HashSet<&str> = table
        .rows
        .iter()
        .filter(|r| r.decision == Decision::No)
        .map(|r| r.file.as_str())
        .collect();
    if skipped.is_empty() {
        return Ok(links.to_vec());
    }

    let kept: Vec<LinkEntry> = links
        .iter()
        .filter(|l| !skipped.contains(l.raw.as_str()))
        .cloned()
        .collect();
    debug!("Config keeps {} of {} links", kept.len(), links.len());
    Ok(kept)
}

/// Set `decision` on every row matching `criterion`/`operand` and rewrite the file.
/// Returns the number of matching rows.
pub fn edit(
    path: &Path,
    criterion: &str,
    operand: &str,
    decision: Decision,
) -> Result<usize, LinkError> {
    let criterion = EditCriterion::from_str(criterion)?;
    let mut table = load(path)?;

    let mut matched = 0;
    for row in table.rows.iter_mut().filter(|r| criterion.matches(&r.file, operand)) {
        row.decision = decision;
        matched += 1;
    }

    fs::write(path, table.render())?;
    info!(
        "Set Download={} on {} row(s) matching {:?} {} in {}",
        decision,
        matched,
        criterion,
        operand,
        path.display()
    );
    Ok(matched)
}
