use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("unsupported source {url}: {reason}")]
    UnsupportedSource { url: String, reason: String },

    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: u16 },

    #[error("config file {path} is unreadable: {reason}")]
    ConfigUnreadable { path: PathBuf, reason: String },

    /// Scraped links the config file does not list.
    #[error("config file does not cover {} scraped link(s): {}", missing.len(), missing.join(", "))]
    ConfigMismatch { missing: Vec<String> },

    #[error("unsupported edit criterion: {0}")]
    UnsupportedCriterion(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LinkError {
    pub fn unsupported(url: &str, reason: impl Into<String>) -> Self {
        LinkError::UnsupportedSource {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub fn unreadable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        LinkError::ConfigUnreadable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Process exit status for a fatal error of this kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            LinkError::UnsupportedSource { .. } => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_lists_every_missing_link() {
        let err = LinkError::ConfigMismatch {
            missing: vec!["a.jpg".into(), "b.png".into()],
        };
        assert_eq!(
            err.to_string(),
            "config file does not cover 2 scraped link(s): a.jpg, b.png"
        );
    }

    #[test]
    fn unsupported_source_exits_with_three() {
        assert_eq!(LinkError::unsupported("x", "bad host").exit_code(), 3);
        assert_eq!(LinkError::UnsupportedCriterion("size".into()).exit_code(), 1);
    }
}
