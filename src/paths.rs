use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(PathBuf::from(path)),
    };

    let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}

/// Resolve a user-supplied save directory to an absolute path without touching the process cwd.
pub fn resolve_save_dir(path: &str) -> Result<PathBuf> {
    let expanded = expand_tilde(path)?;
    std::path::absolute(&expanded)
        .with_context(|| format!("Failed to resolve {}", expanded.display()))
}
