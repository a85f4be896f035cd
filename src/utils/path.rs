//! Path helpers.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Create the parent directory of `path` if it does not exist.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_parent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/c.txt");
        ensure_parent(&target).unwrap();
        assert!(target.parent().unwrap().is_dir());
        // second call is a no-op
        ensure_parent(&target).unwrap();
    }
}
