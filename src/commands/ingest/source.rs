use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Catalog filenames probed inside the data root, in preference order.
/// The second is the legacy name kept for older installs.
pub(crate) const CATALOG_FILE_CANDIDATES: [&str; 2] = ["label.txt", "imagenet21k_labels.txt"];

pub(crate) fn locate_catalog_source(
    data_root: &Path,
    override_path: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return path.exists().then(|| path.to_path_buf());
    }

    CATALOG_FILE_CANDIDATES
        .iter()
        .map(|name| data_root.join(name))
        .find(|path| path.exists())
}

pub(crate) fn read_catalog_text(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog source: {}", path.display()))
}
