use std::path::Path;

use tracing::warn;

pub const API_KEY_VAR: &str = "PIXABAY_API_KEY";

/// Resolves the image-search API key: process environment first, then a
/// `.env` file in the data root. Returns None when neither is set.
pub fn resolve_api_key(data_root: &Path) -> Option<String> {
    if let Ok(value) = std::env::var(API_KEY_VAR)
        && !value.trim().is_empty()
    {
        return Some(value);
    }

    let env_path = data_root.join(".env");
    if !env_path.exists() {
        return None;
    }

    match dotenvy::from_path_iter(&env_path) {
        Ok(entries) => {
            for entry in entries {
                match entry {
                    Ok((key, value)) if key == API_KEY_VAR && !value.trim().is_empty() => {
                        return Some(value);
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(path = %env_path.display(), error = %err, "skipping malformed .env entry");
                    }
                }
            }
            None
        }
        Err(err) => {
            warn!(path = %env_path.display(), error = %err, "failed to read .env file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_key_from_env_file_in_data_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(".env"),
            "# comment\nOTHER=1\nPIXABAY_API_KEY=abc123\n",
        )
        .expect("write .env");

        // Only meaningful when the process env does not already set the key.
        if std::env::var(API_KEY_VAR).is_err() {
            assert_eq!(resolve_api_key(dir.path()).as_deref(), Some("abc123"));
        }
    }

    #[test]
    fn missing_env_file_resolves_to_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        if std::env::var(API_KEY_VAR).is_err() {
            assert!(resolve_api_key(dir.path()).is_none());
        }
    }
}
