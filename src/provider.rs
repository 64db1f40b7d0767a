use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::catalog::LabelCatalog;
use crate::model::LabelItem;

/// The inference collaborator. Implementations own the model lifecycle;
/// callers only see a readiness description and a best-effort prediction
/// resolved against the catalog.
pub trait AiLabelProvider {
    fn status(&self) -> String;
    fn predict(&self, image_path: &Path, catalog: &LabelCatalog) -> Result<Option<LabelItem>>;
}

/// Stands in when no model command is configured. Never predicts.
pub struct NullLabelProvider;

impl AiLabelProvider for NullLabelProvider {
    fn status(&self) -> String {
        "no model loaded; prediction unavailable".to_string()
    }

    fn predict(&self, _image_path: &Path, _catalog: &LabelCatalog) -> Result<Option<LabelItem>> {
        Ok(None)
    }
}

/// Runs an external classifier command with the image path appended as the
/// last argument, reads the first stdout line as a free-text prediction,
/// and resolves it through the label matcher.
pub struct CommandLabelProvider {
    command: String,
}

impl CommandLabelProvider {
    pub fn new(command: String) -> Self {
        Self { command }
    }
}

impl AiLabelProvider for CommandLabelProvider {
    fn status(&self) -> String {
        format!("external model command: {}", self.command)
    }

    fn predict(&self, image_path: &Path, catalog: &LabelCatalog) -> Result<Option<LabelItem>> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .with_context(|| format!("empty model command: {:?}", self.command))?;

        let output = Command::new(program)
            .args(parts)
            .arg(image_path)
            .output()
            .with_context(|| format!("failed to run model command: {}", self.command))?;

        if !output.status.success() {
            warn!(
                command = %self.command,
                status = %output.status,
                "model command failed"
            );
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(predicted) = stdout.lines().next().map(str::trim).filter(|line| !line.is_empty())
        else {
            warn!(command = %self.command, "model command produced no prediction");
            return Ok(None);
        };

        match catalog.match_prediction(predicted) {
            Some((item, kind)) => {
                info!(
                    predicted = predicted,
                    label_id = %item.id,
                    match_kind = kind.as_str(),
                    "prediction resolved"
                );
                Ok(Some(item.clone()))
            }
            None => {
                warn!(predicted = predicted, "prediction did not match any catalog entry");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LabelCatalog;

    fn catalog() -> LabelCatalog {
        let (catalog, _) =
            LabelCatalog::parse("n1,tabby,tabby cat\nn2,dog\n").expect("catalog");
        catalog
    }

    #[test]
    fn null_provider_never_predicts() {
        let provider = NullLabelProvider;
        let result = provider
            .predict(Path::new("/tmp/img.jpg"), &catalog())
            .expect("predict");
        assert!(result.is_none());
        assert!(provider.status().contains("no model loaded"));
    }

    #[cfg(unix)]
    #[test]
    fn command_provider_resolves_first_stdout_line() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let script = dir.path().join("predict.sh");
        std::fs::write(&script, "#!/bin/sh\necho 'tabby cat'\n").expect("write script");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
            .expect("chmod script");

        let provider = CommandLabelProvider::new(script.display().to_string());
        let predicted = provider
            .predict(Path::new("/tmp/img.jpg"), &catalog())
            .expect("predict")
            .expect("should match the alias");
        assert_eq!(predicted.id, "n1");
    }

    #[cfg(unix)]
    #[test]
    fn command_provider_treats_failure_as_no_prediction() {
        let provider = CommandLabelProvider::new("false".to_string());
        let result = provider
            .predict(Path::new("/tmp/img.jpg"), &catalog())
            .expect("predict");
        assert!(result.is_none());
    }

    #[test]
    fn missing_command_is_an_error() {
        let provider = CommandLabelProvider::new("/nonexistent/model-cmd".to_string());
        assert!(provider.predict(Path::new("/tmp/img.jpg"), &catalog()).is_err());
    }
}
