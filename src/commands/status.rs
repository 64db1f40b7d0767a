use std::fs;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::env;
use crate::model::CatalogManifest;
use crate::store;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_path = args
        .data_root
        .join("manifests")
        .join("catalog_manifest.json");
    let db_path = store::resolve_db_path(&args.data_root, None);

    info!(data_root = %args.data_root.display(), "status requested");

    if manifest_path.exists() {
        let raw = fs::read(&manifest_path)
            .with_context(|| format!("failed to read {}", manifest_path.display()))?;
        let manifest: CatalogManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", manifest_path.display()))?;

        info!(
            generated_at = %manifest.generated_at,
            source = %manifest.source_path.unwrap_or_default(),
            labels = manifest.label_count,
            aliases = manifest.alias_count,
            skipped = manifest.skipped_line_count,
            duplicates = manifest.duplicate_id_count,
            "loaded catalog manifest"
        );
    } else {
        warn!(path = %manifest_path.display(), "catalog manifest missing");
    }

    if db_path.exists() {
        let connection = store::open_read_only(&db_path)?;
        let labels = query_count(&connection, "SELECT COUNT(*) FROM labels").unwrap_or(0);
        let aliases = query_count(&connection, "SELECT COUNT(*) FROM label_aliases").unwrap_or(0);
        let quizzes = query_count(&connection, "SELECT COUNT(*) FROM quiz_history").unwrap_or(0);
        let schema_version = store::metadata_value(&connection, "db_schema_version")
            .unwrap_or_default()
            .unwrap_or_default();
        let catalog_updated_at = store::metadata_value(&connection, "catalog_updated_at")
            .unwrap_or_default()
            .unwrap_or_default();

        info!(
            path = %db_path.display(),
            labels,
            aliases,
            quizzes,
            schema_version = %schema_version,
            catalog_updated_at = %catalog_updated_at,
            "database status"
        );
    } else {
        warn!(path = %db_path.display(), "database file missing");
    }

    info!(
        api_key_configured = env::resolve_api_key(&args.data_root).is_some(),
        "image search credentials"
    );

    Ok(())
}

fn query_count(conn: &Connection, sql: &str) -> Result<i64> {
    let count = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
