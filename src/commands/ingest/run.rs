use anyhow::Result;
use tracing::{info, warn};

use crate::catalog::{LabelCatalog, ParseCounts};
use crate::cli::IngestArgs;
use crate::model::CatalogManifest;
use crate::store;
use crate::util::{ensure_directory, now_utc_string, sha256_file, write_json_pretty};

use super::{locate_catalog_source, read_catalog_text};

pub fn run(args: IngestArgs) -> Result<()> {
    ensure_directory(&args.data_root)?;

    let manifest_path = args.manifest_path.clone().unwrap_or_else(|| {
        args.data_root
            .join("manifests")
            .join("catalog_manifest.json")
    });
    let db_path = store::resolve_db_path(&args.data_root, args.db_path.clone());

    let source = locate_catalog_source(&args.data_root, args.catalog_path.as_deref());

    let (catalog, counts, source_path, source_sha256) = match source {
        Some(path) => {
            let text = read_catalog_text(&path)?;
            let (catalog, counts) = LabelCatalog::parse(&text)?;
            let sha256 = sha256_file(&path)?;

            info!(
                path = %path.display(),
                labels = catalog.len(),
                aliases = catalog.alias_count(),
                skipped = counts.skipped_lines,
                duplicates = counts.duplicate_ids,
                "parsed catalog source"
            );

            let source_path = path.display().to_string();
            (catalog, counts, Some(source_path), Some(sha256))
        }
        None => {
            match &args.catalog_path {
                Some(path) => warn!(
                    path = %path.display(),
                    "catalog source not found; loading empty catalog"
                ),
                None => warn!(
                    data_root = %args.data_root.display(),
                    "catalog source not found (looked for label.txt / imagenet21k_labels.txt); loading empty catalog"
                ),
            }
            (LabelCatalog::default(), ParseCounts::default(), None, None)
        }
    };

    let mut connection = store::open_rw(&db_path)?;
    store::replace_catalog(
        &mut connection,
        catalog.items(),
        source_path.as_deref(),
        source_sha256.as_deref(),
    )?;

    let manifest = CatalogManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_path,
        source_sha256,
        label_count: catalog.len(),
        alias_count: catalog.alias_count(),
        skipped_line_count: counts.skipped_lines,
        duplicate_id_count: counts.duplicate_ids,
    };
    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote catalog manifest");
    info!(
        db_path = %db_path.display(),
        labels = manifest.label_count,
        "ingest completed"
    );

    Ok(())
}
