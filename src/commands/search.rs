use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;

use crate::cli::SearchArgs;
use crate::model::LabelItem;
use crate::store;

#[derive(Debug, Serialize)]
struct SearchResponse {
    query: String,
    limit: usize,
    returned: usize,
    results: Vec<LabelItem>,
}

pub fn run(args: SearchArgs) -> Result<()> {
    let db_path = store::resolve_db_path(&args.data_root, args.db_path.clone());
    if !db_path.exists() {
        warn!(path = %db_path.display(), "database file missing; run ingest first");
        return Ok(());
    }

    let connection = store::open_read_only(&db_path)?;
    let catalog = store::load_catalog(&connection)?;
    if catalog.is_empty() {
        warn!("catalog is empty; run ingest first");
    }

    let results: Vec<LabelItem> = catalog
        .search(&args.query, args.limit)
        .into_iter()
        .cloned()
        .collect();

    if args.json {
        let response = SearchResponse {
            query: args.query,
            limit: args.limit,
            returned: results.len(),
            results,
        };

        let mut output = io::BufWriter::new(io::stdout().lock());
        serde_json::to_writer_pretty(&mut output, &response)
            .context("failed to serialize search json output")?;
        writeln!(output)?;
        output.flush()?;
        return Ok(());
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "Query: {}", args.query)?;
    writeln!(output, "Results: {}", results.len())?;
    for (rank, item) in results.iter().enumerate() {
        writeln!(
            output,
            "{}.\t{}\t{}\t{}",
            rank + 1,
            item.id,
            item.primary_name,
            item.aliases.join(", ")
        )?;
    }
    output.flush()?;

    Ok(())
}
