use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;

use crate::cli::ResolveArgs;
use crate::model::LabelItem;
use crate::store;

#[derive(Debug, Serialize)]
struct ResolveResponse {
    prediction: String,
    matched: bool,
    match_kind: Option<String>,
    result: Option<LabelItem>,
}

pub fn run(args: ResolveArgs) -> Result<()> {
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

    let matched = catalog.match_prediction(&args.prediction);

    if args.json {
        let response = ResolveResponse {
            prediction: args.prediction.clone(),
            matched: matched.is_some(),
            match_kind: matched.map(|(_, kind)| kind.as_str().to_string()),
            result: matched.map(|(item, _)| item.clone()),
        };

        let mut output = io::BufWriter::new(io::stdout().lock());
        serde_json::to_writer_pretty(&mut output, &response)
            .context("failed to serialize resolve json output")?;
        writeln!(output)?;
        output.flush()?;
        return Ok(());
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "Prediction: {}", args.prediction)?;
    match matched {
        Some((item, kind)) => {
            writeln!(output, "Match: {} ({})", item.id, kind.as_str())?;
            writeln!(output, "Name: {}", item.primary_name)?;
            if !item.aliases.is_empty() {
                writeln!(output, "Aliases: {}", item.aliases.join(", "))?;
            }
        }
        None => {
            writeln!(output, "Match: none")?;
        }
    }
    output.flush()?;

    Ok(())
}
