use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::HistoryArgs;
use crate::model::QuizHistoryEntry;
use crate::store;

#[derive(Debug, Serialize)]
struct HistoryResponse {
    returned: usize,
    entries: Vec<QuizHistoryEntry>,
}

pub fn run(args: HistoryArgs) -> Result<()> {
    let db_path = store::resolve_db_path(&args.data_root, args.db_path.clone());
    if !db_path.exists() {
        warn!(path = %db_path.display(), "database file missing; no quiz history");
        return Ok(());
    }

    let connection = store::open_read_only(&db_path)?;
    let entries = store::load_history(&connection, args.limit)?;

    if entries.is_empty() {
        info!("no quiz history yet; play a label roulette first");
        return Ok(());
    }

    if args.json {
        let response = HistoryResponse {
            returned: entries.len(),
            entries,
        };

        let mut output = io::BufWriter::new(io::stdout().lock());
        serde_json::to_writer_pretty(&mut output, &response)
            .context("failed to serialize history json output")?;
        writeln!(output)?;
        output.flush()?;
        return Ok(());
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    for entry in &entries {
        writeln!(
            output,
            "{}\thumans {}/{} ({}%)\tai {}/{} ({}%)\twinner: {}{}",
            entry.finished_at,
            entry.human_correct,
            entry.total,
            percent(entry.human_accuracy),
            entry.ai_correct,
            entry.total,
            percent(entry.ai_accuracy),
            entry.winner.as_str(),
            entry
                .model
                .as_deref()
                .map(|model| format!("\tmodel: {model}"))
                .unwrap_or_default(),
        )?;
    }
    output.flush()?;

    Ok(())
}

fn percent(accuracy: f64) -> i64 {
    (accuracy * 100.0).round() as i64
}
