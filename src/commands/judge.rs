use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::warn;

use crate::cli::JudgeArgs;
use crate::game;
use crate::model::LabelItem;
use crate::store;

pub fn run(args: JudgeArgs) -> Result<()> {
    let db_path = store::resolve_db_path(&args.data_root, args.db_path.clone());
    if !db_path.exists() {
        warn!(path = %db_path.display(), "database file missing; run ingest first");
        return Ok(());
    }

    let connection = store::open_read_only(&db_path)?;
    let catalog = store::load_catalog(&connection)?;
    if catalog.is_empty() {
        warn!("catalog is empty; run ingest first");
        return Ok(());
    }

    let Some(ai) = catalog.resolve(&args.ai) else {
        warn!(query = %args.ai, "no catalog match for the AI label");
        return Ok(());
    };
    let Some(user) = catalog.resolve(&args.user) else {
        warn!(query = %args.user, "no catalog match for the human label");
        return Ok(());
    };
    let truth = match &args.truth {
        Some(text) => match catalog.resolve(text) {
            Some(item) => Some(item),
            None => {
                warn!(query = %text, "no catalog match for the ground-truth label");
                return Ok(());
            }
        },
        None => None,
    };

    let result = game::judge(ai, user, truth);

    if args.json {
        let mut output = io::BufWriter::new(io::stdout().lock());
        serde_json::to_writer_pretty(&mut output, &result)
            .context("failed to serialize judge json output")?;
        writeln!(output)?;
        output.flush()?;
        return Ok(());
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "AI: {}", display_text(ai))?;
    writeln!(output, "You: {}", display_text(user))?;
    match truth {
        Some(truth_item) => {
            writeln!(output, "Ground truth: {}", display_text(truth_item))?;
            writeln!(
                output,
                "{}",
                if result.user_matches_truth {
                    "You nailed the secret label!"
                } else {
                    "You missed the secret label."
                }
            )?;
            writeln!(
                output,
                "{}",
                if result.ai_matches_truth {
                    "AI hit the target."
                } else {
                    "AI missed the target."
                }
            )?;
        }
        None => {
            if result.exact_match {
                writeln!(output, "Perfect match: you and the model agree.")?;
            } else {
                writeln!(output, "Disagreement detected.")?;
            }
        }
    }
    output.flush()?;

    Ok(())
}

/// Primary name with the first alias in parentheses, per the original
/// game's label display.
pub(crate) fn display_text(item: &LabelItem) -> String {
    match item.aliases.first() {
        Some(alias) if !alias.is_empty() => format!("{} ({})", item.primary_name, alias),
        _ => item.primary_name.clone(),
    }
}
