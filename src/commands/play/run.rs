use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::catalog::LabelCatalog;
use crate::cli::PlayArgs;
use crate::commands::judge::display_text;
use crate::env;
use crate::game::{self, QuizSession, QuizState};
use crate::model::LabelItem;
use crate::pixabay::{PixabayClient, image_description};
use crate::provider::{AiLabelProvider, CommandLabelProvider, NullLabelProvider};
use crate::store;

use super::prompt;

pub fn run(args: PlayArgs) -> Result<()> {
    let db_path = store::resolve_db_path(&args.data_root, args.db_path.clone());
    if !db_path.exists() {
        warn!(path = %db_path.display(), "database file missing; run ingest first");
        return Ok(());
    }

    let connection = store::open_rw(&db_path)?;
    let catalog = store::load_catalog(&connection)?;
    if catalog.is_empty() {
        warn!("catalog is empty; run ingest first");
        return Ok(());
    }

    let provider: Box<dyn AiLabelProvider> = match &args.ai_command {
        Some(command) => Box::new(CommandLabelProvider::new(command.clone())),
        None => Box::new(NullLabelProvider),
    };
    info!(model = %provider.status(), "model provider ready");

    let api_key = args
        .api_key
        .clone()
        .or_else(|| env::resolve_api_key(&args.data_root));
    let Some(api_key) = api_key else {
        warn!(
            "no API key configured; set {} or add it to the data root's .env file",
            env::API_KEY_VAR
        );
        return Ok(());
    };
    let client = PixabayClient::new(api_key, args.api_base.clone())?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut output = stdout.lock();

    play_quiz(
        &args,
        &catalog,
        provider.as_ref(),
        &client,
        &connection,
        &mut input,
        &mut output,
    )
}

fn play_quiz(
    args: &PlayArgs,
    catalog: &LabelCatalog,
    provider: &dyn AiLabelProvider,
    client: &PixabayClient,
    connection: &Connection,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> Result<()> {
    let images_dir = args.data_root.join("images");
    let mut session = QuizSession::new(args.rounds);

    for round_index in 1..=session.total() {
        writeln!(output)?;
        writeln!(output, "Round {round_index} of {}", session.total())?;

        let secret = match args.secrets.get(round_index - 1) {
            Some(text) => match catalog.resolve(text) {
                Some(item) => item.clone(),
                None => {
                    warn!(query = %text, "secret override not in catalog; quiz abandoned");
                    return Ok(());
                }
            },
            None => draw_secret(catalog)?,
        };
        info!(secret_id = %secret.id, "secret label locked (revealed at judgment)");

        let hits = match client.search_images(&secret.primary_name) {
            Ok(hits) => hits,
            Err(err) => {
                warn!(error = %err, "image search failed; quiz abandoned");
                return Ok(());
            }
        };
        if hits.is_empty() {
            warn!(query = %secret.primary_name, "no images found for the secret label; quiz abandoned");
            return Ok(());
        }

        // One pass over the fetched hits; no network retries.
        let mut ai_label: Option<LabelItem> = None;
        for hit in &hits {
            let image_path = match client.download_image(hit, &images_dir) {
                Ok(path) => path,
                Err(err) => {
                    warn!(id = hit.id, error = %err, "image download failed; trying the next hit");
                    continue;
                }
            };

            writeln!(
                output,
                "Image: {} ({})",
                image_path.display(),
                image_description(hit)
            )?;

            match provider.predict(&image_path, catalog)? {
                Some(label) => {
                    ai_label = Some(label);
                    break;
                }
                None => {
                    warn!(image = %image_path.display(), "prediction failed; trying the next image");
                }
            }
        }

        let Some(ai_label) = ai_label else {
            warn!("no prediction on any fetched image; quiz abandoned");
            return Ok(());
        };

        writeln!(output, "AI guessed: {}", display_text(&ai_label))?;

        let Some(user_label) = prompt::pick_label(catalog, input, output)? else {
            warn!("input closed before a guess was made; quiz abandoned");
            return Ok(());
        };

        let result = game::judge(&ai_label, &user_label, Some(&secret));

        writeln!(output, "Ground truth: {}", display_text(&secret))?;
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
        if !result.exact_match {
            writeln!(
                output,
                "AI: {} / You: {}",
                ai_label.primary_name, user_label.primary_name
            )?;
        }

        session.record(result)?;
        if let QuizState::InProgress { round } = session.state() {
            info!(next_round = round, "round recorded");
        }
    }

    let summary = session.summary().context("quiz ended without a summary")?;

    writeln!(output)?;
    writeln!(output, "Final score")?;
    writeln!(
        output,
        "Humans: {}/{} ({}%)",
        summary.human_correct,
        summary.total,
        percent(summary.human_accuracy)
    )?;
    writeln!(
        output,
        "AI: {}/{} ({}%)",
        summary.ai_correct,
        summary.total,
        percent(summary.ai_accuracy)
    )?;
    writeln!(output, "Winner: {}", summary.winner.as_str())?;
    writeln!(output, "{}", summary.comment)?;

    let entry = store::append_history(connection, &summary, args.ai_command.as_deref())?;
    info!(entry_id = %entry.entry_id, "quiz summary saved");

    Ok(())
}

fn percent(accuracy: f64) -> i64 {
    (accuracy * 100.0).round() as i64
}

pub(crate) fn draw_secret(catalog: &LabelCatalog) -> Result<LabelItem> {
    if catalog.is_empty() {
        bail!("cannot draw a secret label from an empty catalog");
    }

    let mut buf = [0_u8; 8];
    getrandom::fill(&mut buf).map_err(|err| anyhow!("failed to draw a random label: {err}"))?;
    let index = (u64::from_ne_bytes(buf) % catalog.len() as u64) as usize;
    Ok(catalog.items()[index].clone())
}
