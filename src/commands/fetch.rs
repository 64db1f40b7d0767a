use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::FetchArgs;
use crate::env;
use crate::pixabay::{PixabayClient, PixabayImage};

#[derive(Debug, Serialize)]
struct FetchResponse {
    query: String,
    returned: usize,
    hits: Vec<PixabayImage>,
}

pub fn run(args: FetchArgs) -> Result<()> {
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

    let hits = match client.search_images(&args.query) {
        Ok(hits) => hits,
        Err(err) => {
            warn!(query = %args.query, error = %err, "image search failed");
            return Ok(());
        }
    };

    if hits.is_empty() {
        info!(query = %args.query, "no results found");
    }

    if args.json {
        let response = FetchResponse {
            query: args.query.clone(),
            returned: hits.len(),
            hits: hits.clone(),
        };

        let mut output = io::BufWriter::new(io::stdout().lock());
        serde_json::to_writer_pretty(&mut output, &response)
            .context("failed to serialize fetch json output")?;
        writeln!(output)?;
        output.flush()?;
    } else {
        let mut output = io::BufWriter::new(io::stdout().lock());
        writeln!(output, "Query: {}", args.query)?;
        writeln!(output, "Results: {}", hits.len())?;
        for (rank, hit) in hits.iter().enumerate() {
            writeln!(
                output,
                "{}.\t{}\t{}\t{}",
                rank + 1,
                hit.id,
                hit.user,
                hit.preview_url
            )?;
        }
        output.flush()?;
    }

    if let Some(index) = args.download {
        let Some(hit) = index.checked_sub(1).and_then(|i| hits.get(i)) else {
            warn!(index, returned = hits.len(), "download index out of range");
            return Ok(());
        };

        match client.download_image(hit, &args.data_root.join("images")) {
            Ok(path) => info!(path = %path.display(), id = hit.id, "image saved"),
            Err(err) => warn!(id = hit.id, error = %err, "image download failed"),
        }
    }

    Ok(())
}
