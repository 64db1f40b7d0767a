use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::util::{ensure_directory, utc_compact_string};

pub const DEFAULT_API_BASE: &str = "https://pixabay.com/api/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixabayImage {
    pub id: u64,
    #[serde(rename = "previewURL")]
    pub preview_url: String,
    #[serde(rename = "largeImageURL")]
    pub large_image_url: String,
    pub user: String,
}

#[derive(Debug, Deserialize)]
pub struct PixabayResponse {
    pub total: u64,
    #[serde(rename = "totalHits")]
    pub total_hits: u64,
    pub hits: Vec<PixabayImage>,
}

/// Lightweight Pixabay search client.
pub struct PixabayClient {
    api_key: String,
    api_base: String,
    http: reqwest::blocking::Client,
}

impl PixabayClient {
    pub fn new(api_key: String, api_base: String) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            api_key,
            api_base,
            http,
        })
    }

    /// Photo search. An empty or whitespace query short-circuits to an
    /// empty hit list without touching the network.
    pub fn search_images(&self, query: &str) -> Result<Vec<PixabayImage>> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .http
            .get(&self.api_base)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", trimmed),
                ("image_type", "photo"),
            ])
            .send()
            .context("image search request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("image search returned HTTP {status}");
        }

        let decoded: PixabayResponse = response
            .json()
            .context("failed to decode image search response")?;
        Ok(decoded.hits)
    }

    /// Downloads a hit's large image into `dest_dir` and returns the path.
    pub fn download_image(&self, image: &PixabayImage, dest_dir: &Path) -> Result<PathBuf> {
        ensure_directory(dest_dir)?;
        let filename = format!(
            "pixabay_{}_{}.jpg",
            image.id,
            utc_compact_string(Utc::now())
        );
        let dest = dest_dir.join(filename);

        let response = self
            .http
            .get(&image.large_image_url)
            .send()
            .with_context(|| format!("failed to download image {}", image.id))?;

        let status = response.status();
        if !status.is_success() {
            bail!("image download returned HTTP {status}");
        }

        let bytes = response
            .bytes()
            .with_context(|| format!("failed to read image bytes for {}", image.id))?;

        let mut file = File::create(&dest)
            .with_context(|| format!("failed to create image file: {}", dest.display()))?;
        file.write_all(&bytes)
            .with_context(|| format!("failed to write image file: {}", dest.display()))?;

        Ok(dest)
    }
}

/// Human-facing attribution line for a hit, used as the image source
/// description in round displays.
pub fn image_description(image: &PixabayImage) -> String {
    format!("Pixabay: {} / {}", image.user, image.id)
}
