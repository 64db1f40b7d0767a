use serde::{Deserialize, Serialize};

/// One canonical catalog entry. Identity is the id; all fields are
/// lower-cased at parse time so matching never has to re-normalize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelItem {
    pub id: String,
    pub primary_name: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Human,
    Ai,
    Draw,
}

impl Winner {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Ai => "ai",
            Self::Draw => "draw",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "human" => Some(Self::Human),
            "ai" => Some(Self::Ai),
            "draw" => Some(Self::Draw),
            _ => None,
        }
    }
}

/// One judged round: AI guess vs. human guess, optionally against a
/// secret ground-truth label. The truth flags are false when no ground
/// truth was in play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResult {
    pub ai_label_id: String,
    pub user_label_id: String,
    pub ground_truth_label_id: Option<String>,
    pub exact_match: bool,
    pub ai_matches_truth: bool,
    pub user_matches_truth: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub total: usize,
    pub human_correct: usize,
    pub ai_correct: usize,
    pub human_accuracy: f64,
    pub ai_accuracy: f64,
    pub winner: Winner,
    pub comment: String,
    pub finished_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizHistoryEntry {
    pub entry_id: String,
    pub finished_at: String,
    pub total: usize,
    pub human_correct: usize,
    pub ai_correct: usize,
    pub human_accuracy: f64,
    pub ai_accuracy: f64,
    pub winner: Winner,
    pub model: Option<String>,
}

/// Written next to the database after every ingest run. `source_path` and
/// `source_sha256` are absent when no catalog source was found and an
/// empty catalog was loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_path: Option<String>,
    pub source_sha256: Option<String>,
    pub label_count: usize,
    pub alias_count: usize,
    pub skipped_line_count: usize,
    pub duplicate_id_count: usize,
}
