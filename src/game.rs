use anyhow::{Result, bail};

use crate::model::{LabelItem, QuizSummary, RoundResult, Winner};
use crate::util::now_utc_string;

/// Compares the AI guess against the human guess, and both against the
/// secret label when one is in play. Equality is on label id only.
pub fn judge(ai: &LabelItem, user: &LabelItem, truth: Option<&LabelItem>) -> RoundResult {
    RoundResult {
        ai_label_id: ai.id.clone(),
        user_label_id: user.id.clone(),
        ground_truth_label_id: truth.map(|item| item.id.clone()),
        exact_match: ai.id == user.id,
        ai_matches_truth: truth.is_some_and(|item| item.id == ai.id),
        user_matches_truth: truth.is_some_and(|item| item.id == user.id),
        timestamp: now_utc_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    NotStarted,
    InProgress { round: usize },
    Completed,
}

/// A fixed-size quiz session. Rounds are recorded strictly in order; the
/// summary only exists once every round has been judged.
#[derive(Debug, Clone)]
pub struct QuizSession {
    total: usize,
    rounds: Vec<RoundResult>,
}

impl QuizSession {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            rounds: Vec::with_capacity(total),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn state(&self) -> QuizState {
        if self.rounds.is_empty() {
            QuizState::NotStarted
        } else if self.rounds.len() < self.total {
            QuizState::InProgress {
                round: self.rounds.len() + 1,
            }
        } else {
            QuizState::Completed
        }
    }

    pub fn is_complete(&self) -> bool {
        self.rounds.len() >= self.total
    }

    pub fn record(&mut self, round: RoundResult) -> Result<()> {
        if self.is_complete() {
            bail!("quiz already completed after {} rounds", self.total);
        }
        self.rounds.push(round);
        Ok(())
    }

    pub fn summary(&self) -> Option<QuizSummary> {
        if !self.is_complete() {
            return None;
        }

        let human_correct = self
            .rounds
            .iter()
            .filter(|round| round.user_matches_truth)
            .count();
        let ai_correct = self
            .rounds
            .iter()
            .filter(|round| round.ai_matches_truth)
            .count();

        let winner = if human_correct > ai_correct {
            Winner::Human
        } else if ai_correct > human_correct {
            Winner::Ai
        } else {
            Winner::Draw
        };

        Some(QuizSummary {
            total: self.total,
            human_correct,
            ai_correct,
            human_accuracy: human_correct as f64 / self.total as f64,
            ai_accuracy: ai_correct as f64 / self.total as f64,
            winner,
            comment: comment_for(winner).to_string(),
            finished_at: now_utc_string(),
        })
    }
}

fn comment_for(winner: Winner) -> &'static str {
    match winner {
        Winner::Human => "Humanity takes this one. The model wants a rematch.",
        Winner::Ai => "The model takes this one. Sharpen your eyes and try again.",
        Winner::Draw => "Dead heat. Nobody blinks.",
    }
}
