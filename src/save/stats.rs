//! Aggregate player statistics across runs.

use crate::run::RunSummary;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub runs_started: u32,
    pub runs_completed: u32,
    pub runs_won: u32,
    pub best_score: i64,
    pub total_score: i64,
    pub highest_floor: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub best_streak: u32,
}

impl PlayerStats {
    pub fn record_run_started(&mut self) {
        self.runs_started += 1;
    }

    pub fn record_run_finished(&mut self, summary: &RunSummary) {
        self.runs_completed += 1;
        if summary.success {
            self.runs_won += 1;
        }
        self.best_score = self.best_score.max(summary.final_score);
        self.total_score += summary.final_score;
        self.highest_floor = self.highest_floor.max(summary.floor_reached);
        self.questions_answered += summary.questions_answered;
        self.correct_answers += summary.correct_answers;
        self.best_streak = self.best_streak.max(summary.best_streak);
    }

    /// Fraction of all answers that were correct.
    pub fn accuracy(&self) -> f64 {
        if self.questions_answered == 0 {
            return 0.0;
        }
        self.correct_answers as f64 / self.questions_answered as f64
    }

    pub fn win_rate(&self) -> f64 {
        if self.runs_completed == 0 {
            return 0.0;
        }
        self.runs_won as f64 / self.runs_completed as f64
    }

    pub fn average_score(&self) -> f64 {
        if self.runs_completed == 0 {
            return 0.0;
        }
        self.total_score as f64 / self.runs_completed as f64
    }
}
