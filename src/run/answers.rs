//! Answer resolution: streak, score, experience and damage.

use super::outcomes::AnswerOutcome;
use super::state::GameState;
use crate::catalog::Catalog;
use crate::core::balance::{
    BASE_QUESTION_SCORE, EXPERIENCE_PER_DIFFICULTY, STREAK_BONUS_CAP, STREAK_BONUS_PER_ANSWER,
    WRONG_ANSWER_DAMAGE,
};
use crate::core::{GameError, Result};
use crate::questions::Question;
use rand::Rng;

/// Score for a correct answer that brings the streak to `streak`:
/// `round(10 * (1 + min(streak * 0.1, 0.5)))`.
pub fn score_for_streak(streak: u32) -> i64 {
    let bonus = (streak as f64 * STREAK_BONUS_PER_ANSWER).min(STREAK_BONUS_CAP);
    (BASE_QUESTION_SCORE * (1.0 + bonus)).round() as i64
}

/// Base experience for answering a question of `difficulty` correctly.
pub fn experience_for_difficulty(difficulty: u8) -> u32 {
    EXPERIENCE_PER_DIFFICULTY * difficulty as u32
}

impl GameState {
    /// Resolves an answer to `question`.
    ///
    /// A correct answer extends the streak, adds score and experience, and
    /// offers perks on level-up. A wrong answer resets the streak and costs a
    /// life; losing the last one ends the run as failed.
    pub fn answer_question(
        &mut self,
        question: &Question,
        answer_index: usize,
        catalog: &Catalog,
        rng: &mut impl Rng,
    ) -> Result<AnswerOutcome> {
        if self.is_completed {
            return Err(GameError::RunAlreadyOver);
        }

        let correct = question.is_correct(answer_index);
        let mut outcome = AnswerOutcome {
            correct,
            correct_answer: question.correct_answer,
            explanation: question.explanation.clone(),
            score_gained: 0,
            experience_gained: 0,
            streak: 0,
            levels_gained: 0,
            level_up: false,
            perk_choices: Vec::new(),
            lives_remaining: 0,
            run_over: false,
            reward: None,
        };

        if correct {
            let streak = self.record_correct();
            outcome.score_gained = score_for_streak(streak);
            self.score += outcome.score_gained;

            let base = experience_for_difficulty(question.difficulty);
            let multiplier =
                self.character.experience_multiplier() * self.challenge_experience_multiplier();
            outcome.experience_gained = (base as f64 * multiplier.max(0.0)).round() as u32;
            outcome.levels_gained = self.character.gain_experience(base, multiplier);
            if outcome.levels_gained > 0 {
                outcome.level_up = true;
                outcome.perk_choices = self.offer_perks(catalog, rng);
            }
        } else {
            self.record_incorrect();
            let before = self.character.lives();
            let defeated = self.character.take_damage(WRONG_ANSWER_DAMAGE);
            self.record_life_lost((before - self.character.lives()) as u32);
            if defeated {
                self.end_run(false);
                outcome.run_over = true;
            }
        }

        outcome.streak = self.streak;
        outcome.lives_remaining = self.character.lives();
        tracing::debug!(
            "Answered {} ({}): streak {}, lives {}",
            question.id,
            if correct { "correct" } else { "wrong" },
            outcome.streak,
            outcome.lives_remaining
        );
        Ok(outcome)
    }
}
