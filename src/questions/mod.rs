//! Quiz items tagged with category and difficulty, and filtered sampling.
//!
//! Drawing never comes back empty. The filter relaxes step by step:
//! exact match, same category within one difficulty, same category at any
//! difficulty, any question, and finally a built-in default question.

pub mod data;
pub mod selector;

pub use selector::{QuestionSelector, UniformSelector, UnseenFirstSelector};

use crate::catalog::loader::{load_records, QUESTIONS_KEY};
use crate::catalog::Record;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
    pub category: String,
    pub difficulty: u8,
}

impl Record for Question {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Question {
    pub fn is_correct(&self, answer_index: usize) -> bool {
        answer_index == self.correct_answer
    }
}

#[derive(Debug)]
pub struct QuestionBank {
    questions: Vec<Question>,
    selector: Box<dyn QuestionSelector>,
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl QuestionBank {
    /// A bank using uniform selection.
    pub fn new(questions: Vec<Question>) -> Self {
        Self::with_selector(questions, Box::new(UniformSelector))
    }

    pub fn with_selector(questions: Vec<Question>, selector: Box<dyn QuestionSelector>) -> Self {
        let questions: Vec<Question> = questions
            .into_iter()
            .filter(|q| {
                let valid = q.correct_answer < q.options.len();
                if !valid {
                    tracing::warn!(
                        "Dropping question {}: answer {} out of {} options",
                        q.id,
                        q.correct_answer,
                        q.options.len()
                    );
                }
                valid
            })
            .collect();
        Self {
            questions,
            selector,
        }
    }

    /// The built-in question set.
    pub fn builtin() -> Self {
        Self::with_selector(data::default_questions(), Box::new(UnseenFirstSelector))
    }

    /// Loads `questions.json` from `dir`.
    pub fn load_from_dir(dir: &Path, selector: Box<dyn QuestionSelector>) -> Self {
        let bank = Self::with_selector(load_records(dir, QUESTIONS_KEY), selector);
        tracing::info!("Loaded {} questions from {}", bank.len(), dir.display());
        bank
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn categories(&self) -> BTreeSet<&str> {
        self.questions.iter().map(|q| q.category.as_str()).collect()
    }

    /// Draws a question for `category`/`difficulty`, relaxing the filter until
    /// something matches.
    pub fn draw(
        &self,
        category: &str,
        difficulty: u8,
        asked: &BTreeSet<String>,
        rng: &mut dyn RngCore,
    ) -> Question {
        let filters: [&dyn Fn(&Question) -> bool; 4] = [
            &|q: &Question| q.category == category && q.difficulty == difficulty,
            &|q: &Question| q.category == category && q.difficulty.abs_diff(difficulty) <= 1,
            &|q: &Question| q.category == category,
            &|_: &Question| true,
        ];

        for (level, filter) in filters.iter().enumerate() {
            let candidates: Vec<&Question> = self.questions.iter().filter(|&q| filter(q)).collect();
            if candidates.is_empty() {
                continue;
            }
            if level > 0 {
                tracing::debug!(
                    "No exact question for {}/{}; relaxed filter level {}",
                    category,
                    difficulty,
                    level
                );
            }
            if let Some(question) = self.selector.select(&candidates, asked, rng) {
                return question.clone();
            }
        }

        tracing::warn!("Question bank exhausted; using default question");
        data::fallback_question()
    }

    /// Draws `difficulties.len()` questions, one per requested difficulty,
    /// avoiding repeats within the batch where possible.
    pub fn draw_many(
        &self,
        category: &str,
        difficulties: &[u8],
        asked: &BTreeSet<String>,
        rng: &mut dyn RngCore,
    ) -> Vec<Question> {
        let mut seen = asked.clone();
        difficulties
            .iter()
            .map(|&difficulty| {
                let question = self.draw(category, difficulty, &seen, rng);
                seen.insert(question.id.clone());
                question
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn question(id: &str, category: &str, difficulty: u8) -> Question {
        Question {
            id: id.to_string(),
            text: format!("{} question", category),
            options: vec!["yes".to_string(), "no".to_string()],
            correct_answer: 0,
            explanation: String::new(),
            category: category.to_string(),
            difficulty,
        }
    }

    fn sample_bank() -> QuestionBank {
        QuestionBank::new(vec![
            question("d1", "dosimetry", 1),
            question("d3", "dosimetry", 3),
            question("i2", "imaging", 2),
        ])
    }

    #[test]
    fn test_exact_match_preferred() {
        let bank = sample_bank();
        let mut rng = create_test_rng();
        for _ in 0..20 {
            let q = bank.draw("dosimetry", 1, &BTreeSet::new(), &mut rng);
            assert_eq!(q.id, "d1");
        }
    }

    #[test]
    fn test_relaxed_difficulty_for_out_of_range() {
        let bank = sample_bank();
        let mut rng = create_test_rng();
        let q = bank.draw("dosimetry", 4, &BTreeSet::new(), &mut rng);
        assert_eq!(q.id, "d3");
    }

    #[test]
    fn test_same_category_any_difficulty() {
        let bank = QuestionBank::new(vec![
            question("d0", "dosimetry", 0),
            question("i3", "imaging", 3),
        ]);
        let mut rng = create_test_rng();
        let q = bank.draw("dosimetry", 3, &BTreeSet::new(), &mut rng);
        assert_eq!(q.id, "d0");
    }

    #[test]
    fn test_unknown_category_falls_back_to_any() {
        let bank = sample_bank();
        let mut rng = create_test_rng();
        let q = bank.draw("astrology", 2, &BTreeSet::new(), &mut rng);
        assert!(bank.get(&q.id).is_some());
    }

    #[test]
    fn test_empty_bank_returns_default_question() {
        let bank = QuestionBank::default();
        let mut rng = create_test_rng();
        let q = bank.draw("dosimetry", 4, &BTreeSet::new(), &mut rng);
        assert!(!q.options.is_empty());
        assert!(q.correct_answer < q.options.len());
    }

    #[test]
    fn test_invalid_questions_dropped() {
        let mut broken = question("bad", "imaging", 1);
        broken.correct_answer = 5;
        let bank = QuestionBank::new(vec![broken, question("ok", "imaging", 1)]);
        assert_eq!(bank.len(), 1);
        assert!(bank.get("bad").is_none());
    }

    #[test]
    fn test_draw_many_avoids_batch_repeats() {
        let bank = QuestionBank::with_selector(
            vec![
                question("a", "imaging", 2),
                question("b", "imaging", 2),
                question("c", "imaging", 2),
            ],
            Box::new(UnseenFirstSelector),
        );
        let mut rng = create_test_rng();
        let drawn = bank.draw_many("imaging", &[2, 2, 2], &BTreeSet::new(), &mut rng);
        let ids: BTreeSet<&str> = drawn.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_builtin_covers_every_category() {
        let bank = QuestionBank::builtin();
        for category in crate::core::balance::CATEGORIES {
            assert!(
                bank.categories().contains(category),
                "no built-in question for {}",
                category
            );
        }
    }

    #[test]
    fn test_question_json_uses_question_key() {
        let q: Question = serde_json::from_str(
            r#"{"id": "x", "question": "What?", "options": ["a", "b"],
                "correct_answer": 1, "category": "imaging", "difficulty": 2}"#,
        )
        .unwrap();
        assert_eq!(q.text, "What?");
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
    }
}
