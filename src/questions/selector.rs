//! Question selection strategies.
//!
//! The bank narrows the candidate set; a selector picks one question from it.
//! Strategies are injected when the bank is built.

use super::Question;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::collections::BTreeSet;
use std::fmt::Debug;

pub trait QuestionSelector: Debug + Send + Sync {
    /// Picks one of `candidates` (never empty). `asked` holds the ids already
    /// asked this run.
    fn select<'a>(
        &self,
        candidates: &[&'a Question],
        asked: &BTreeSet<String>,
        rng: &mut dyn RngCore,
    ) -> Option<&'a Question>;
}

/// Uniform choice over all candidates.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformSelector;

impl QuestionSelector for UniformSelector {
    fn select<'a>(
        &self,
        candidates: &[&'a Question],
        _asked: &BTreeSet<String>,
        rng: &mut dyn RngCore,
    ) -> Option<&'a Question> {
        candidates.choose(rng).copied()
    }
}

/// Prefers questions not yet asked this run; repeats only once every
/// candidate has been seen.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnseenFirstSelector;

impl QuestionSelector for UnseenFirstSelector {
    fn select<'a>(
        &self,
        candidates: &[&'a Question],
        asked: &BTreeSet<String>,
        rng: &mut dyn RngCore,
    ) -> Option<&'a Question> {
        let unseen: Vec<&'a Question> = candidates
            .iter()
            .copied()
            .filter(|q| !asked.contains(&q.id))
            .collect();
        if unseen.is_empty() {
            candidates.choose(rng).copied()
        } else {
            unseen.choose(rng).copied()
        }
    }
}
