use std::collections::HashSet;
use std::path::Path;

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::thread_rng;

use super::loader;
use super::types::Question;
use crate::error::GameError;

/// The trivia question pool.
///
/// Holds the full loaded set plus a shuffled working sequence of the
/// unanswered questions. `next()` peeks at the head; questions leave the
/// sequence only through `retire()`. Shuffle order is session-local and not
/// preserved across save/load; only the answered/unanswered split is.
#[derive(Debug)]
pub struct QuestionBank {
    questions: Vec<Question>,
    sequence: Vec<Question>,
}

impl QuestionBank {
    pub fn load(dir: &Path) -> Result<Self, GameError> {
        let questions = loader::load_dir(dir)?;
        info!("loaded {} questions from {}", questions.len(), dir.display());
        Ok(Self::from_questions(questions))
    }

    pub fn from_questions(questions: Vec<Question>) -> Self {
        let mut bank = QuestionBank {
            questions,
            sequence: Vec::new(),
        };
        bank.randomize();
        bank
    }

    /// Rebuilds the working sequence: unanswered questions in a fresh
    /// uniformly-shuffled order.
    pub fn randomize(&mut self) {
        self.sequence = self
            .questions
            .iter()
            .filter(|q| !q.answered)
            .cloned()
            .collect();
        self.sequence.shuffle(&mut thread_rng());
    }

    /// The next question to present. Does not consume it; the same question
    /// stays at the head until retired.
    pub fn next(&self) -> Result<&Question, GameError> {
        self.sequence.first().ok_or(GameError::PoolExhausted)
    }

    /// Removes every question sharing the given question's text from the
    /// working sequence and marks them answered.
    ///
    /// Matching by text rather than id is a deliberate dedup rule; if the
    /// source data ever held two distinct questions with identical text,
    /// both would be retired together.
    pub fn retire(&mut self, question: &Question) {
        let text = question.question.clone();
        self.sequence.retain(|q| q.question != text);
        for q in self.questions.iter_mut().filter(|q| q.question == text) {
            q.answered = true;
        }
        debug!("retired question {:?}, {} remaining", text, self.sequence.len());
    }

    pub fn remaining(&self) -> usize {
        self.sequence.len()
    }

    pub fn all_ids(&self) -> Vec<u32> {
        self.questions.iter().map(|q| q.id).collect()
    }

    /// Ids of every answered question, for persistence.
    pub fn answered_ids(&self) -> Vec<u32> {
        self.questions
            .iter()
            .filter(|q| q.answered)
            .map(|q| q.id)
            .collect()
    }

    /// Rebuilds the pool from a persisted answered-id set, then
    /// re-randomizes. Shuffle order deliberately starts fresh.
    pub fn restore_answered(&mut self, answered: &HashSet<u32>) {
        for q in &mut self.questions {
            q.answered = answered.contains(&q.id);
        }
        self.randomize();
    }

    /// Marks everything unanswered and reshuffles, for a new game.
    pub fn reset(&mut self) {
        for q in &mut self.questions {
            q.answered = false;
        }
        self.randomize();
    }
}
