//! Quiz sessions over a vocabulary collection.
//!
//! A [`QuizSession`] asks each word of its pool at most once. Multiple-choice
//! questions carry four shuffled options; distractors come from the other
//! words in the collection. Wrong answers are appended to a [`WrongLog`].

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{WordRecord, WrongQuestion};
use crate::vocabulary::WrongLog;

/// Options shown for a multiple-choice question.
pub const OPTION_COUNT: usize = 4;

/// Minimum number of words a session needs.
pub const MIN_POOL_SIZE: usize = 4;

/// Placeholder that replaces the head word in fill-in-the-blank prompts.
pub const BLANK: &str = "________";

const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("at least {needed} words are needed to start a quiz, found {found}")]
    InsufficientPool { needed: usize, found: usize },

    #[error("there are no words in the wrong-question log")]
    EmptyWrongPool,

    #[error("could not find 3 distinct distractors for \"{answer}\" (found {found})")]
    PoolQuality { answer: String, found: usize },

    #[error("unknown quiz mode: {0}")]
    InvalidMode(String),

    #[error("the current question has not been answered yet")]
    AnswerPending,

    #[error("there is no question awaiting an answer")]
    NoPendingQuestion,

    #[error("the quiz session has finished")]
    SessionFinished,
}

/// What is shown and what has to be picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizMode {
    /// Show the head word, choose its definition.
    EnToCn,
    /// Show the definition, choose the head word.
    CnToEn,
    /// Show an example sentence with the head word blanked out.
    FillBlank,
    /// Show the definition, type the head word.
    Spelling,
}

impl QuizMode {
    pub const ALL: [QuizMode; 4] = [
        QuizMode::EnToCn,
        QuizMode::CnToEn,
        QuizMode::FillBlank,
        QuizMode::Spelling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnToCn => "en-to-cn",
            Self::CnToEn => "cn-to-en",
            Self::FillBlank => "fill-blank",
            Self::Spelling => "spelling",
        }
    }

    pub fn is_multiple_choice(&self) -> bool {
        !matches!(self, Self::Spelling)
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for QuizMode {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| QuizError::InvalidMode(s.to_string()))
    }
}

/// Caller-supplied session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfig {
    pub mode: QuizMode,
    /// Only ask words that appear in the wrong-question log.
    #[serde(default)]
    pub use_wrong_only: bool,
    /// Requested number of questions; capped by the pool size.
    pub quantity: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            mode: QuizMode::EnToCn,
            use_wrong_only: false,
            quantity: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    AwaitingAnswer,
    Answered,
    Finished,
}

/// One generated question.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// 1-based position within the session.
    pub number: usize,
    pub head_word: String,
    pub definition: String,
    /// Mode this question was built with. A fill-blank question for a word
    /// without example sentences is asked as [`QuizMode::EnToCn`].
    pub mode: QuizMode,
    pub prompt: String,
    /// Empty for spelling questions.
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerResult {
    pub correct: bool,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuizSummary {
    pub score: usize,
    pub total: usize,
    pub asked: usize,
    /// Percentage of `total` answered correctly, to one decimal place.
    pub accuracy: f64,
}

/// Which word field a multiple-choice option is drawn from.
#[derive(Debug, Clone, Copy)]
enum OptionField {
    HeadWord,
    Definition,
}

impl OptionField {
    fn value(self, word: &WordRecord) -> &str {
        match self {
            Self::HeadWord => &word.head_word,
            Self::Definition => &word.definition,
        }
    }
}

/// A running quiz.
pub struct QuizSession<R: Rng> {
    config: QuizConfig,
    /// The whole collection; distractors are drawn from here.
    words: Vec<WordRecord>,
    /// Indices into `words` that may be asked.
    pool: Vec<usize>,
    asked: HashSet<String>,
    total: usize,
    score: usize,
    question_number: usize,
    current: Option<Question>,
    state: SessionState,
    rng: R,
}

impl<R: Rng> QuizSession<R> {
    /// Validate the configuration against the collection and set up a session.
    pub fn start(
        words: &[WordRecord],
        wrong_log: &WrongLog,
        config: QuizConfig,
        rng: R,
    ) -> Result<Self, QuizError> {
        let distinct = words.iter().map(WordRecord::key).collect::<HashSet<_>>().len();
        if distinct < MIN_POOL_SIZE {
            return Err(QuizError::InsufficientPool {
                needed: MIN_POOL_SIZE,
                found: distinct,
            });
        }

        let pool: Vec<usize> = if config.use_wrong_only {
            let wrong_words = wrong_log.wrong_words();
            if wrong_words.is_empty() {
                return Err(QuizError::EmptyWrongPool);
            }
            words
                .iter()
                .enumerate()
                .filter(|(_, w)| wrong_words.contains(&w.head_word))
                .map(|(i, _)| i)
                .collect()
        } else {
            (0..words.len()).collect()
        };

        if config.mode.is_multiple_choice() && pool.len() < MIN_POOL_SIZE {
            return Err(QuizError::InsufficientPool {
                needed: MIN_POOL_SIZE,
                found: pool.len(),
            });
        }

        let total = config.quantity.min(pool.len());
        debug!(
            "starting {} quiz: {} questions from a pool of {}",
            config.mode,
            total,
            pool.len()
        );

        Ok(Self {
            config,
            words: words.to_vec(),
            pool,
            asked: HashSet::new(),
            total,
            score: 0,
            question_number: 0,
            current: None,
            state: SessionState::NotStarted,
            rng,
        })
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn question_number(&self) -> usize {
        self.question_number
    }

    /// The most recently generated question, answered or not.
    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    /// Generate the next question.
    ///
    /// Returns `Ok(None)` once the session is over, either because `total`
    /// questions have been answered or because the pool ran out.
    pub fn next_question(&mut self) -> Result<Option<Question>, QuizError> {
        match self.state {
            SessionState::Finished => return Err(QuizError::SessionFinished),
            SessionState::AwaitingAnswer => return Err(QuizError::AnswerPending),
            SessionState::NotStarted | SessionState::Answered => {}
        }

        if self.asked.len() >= self.total {
            self.finish();
            return Ok(None);
        }

        let available: Vec<usize> = self
            .pool
            .iter()
            .copied()
            .filter(|&i| !self.asked.contains(&self.words[i].head_word))
            .collect();

        let Some(&target) = available.choose(&mut self.rng) else {
            self.finish();
            return Ok(None);
        };

        let word = &self.words[target];
        let (mode, prompt, correct_answer, field) = match self.config.mode {
            QuizMode::EnToCn => en_to_cn(word),
            QuizMode::CnToEn => (
                QuizMode::CnToEn,
                word.definition.clone(),
                word.head_word.clone(),
                Some(OptionField::HeadWord),
            ),
            QuizMode::FillBlank => match word.sentences.first() {
                Some(sentence) => (
                    QuizMode::FillBlank,
                    sentence.replacen(&word.head_word, BLANK, 1),
                    word.head_word.clone(),
                    Some(OptionField::HeadWord),
                ),
                None => en_to_cn(word),
            },
            QuizMode::Spelling => (
                QuizMode::Spelling,
                word.definition.clone(),
                word.head_word.to_lowercase(),
                None,
            ),
        };

        let options = match field {
            Some(field) => build_options(&self.words, &correct_answer, field, &mut self.rng)?,
            None => Vec::new(),
        };

        self.question_number += 1;
        let question = Question {
            number: self.question_number,
            head_word: word.head_word.clone(),
            definition: word.definition.clone(),
            mode,
            prompt,
            options,
            correct_answer,
        };

        self.current = Some(question.clone());
        self.state = SessionState::AwaitingAnswer;
        Ok(Some(question))
    }

    /// Judge an answer to the pending question.
    ///
    /// A wrong answer is appended to `wrong_log` stamped with `now`.
    pub fn submit_answer(
        &mut self,
        selected: &str,
        wrong_log: &mut WrongLog,
        now: DateTime<Local>,
    ) -> Result<AnswerResult, QuizError> {
        match self.state {
            SessionState::Finished => return Err(QuizError::SessionFinished),
            SessionState::AwaitingAnswer => {}
            SessionState::NotStarted | SessionState::Answered => {
                return Err(QuizError::NoPendingQuestion)
            }
        }
        let question = self.current.as_ref().ok_or(QuizError::NoPendingQuestion)?;

        let correct = match question.mode {
            QuizMode::Spelling => selected.trim().to_lowercase() == question.correct_answer,
            _ => selected == question.correct_answer,
        };

        if correct {
            self.score += 1;
        } else {
            wrong_log.push(WrongQuestion {
                word: question.head_word.clone(),
                definition: question.definition.clone(),
                selected_answer: selected.to_string(),
                correct_answer: question.correct_answer.clone(),
                mode: self.config.mode,
                timestamp: now,
                question_number: question.number,
            });
        }

        let result = AnswerResult {
            correct,
            correct_answer: question.correct_answer.clone(),
        };
        self.asked.insert(question.head_word.clone());

        if self.asked.len() >= self.total || self.remaining() == 0 {
            self.finish();
        } else {
            self.state = SessionState::Answered;
        }

        Ok(result)
    }

    /// Score, progress and accuracy so far.
    pub fn summary(&self) -> QuizSummary {
        let accuracy = if self.total == 0 {
            0.0
        } else {
            (self.score as f64 / self.total as f64 * 1000.0).round() / 10.0
        };

        QuizSummary {
            score: self.score,
            total: self.total,
            asked: self.asked.len(),
            accuracy,
        }
    }

    fn remaining(&self) -> usize {
        self.pool
            .iter()
            .filter(|&&i| !self.asked.contains(&self.words[i].head_word))
            .count()
    }

    fn finish(&mut self) {
        if self.state != SessionState::Finished {
            debug!("quiz finished: {}/{} correct", self.score, self.total);
        }
        self.state = SessionState::Finished;
    }
}

fn en_to_cn(word: &WordRecord) -> (QuizMode, String, String, Option<OptionField>) {
    (
        QuizMode::EnToCn,
        word.head_word.clone(),
        word.definition.clone(),
        Some(OptionField::Definition),
    )
}

/// Correct answer plus three distinct distractors, shuffled.
fn build_options<R: Rng>(
    words: &[WordRecord],
    correct: &str,
    field: OptionField,
    rng: &mut R,
) -> Result<Vec<String>, QuizError> {
    let mut distractors: Vec<&str> = Vec::new();
    for word in words {
        let value = field.value(word);
        if !value.is_empty() && value != correct && !distractors.contains(&value) {
            distractors.push(value);
        }
    }

    if distractors.len() < DISTRACTOR_COUNT {
        return Err(QuizError::PoolQuality {
            answer: correct.to_string(),
            found: distractors.len(),
        });
    }

    distractors.shuffle(rng);

    let mut options: Vec<String> = std::iter::once(correct)
        .chain(distractors.into_iter().take(DISTRACTOR_COUNT))
        .map(String::from)
        .collect();
    options.shuffle(rng);

    Ok(options)
}
