//! Data models for vocabulary words and the wrong-question log.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::quiz::QuizMode;

/// A single vocabulary entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub id: String,
    pub head_word: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default)]
    pub sentences: Vec<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,

    // Review state
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub mastery_level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review_date: Option<DateTime<Local>>,

    pub created_at: DateTime<Local>,
}

impl WordRecord {
    pub fn new(head_word: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string()[..8].to_string(),
            head_word: head_word.into(),
            definition: definition.into(),
            pronunciation: None,
            sentences: Vec::new(),
            synonyms: Vec::new(),
            review_count: 0,
            mastery_level: 0,
            next_review_date: None,
            last_review_date: None,
            created_at: Local::now(),
        }
    }

    pub fn with_pronunciation(mut self, pronunciation: impl Into<String>) -> Self {
        self.pronunciation = Some(pronunciation.into());
        self
    }

    pub fn with_sentence(mut self, sentence: impl Into<String>) -> Self {
        self.sentences.push(sentence.into());
        self
    }

    pub fn with_synonym(mut self, synonym: impl Into<String>) -> Self {
        self.synonyms.push(synonym.into());
        self
    }

    /// Lower-cased head word, the collection's uniqueness key.
    pub fn key(&self) -> String {
        self.head_word.to_lowercase()
    }

    pub fn is_new(&self) -> bool {
        self.next_review_date.is_none()
    }
}

/// A logged incorrect quiz answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrongQuestion {
    pub word: String,
    pub definition: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub mode: QuizMode,
    pub timestamp: DateTime<Local>,
    /// 1-based position of the question within its session.
    pub question_number: usize,
}

/// How a word was being studied when an outcome was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
    Learn,
    Review,
    Test,
}

/// One remembered/forgotten outcome, kept as review history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    pub word_id: String,
    pub head_word: String,
    pub remembered: bool,
    pub reviewed_at: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<StudyMode>,
}

impl ReviewEvent {
    pub fn new(word: &WordRecord, remembered: bool, reviewed_at: DateTime<Local>) -> Self {
        Self {
            word_id: word.id.clone(),
            head_word: word.head_word.clone(),
            remembered,
            reviewed_at,
            mode: None,
        }
    }

    pub fn with_mode(mut self, mode: StudyMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Counts of upcoming reviews, see [`crate::scheduler::review_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub due_today: usize,
    pub due_tomorrow: usize,
    pub due_this_week: usize,
    pub mastered: usize,
}

/// Overall learning statistics for a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    pub total_words: usize,
    /// Words with a mastery level of at least 80.
    pub mastered_words: usize,
    pub average_mastery: u8,
    pub total_reviews: u64,
    pub wrong_words: usize,
}
