//! The word collection and the wrong-question log.
//!
//! [`Vocabulary`] keeps head words unique ignoring case and routes every
//! review outcome through the scheduler. [`WrongLog`] is append-only apart
//! from a bulk [`WrongLog::clear`].

use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDate};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    LearningStats, ReviewEvent, ReviewStats, StudyMode, WordRecord, WrongQuestion,
};
use crate::scheduler;

/// Mastery level at which a word counts towards [`LearningStats::mastered_words`].
pub const MASTERED_THRESHOLD: u8 = 80;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    #[error("the word \"{0}\" already exists")]
    DuplicateWord(String),

    #[error("a word needs a head word")]
    EmptyHeadWord,

    #[error("no word \"{0}\" in the collection")]
    WordNotFound(String),
}

/// A user's collection of words.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    words: Vec<WordRecord>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already-persisted words. Later duplicates of a head word are dropped.
    pub fn from_words(words: Vec<WordRecord>) -> Self {
        let mut seen = HashSet::new();
        let words = words
            .into_iter()
            .filter(|w| {
                let fresh = seen.insert(w.key());
                if !fresh {
                    warn!("dropping duplicate word \"{}\" (id {})", w.head_word, w.id);
                }
                fresh
            })
            .collect();
        Self { words }
    }

    pub fn words(&self) -> &[WordRecord] {
        &self.words
    }

    pub fn into_words(self) -> Vec<WordRecord> {
        self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, head_word: &str) -> bool {
        self.find(head_word).is_some()
    }

    /// Case-insensitive lookup.
    pub fn find(&self, head_word: &str) -> Option<&WordRecord> {
        let key = head_word.to_lowercase();
        self.words.iter().find(|w| w.key() == key)
    }

    fn position(&self, head_word: &str) -> Result<usize, VocabularyError> {
        let key = head_word.to_lowercase();
        self.words
            .iter()
            .position(|w| w.key() == key)
            .ok_or_else(|| VocabularyError::WordNotFound(head_word.to_string()))
    }

    /// Add a new word and schedule its first review for tomorrow.
    pub fn add_word(
        &mut self,
        mut word: WordRecord,
        today: NaiveDate,
    ) -> Result<&WordRecord, VocabularyError> {
        word.head_word = word.head_word.trim().to_string();
        if word.head_word.is_empty() {
            return Err(VocabularyError::EmptyHeadWord);
        }
        if self.contains(&word.head_word) {
            return Err(VocabularyError::DuplicateWord(word.head_word));
        }

        debug!("adding word \"{}\"", word.head_word);
        self.words.push(scheduler::init_word_review(&word, today));
        Ok(&self.words[self.words.len() - 1])
    }

    pub fn remove_word(&mut self, head_word: &str) -> Result<WordRecord, VocabularyError> {
        let index = self.position(head_word)?;
        Ok(self.words.remove(index))
    }

    /// Merge imported words, keeping existing entries on a head-word clash.
    ///
    /// Returns the number of words added.
    pub fn merge(&mut self, words: impl IntoIterator<Item = WordRecord>, today: NaiveDate) -> usize {
        let mut added = 0;
        for word in words {
            match self.add_word(word, today) {
                Ok(_) => added += 1,
                Err(e) => debug!("skipping imported word: {}", e),
            }
        }
        info!("merged {} new words", added);
        added
    }

    /// Apply a review outcome to a word.
    ///
    /// Returns the updated record and the event to append to the review
    /// history.
    pub fn record_review(
        &mut self,
        head_word: &str,
        remembered: bool,
        now: DateTime<Local>,
    ) -> Result<(&WordRecord, ReviewEvent), VocabularyError> {
        let index = self.position(head_word)?;
        let updated = scheduler::update_word_review(&self.words[index], remembered, now);
        debug!(
            "reviewed \"{}\": remembered={}, next review {:?}",
            updated.head_word, remembered, updated.next_review_date
        );
        let event = ReviewEvent::new(&updated, remembered, now).with_mode(StudyMode::Review);
        self.words[index] = updated;
        Ok((&self.words[index], event))
    }

    pub fn words_to_review(&self, today: NaiveDate) -> Vec<&WordRecord> {
        scheduler::words_to_review(&self.words, today)
    }

    pub fn review_stats(&self, today: NaiveDate) -> ReviewStats {
        scheduler::review_stats(&self.words, today)
    }

    pub fn learning_stats(&self, wrong_log: &WrongLog) -> LearningStats {
        let total_words = self.words.len();
        let mastered_words = self
            .words
            .iter()
            .filter(|w| w.mastery_level >= MASTERED_THRESHOLD)
            .count();
        let total_mastery: u64 = self.words.iter().map(|w| w.mastery_level as u64).sum();
        let average_mastery = if total_words == 0 {
            0
        } else {
            (total_mastery as f64 / total_words as f64).round() as u8
        };

        LearningStats {
            total_words,
            mastered_words,
            average_mastery,
            total_reviews: self.words.iter().map(|w| w.review_count as u64).sum(),
            wrong_words: wrong_log.wrong_words().len(),
        }
    }
}

/// Log of incorrectly answered quiz questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WrongLog {
    entries: Vec<WrongQuestion>,
}

impl WrongLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: WrongQuestion) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[WrongQuestion] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct head words that have been answered wrongly.
    pub fn wrong_words(&self) -> HashSet<String> {
        self.entries.iter().map(|e| e.word.clone()).collect()
    }

    pub fn clear(&mut self) {
        info!("clearing {} wrong-question entries", self.entries.len());
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::QuizMode;
    use chrono::{Duration, TimeZone};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn wrong(word: &str) -> WrongQuestion {
        WrongQuestion {
            word: word.to_string(),
            definition: "定义".to_string(),
            selected_answer: "x".to_string(),
            correct_answer: "y".to_string(),
            mode: QuizMode::CnToEn,
            timestamp: Local::now(),
            question_number: 1,
        }
    }

    #[test]
    fn test_add_word_schedules_tomorrow() {
        let mut vocab = Vocabulary::new();
        let word = vocab
            .add_word(WordRecord::new("  apple ", "苹果"), today())
            .unwrap();

        assert_eq!(word.head_word, "apple");
        assert_eq!(word.next_review_date, Some(today() + Duration::days(1)));
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn test_duplicate_is_case_insensitive() {
        let mut vocab = Vocabulary::new();
        vocab.add_word(WordRecord::new("Apple", "苹果"), today()).unwrap();

        let err = vocab
            .add_word(WordRecord::new("aPPLE", "苹果"), today())
            .unwrap_err();
        assert_eq!(err, VocabularyError::DuplicateWord("aPPLE".to_string()));
        assert!(vocab.contains("APPLE"));
    }

    #[test]
    fn test_empty_head_word_rejected() {
        let mut vocab = Vocabulary::new();
        assert_eq!(
            vocab.add_word(WordRecord::new("   ", "空"), today()).unwrap_err(),
            VocabularyError::EmptyHeadWord
        );
    }

    #[test]
    fn test_from_words_drops_later_duplicates() {
        let first = WordRecord::new("cat", "猫");
        let first_id = first.id.clone();
        let vocab = Vocabulary::from_words(vec![
            first,
            WordRecord::new("CAT", "猫咪"),
            WordRecord::new("dog", "狗"),
            WordRecord::new("Cat", "小猫"),
        ]);
        assert_eq!(vocab.len(), 2);
        let kept = vocab.find("cat").unwrap();
        assert_eq!(kept.definition, "猫");
        assert_eq!(kept.id, first_id);
        assert_eq!(vocab.words()[1].head_word, "dog");
    }

    #[test]
    fn test_merge_keeps_existing() {
        let mut vocab = Vocabulary::new();
        vocab.add_word(WordRecord::new("cat", "猫"), today()).unwrap();

        let added = vocab.merge(
            vec![
                WordRecord::new("Cat", "猫咪"),
                WordRecord::new("dog", "狗"),
                WordRecord::new("", "空"),
            ],
            today(),
        );

        assert_eq!(added, 1);
        assert_eq!(vocab.find("cat").unwrap().definition, "猫");
        assert!(vocab.contains("dog"));
    }

    #[test]
    fn test_record_review_updates_counters() {
        let mut vocab = Vocabulary::new();
        vocab.add_word(WordRecord::new("cat", "猫"), today()).unwrap();
        let now = Local.with_ymd_and_hms(2026, 6, 2, 9, 0, 0).unwrap();

        let (word, _) = vocab.record_review("CAT", true, now).unwrap();
        assert_eq!(word.review_count, 1);
        assert_eq!(word.mastery_level, 13);
        assert_eq!(
            word.next_review_date,
            Some(now.date_naive() + Duration::days(2))
        );

        let (word, _) = vocab.record_review("cat", false, now).unwrap();
        assert_eq!(word.review_count, 0);
        assert_eq!(word.mastery_level, 0);
    }

    #[test]
    fn test_record_review_emits_event() {
        let mut vocab = Vocabulary::new();
        let id = vocab
            .add_word(WordRecord::new("cat", "猫"), today())
            .unwrap()
            .id
            .clone();
        let now = Local.with_ymd_and_hms(2026, 6, 2, 9, 0, 0).unwrap();

        let (_, event) = vocab.record_review("Cat", false, now).unwrap();
        assert_eq!(event.word_id, id);
        assert_eq!(event.head_word, "cat");
        assert!(!event.remembered);
        assert_eq!(event.reviewed_at, now);
        assert_eq!(event.mode, Some(StudyMode::Review));
    }

    #[test]
    fn test_record_review_unknown_word() {
        let mut vocab = Vocabulary::new();
        assert_eq!(
            vocab.record_review("ghost", true, Local::now()).unwrap_err(),
            VocabularyError::WordNotFound("ghost".to_string())
        );
    }

    #[test]
    fn test_remove_word() {
        let mut vocab = Vocabulary::new();
        vocab.add_word(WordRecord::new("cat", "猫"), today()).unwrap();
        let removed = vocab.remove_word("Cat").unwrap();
        assert_eq!(removed.head_word, "cat");
        assert!(vocab.is_empty());
    }

    #[test]
    fn test_learning_stats() {
        let mut words = vec![
            WordRecord::new("cat", "猫"),
            WordRecord::new("dog", "狗"),
            WordRecord::new("bird", "鸟"),
        ];
        words[0].review_count = 8;
        words[0].mastery_level = 100;
        words[1].review_count = 7;
        words[1].mastery_level = 88;
        words[2].review_count = 1;
        words[2].mastery_level = 13;
        let vocab = Vocabulary::from_words(words);

        let mut log = WrongLog::new();
        log.push(wrong("bird"));
        log.push(wrong("bird"));
        log.push(wrong("dog"));

        let stats = vocab.learning_stats(&log);
        assert_eq!(
            stats,
            LearningStats {
                total_words: 3,
                mastered_words: 2,
                average_mastery: 67,
                total_reviews: 16,
                wrong_words: 2,
            }
        );
    }

    #[test]
    fn test_learning_stats_empty() {
        let stats = Vocabulary::new().learning_stats(&WrongLog::new());
        assert_eq!(stats, LearningStats::default());
    }

    #[test]
    fn test_wrong_log_dedupes_and_clears() {
        let mut log = WrongLog::new();
        log.push(wrong("cat"));
        log.push(wrong("cat"));
        log.push(wrong("dog"));

        assert_eq!(log.len(), 3);
        assert_eq!(log.wrong_words().len(), 2);

        log.clear();
        assert!(log.is_empty());
        assert!(log.wrong_words().is_empty());
    }
}
