//! Persistence for the word collection, the wrong-question log and the
//! review history.
//!
//! The scheduler and quiz engine never touch storage themselves; callers load
//! through a [`Repository`], run the core, and save the results back.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{ReviewEvent, WordRecord};
use crate::vocabulary::{Vocabulary, WrongLog};

const WORDS_FILE: &str = "words.json";
const WRONG_QUESTIONS_FILE: &str = "wrong_questions.json";
const REVIEWS_FILE: &str = "reviews.json";

/// Where words and wrong answers are kept between runs.
pub trait Repository {
    fn load_words(&self) -> Result<Vec<WordRecord>>;
    fn save_words(&self, words: &[WordRecord]) -> Result<()>;
    fn load_wrong_log(&self) -> Result<WrongLog>;
    fn save_wrong_log(&self, log: &WrongLog) -> Result<()>;

    /// Review history, oldest first.
    fn load_review_events(&self) -> Result<Vec<ReviewEvent>>;
    /// Add events to the end of the review history.
    fn append_review_events(&self, events: &[ReviewEvent]) -> Result<()>;

    fn load_vocabulary(&self) -> Result<Vocabulary> {
        Ok(Vocabulary::from_words(self.load_words()?))
    }

    fn save_vocabulary(&self, vocabulary: &Vocabulary) -> Result<()> {
        self.save_words(vocabulary.words())
    }
}

/// Keeps everything in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    words: RefCell<Vec<WordRecord>>,
    wrong_log: RefCell<WrongLog>,
    review_events: RefCell<Vec<ReviewEvent>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository for MemoryRepository {
    fn load_words(&self) -> Result<Vec<WordRecord>> {
        Ok(self.words.borrow().clone())
    }

    fn save_words(&self, words: &[WordRecord]) -> Result<()> {
        *self.words.borrow_mut() = words.to_vec();
        Ok(())
    }

    fn load_wrong_log(&self) -> Result<WrongLog> {
        Ok(self.wrong_log.borrow().clone())
    }

    fn save_wrong_log(&self, log: &WrongLog) -> Result<()> {
        *self.wrong_log.borrow_mut() = log.clone();
        Ok(())
    }

    fn load_review_events(&self) -> Result<Vec<ReviewEvent>> {
        Ok(self.review_events.borrow().clone())
    }

    fn append_review_events(&self, events: &[ReviewEvent]) -> Result<()> {
        self.review_events.borrow_mut().extend_from_slice(events);
        Ok(())
    }
}

/// JSON files in a local data directory.
pub struct JsonRepository {
    data_dir: PathBuf,
}

impl JsonRepository {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

        Ok(Self { data_dir })
    }

    /// Get default storage location.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocab-srs")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn words_path(&self) -> PathBuf {
        self.data_dir.join(WORDS_FILE)
    }

    fn wrong_questions_path(&self) -> PathBuf {
        self.data_dir.join(WRONG_QUESTIONS_FILE)
    }

    fn reviews_path(&self) -> PathBuf {
        self.data_dir.join(REVIEWS_FILE)
    }
}

fn read_json<T: serde::de::DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        debug!("{:?} does not exist yet, starting empty", path);
        return Ok(T::default());
    }

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {:?}", path))
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).with_context(|| "Failed to serialize data")?;

    // Write next to the target and rename so a crash never leaves half a file.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("Failed to write {:?}", tmp))?;
    if let Err(e) = fs::rename(&tmp, path) {
        warn!("rename {:?} -> {:?} failed: {}", tmp, path, e);
        return Err(e).with_context(|| format!("Failed to replace {:?}", path));
    }

    Ok(())
}

impl Repository for JsonRepository {
    fn load_words(&self) -> Result<Vec<WordRecord>> {
        read_json(&self.words_path())
    }

    fn save_words(&self, words: &[WordRecord]) -> Result<()> {
        debug!("saving {} words to {:?}", words.len(), self.words_path());
        write_json(&self.words_path(), words)
    }

    fn load_wrong_log(&self) -> Result<WrongLog> {
        read_json(&self.wrong_questions_path())
    }

    fn save_wrong_log(&self, log: &WrongLog) -> Result<()> {
        write_json(&self.wrong_questions_path(), log)
    }

    fn load_review_events(&self) -> Result<Vec<ReviewEvent>> {
        read_json(&self.reviews_path())
    }

    fn append_review_events(&self, events: &[ReviewEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut history = self.load_review_events()?;
        history.extend_from_slice(events);
        debug!("appending {} review events to {:?}", events.len(), self.reviews_path());
        write_json(&self.reviews_path(), &history)
    }
}
