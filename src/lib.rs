//! Vocabulary spaced repetition.
//!
//! [`scheduler`] moves words along a fixed review ladder, [`quiz`] runs
//! multiple-choice and spelling quizzes over a collection. Both work on
//! in-memory records; [`storage`] is how the CLI keeps them between runs.

pub mod clock;
pub mod config;
pub mod models;
pub mod quiz;
pub mod scheduler;
pub mod storage;
pub mod vocabulary;

pub use models::{LearningStats, ReviewEvent, ReviewStats, StudyMode, WordRecord, WrongQuestion};
pub use quiz::{QuizConfig, QuizError, QuizMode, QuizSession};
pub use vocabulary::{Vocabulary, VocabularyError, WrongLog};
