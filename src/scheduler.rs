//! Fixed-ladder spaced repetition scheduler.
//!
//! A remembered word climbs one rung of [`REVIEW_INTERVALS`] per review and
//! stays on the last rung once it gets there. A forgotten word drops back to
//! the first rung. Due dates are civil dates, so every comparison in here is
//! date-only.
//!
//! Everything in this module is a pure function of its arguments; callers
//! supply `today`/`now` (see [`crate::clock`]).

use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::models::{ReviewStats, WordRecord};

/// Review intervals in days, one per rung.
pub const REVIEW_INTERVALS: [i64; 8] = [1, 2, 4, 7, 15, 30, 60, 120];

/// Number of rungs on the ladder.
pub const LADDER_LEN: usize = REVIEW_INTERVALS.len();

/// Window, in days from today, counted by [`ReviewStats::due_this_week`].
const WEEK_DAYS: i64 = 7;

/// Calculate the next review date.
///
/// Forgetting always restarts at the first rung. Remembering picks rung
/// `min(review_count, LADDER_LEN - 1)`.
pub fn calculate_next_review(review_count: u32, remembered: bool, today: NaiveDate) -> NaiveDate {
    let index = if remembered {
        (review_count as usize).min(LADDER_LEN - 1)
    } else {
        0
    };

    today + Duration::days(REVIEW_INTERVALS[index])
}

/// Mastery level (0-100) for a review count.
pub fn mastery_for(review_count: u32) -> u8 {
    let level = (review_count as f64 / LADDER_LEN as f64 * 100.0).round();
    level.min(100.0) as u8
}

/// Apply a review outcome, returning the updated record.
pub fn update_word_review(word: &WordRecord, remembered: bool, now: DateTime<Local>) -> WordRecord {
    let review_count = if remembered {
        word.review_count.saturating_add(1)
    } else {
        0
    };

    WordRecord {
        review_count,
        mastery_level: mastery_for(review_count),
        next_review_date: Some(calculate_next_review(
            review_count,
            remembered,
            now.date_naive(),
        )),
        last_review_date: Some(now),
        ..word.clone()
    }
}

/// Schedule a freshly added word for tomorrow.
///
/// Words that already have a review date come back unchanged.
pub fn init_word_review(word: &WordRecord, today: NaiveDate) -> WordRecord {
    if word.next_review_date.is_some() {
        return word.clone();
    }

    WordRecord {
        review_count: 0,
        mastery_level: 0,
        next_review_date: Some(today + Duration::days(1)),
        last_review_date: None,
        ..word.clone()
    }
}

/// Whether the word is due on or before `today`.
pub fn needs_review(word: &WordRecord, today: NaiveDate) -> bool {
    matches!(word.next_review_date, Some(due) if due <= today)
}

/// Words due for review, in collection order.
pub fn words_to_review(words: &[WordRecord], today: NaiveDate) -> Vec<&WordRecord> {
    words.iter().filter(|w| needs_review(w, today)).collect()
}

/// Bucket the collection by when each word is next due.
///
/// Words that have climbed the whole ladder count as mastered whatever their
/// date says. Unscheduled words are not counted at all.
pub fn review_stats(words: &[WordRecord], today: NaiveDate) -> ReviewStats {
    let tomorrow = today + Duration::days(1);
    let week_end = today + Duration::days(WEEK_DAYS);

    let mut stats = ReviewStats::default();

    for word in words {
        let Some(due) = word.next_review_date else {
            continue;
        };

        if word.review_count as usize >= LADDER_LEN {
            stats.mastered += 1;
        } else if due <= today {
            stats.due_today += 1;
        } else if due <= tomorrow {
            stats.due_tomorrow += 1;
        } else if due <= week_end {
            stats.due_this_week += 1;
        }
    }

    stats
}

/// Format an interval in days for display.
pub fn format_interval(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "1d".to_string(),
        d if d < 7 => format!("{}d", d),
        d if d < 30 => format!("{}w", d / 7),
        d if d < 365 => format!("{}mo", d / 30),
        d => format!("{}y", d / 365),
    }
}
