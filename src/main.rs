//! vocab - spaced repetition vocabulary trainer
//!
//! Add words, review the ones that are due and quiz yourself from the terminal.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use vocab_srs::clock::{Clock, SystemClock};
use vocab_srs::config::Config;
use vocab_srs::quiz::{QuizConfig, QuizMode, QuizSession};
use vocab_srs::scheduler;
use vocab_srs::storage::{JsonRepository, Repository};
use vocab_srs::{ReviewEvent, WordRecord};

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "vocab")]
#[command(author, version, about = "Spaced repetition vocabulary trainer", long_about = None)]
struct Args {
    /// Directory holding words.json, wrong_questions.json and reviews.json
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a word to the collection
    Add {
        word: String,
        definition: String,
        #[arg(short, long)]
        pronunciation: Option<String>,
        /// Example sentence (repeatable)
        #[arg(short, long = "sentence")]
        sentences: Vec<String>,
        /// Synonym (repeatable)
        #[arg(long = "synonym")]
        synonyms: Vec<String>,
    },
    /// Remove a word
    Remove { word: String },
    /// List all words with their review state
    List,
    /// Review the words that are due today
    Review,
    /// Take a quiz
    Quiz {
        /// en-to-cn, cn-to-en, fill-blank or spelling
        #[arg(short, long)]
        mode: Option<QuizMode>,
        #[arg(short, long)]
        quantity: Option<usize>,
        /// Only ask words from the wrong-question log
        #[arg(short, long)]
        wrong_only: bool,
        /// Seed for reproducible question order
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show review and learning statistics
    Stats,
    /// Show the wrong-question log
    Wrong {
        /// Empty the log
        #[arg(long)]
        clear: bool,
    },
    /// Show or change the saved settings
    Config {
        /// Data directory to use when --data-dir is not given
        #[arg(long)]
        set_data_dir: Option<PathBuf>,
        /// Default quiz mode
        #[arg(short, long)]
        mode: Option<QuizMode>,
        /// Default number of quiz questions
        #[arg(short, long)]
        quantity: Option<usize>,
        /// Quiz only wrongly answered words by default
        #[arg(long)]
        wrong_only: Option<bool>,
    },
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("ignoring unreadable config: {:#}", e);
        Config::default()
    });

    // Determine data directory
    let data_dir = args
        .data_dir
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(JsonRepository::default_path);
    let repo = JsonRepository::new(data_dir)?;
    let clock = SystemClock;

    match args.command {
        Command::Add {
            word,
            definition,
            pronunciation,
            sentences,
            synonyms,
        } => {
            let mut record = WordRecord::new(word, definition);
            record.pronunciation = pronunciation;
            record.sentences = sentences;
            record.synonyms = synonyms;
            add_word(&repo, &clock, record)
        }
        Command::Remove { word } => remove_word(&repo, &word),
        Command::List => list_words(&repo, &clock),
        Command::Review => run_review(&repo, &clock, io::stdin().lock()),
        Command::Quiz {
            mode,
            quantity,
            wrong_only,
            seed,
        } => {
            let mut quiz = QuizConfig::from(&config.quiz);
            if let Some(mode) = mode {
                quiz.mode = mode;
            }
            if let Some(quantity) = quantity {
                quiz.quantity = quantity;
            }
            quiz.use_wrong_only |= wrong_only;

            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            run_quiz(&repo, &clock, quiz, rng)
        }
        Command::Stats => show_stats(&repo, &clock),
        Command::Wrong { clear } => show_wrong(&repo, clear),
        Command::Config {
            set_data_dir,
            mode,
            quantity,
            wrong_only,
        } => update_config(set_data_dir, mode, quantity, wrong_only),
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Commands
// ══════════════════════════════════════════════════════════════════════════

fn add_word(repo: &impl Repository, clock: &impl Clock, record: WordRecord) -> Result<()> {
    let mut vocab = repo.load_vocabulary()?;
    let added = vocab.add_word(record, clock.today())?;
    println!(
        "✓ Added '{}' (first review {})",
        added.head_word,
        added
            .next_review_date
            .map(|d| d.to_string())
            .unwrap_or_default()
    );
    repo.save_vocabulary(&vocab)
}

fn remove_word(repo: &impl Repository, word: &str) -> Result<()> {
    let mut vocab = repo.load_vocabulary()?;
    let removed = vocab.remove_word(word)?;
    repo.save_vocabulary(&vocab)?;
    println!("✓ Removed '{}'", removed.head_word);
    Ok(())
}

fn list_words(repo: &impl Repository, clock: &impl Clock) -> Result<()> {
    let vocab = repo.load_vocabulary()?;
    if vocab.is_empty() {
        println!("No words yet. Add one with `vocab add <word> <definition>`.");
        return Ok(());
    }

    let today = clock.today();
    for word in vocab.words() {
        let due = match word.next_review_date {
            Some(date) => {
                let days = (date - today).num_days();
                if days <= 0 {
                    "due".to_string()
                } else {
                    format!("in {}", scheduler::format_interval(days))
                }
            }
            None => "-".to_string(),
        };
        println!(
            "{:<20} {:>3}%  {:<8} {}",
            word.head_word, word.mastery_level, due, word.definition
        );
    }
    Ok(())
}

fn run_review(repo: &impl Repository, clock: &impl Clock, input: impl BufRead) -> Result<()> {
    let mut vocab = repo.load_vocabulary()?;
    let due: Vec<String> = vocab
        .words_to_review(clock.today())
        .into_iter()
        .map(|w| w.head_word.clone())
        .collect();

    if due.is_empty() {
        println!("Nothing to review today.");
        return Ok(());
    }

    let mut lines = input.lines();
    let mut events: Vec<ReviewEvent> = Vec::new();

    'words: for head_word in &due {
        println!("\n{}", head_word);
        let answer = prompt(&mut lines, "Press enter to show the definition (q to stop): ")?;
        if answer.as_deref() == Some("q") || answer.is_none() {
            break;
        }

        if let Some(word) = vocab.find(head_word) {
            println!("  {}", word.definition);
            if let Some(sentence) = word.sentences.first() {
                println!("  e.g. {}", sentence);
            }
        }

        let remembered = loop {
            match prompt(&mut lines, "Remembered? [y/n]: ")?.as_deref() {
                Some("y") | Some("Y") => break true,
                Some("n") | Some("N") => break false,
                // Input closed mid-word: keep what was already reviewed.
                None => break 'words,
                _ => continue,
            }
        };

        let (word, event) = vocab.record_review(head_word, remembered, clock.now())?;
        if let Some(next) = word.next_review_date {
            println!("  next review {}", next);
        }
        events.push(event);
    }

    repo.save_vocabulary(&vocab)?;
    repo.append_review_events(&events)?;
    info!("reviewed {} of {} due words", events.len(), due.len());
    println!("\n✓ Reviewed {} word(s)", events.len());
    Ok(())
}

fn run_quiz(
    repo: &impl Repository,
    clock: &impl Clock,
    config: QuizConfig,
    rng: StdRng,
) -> Result<()> {
    let vocab = repo.load_vocabulary()?;
    let mut wrong_log = repo.load_wrong_log()?;
    let mut session = QuizSession::start(vocab.words(), &wrong_log, config, rng)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while let Some(question) = session.next_question()? {
        println!("\n[{}/{}] {}", question.number, session.total(), question.prompt);

        let selected = if question.options.is_empty() {
            match prompt(&mut lines, "Spell it: ")? {
                Some(answer) => answer,
                None => break,
            }
        } else {
            for (i, option) in question.options.iter().enumerate() {
                println!("  {}. {}", i + 1, option);
            }
            match read_choice(&mut lines, question.options.len())? {
                Some(i) => question.options[i].clone(),
                None => break,
            }
        };

        let result = session.submit_answer(&selected, &mut wrong_log, clock.now())?;
        if result.correct {
            println!("✓ Correct");
        } else {
            println!("✗ The answer is: {}", result.correct_answer);
        }

        if session.is_finished() {
            break;
        }
    }

    repo.save_wrong_log(&wrong_log)?;

    let summary = session.summary();
    println!(
        "\nScore: {}/{} ({:.1}%)",
        summary.score, summary.total, summary.accuracy
    );
    Ok(())
}

fn show_stats(repo: &impl Repository, clock: &impl Clock) -> Result<()> {
    let vocab = repo.load_vocabulary()?;
    let wrong_log = repo.load_wrong_log()?;
    let review = vocab.review_stats(clock.today());
    let learning = vocab.learning_stats(&wrong_log);

    println!("Words:          {}", learning.total_words);
    println!("Mastered:       {}", learning.mastered_words);
    println!("Avg. mastery:   {}%", learning.average_mastery);
    println!("Total reviews:  {}", learning.total_reviews);
    println!("Wrong words:    {}", learning.wrong_words);
    println!();
    println!("Due today:      {}", review.due_today);
    println!("Due tomorrow:   {}", review.due_tomorrow);
    println!("Due this week:  {}", review.due_this_week);
    println!("Ladder done:    {}", review.mastered);
    Ok(())
}

fn show_wrong(repo: &impl Repository, clear: bool) -> Result<()> {
    let mut wrong_log = repo.load_wrong_log()?;

    if clear {
        wrong_log.clear();
        repo.save_wrong_log(&wrong_log)?;
        println!("✓ Wrong-question log cleared");
        return Ok(());
    }

    if wrong_log.is_empty() {
        println!("No wrong answers recorded.");
        return Ok(());
    }

    for entry in wrong_log.entries() {
        println!(
            "{}  {:<10} {:<16} picked '{}', answer '{}'",
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.mode,
            entry.word,
            entry.selected_answer,
            entry.correct_answer
        );
    }
    Ok(())
}

fn update_config(
    data_dir: Option<PathBuf>,
    mode: Option<QuizMode>,
    quantity: Option<usize>,
    wrong_only: Option<bool>,
) -> Result<()> {
    // Unlike the other commands, refuse to overwrite a config we cannot read.
    let mut config = Config::load()?;

    if config.update(data_dir, mode, quantity, wrong_only) {
        config.save()?;
        println!("✓ Saved {:?}", Config::default_path());
    }

    let shown = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    print!("{}", shown);
    Ok(())
}

// ══════════════════════════════════════════════════════════════════════════
// Input helpers
// ══════════════════════════════════════════════════════════════════════════

/// Print `message` and read one trimmed line. `None` on end of input.
fn prompt<B: BufRead>(lines: &mut io::Lines<B>, message: &str) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;

    match lines.next() {
        Some(line) => Ok(Some(line.context("Failed to read input")?.trim().to_string())),
        None => Ok(None),
    }
}

/// Read a 1-based option number until a valid one is entered.
fn read_choice<B: BufRead>(lines: &mut io::Lines<B>, count: usize) -> Result<Option<usize>> {
    loop {
        let Some(input) = prompt(lines, &format!("Choose 1-{}: ", count))? else {
            return Ok(None);
        };
        match input.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
            _ => println!("Please enter a number between 1 and {}.", count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate, TimeZone};
    use vocab_srs::clock::FixedClock;
    use vocab_srs::storage::MemoryRepository;

    fn due_repo(clock: &FixedClock) -> MemoryRepository {
        let yesterday = clock.today() - chrono::Duration::days(1);
        let words: Vec<WordRecord> = ["cat", "dog"]
            .into_iter()
            .map(|w| {
                let mut word = WordRecord::new(w, "定义");
                word.next_review_date = Some(yesterday);
                word
            })
            .collect();

        let repo = MemoryRepository::new();
        repo.save_words(&words).unwrap();
        repo
    }

    #[test]
    fn test_review_saves_progress_when_input_closes() {
        let clock = FixedClock(Local.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap());
        let repo = due_repo(&clock);

        // "cat" is answered, then input ends at the "Remembered?" prompt for "dog".
        run_review(&repo, &clock, "\ny\n\n".as_bytes()).unwrap();

        let vocab = repo.load_vocabulary().unwrap();
        let cat = vocab.find("cat").unwrap();
        assert_eq!(cat.review_count, 1);
        assert_eq!(cat.next_review_date, NaiveDate::from_ymd_opt(2026, 6, 3));
        assert_eq!(vocab.find("dog").unwrap().review_count, 0);

        let events = repo.load_review_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].head_word, "cat");
        assert!(events[0].remembered);
    }

    #[test]
    fn test_review_quit_keeps_answered_words() {
        let clock = FixedClock(Local.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap());
        let repo = due_repo(&clock);

        run_review(&repo, &clock, "\nn\nq\n".as_bytes()).unwrap();

        let vocab = repo.load_vocabulary().unwrap();
        let cat = vocab.find("cat").unwrap();
        assert_eq!(cat.review_count, 0);
        assert!(cat.last_review_date.is_some());
        assert!(vocab.find("dog").unwrap().last_review_date.is_none());
        assert_eq!(repo.load_review_events().unwrap().len(), 1);
    }
}
