use std::fmt;
use std::sync::Arc;

use mpt_core::catalog::{self, QuizSubject};
use mpt_core::model::{QuestionId, QuestionStatus, SessionResult};
use mpt_core::scoring::ScoreBand;
use services::{
    AppServices, Clock, GenerationConfig, Notice, NoticeLevel, QuizEvents, QuizSessionController,
    QuizError, QuizSnapshot, QuizState, SessionHistoryService, StartOutcome,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { what: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidApiUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidApiUrl { raw } => write!(f, "invalid --api value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  mpt subjects [query]");
    eprintln!("  mpt quiz <subject-slug>          [--db <sqlite_url>] [--api <base_url>]");
    eprintln!("  mpt history                      [--db <sqlite_url>]");
    eprintln!("  mpt history delete <timestamp>   [--db <sqlite_url>]");
    eprintln!("  mpt history clear                [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db  sqlite://mpt.sqlite3");
    eprintln!("  --api {}", services::generation::DEFAULT_BASE_URL);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MPT_DB_URL, MPT_API_BASE_URL, MPT_API_TIMEOUT_SECS, RUST_LOG");
}

fn print_quiz_help() {
    println!("Commands:");
    println!("  <question> <option>   select an option, e.g. `3 b` or `3 2`");
    println!("  show                  print the questions again");
    println!("  score                 submit your answers");
    println!("  next | retry          load a new set for this subject");
    println!("  quit                  leave the quiz");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HistoryAction {
    List,
    Delete(String),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Subjects { query: String },
    Quiz { slug: String },
    History(HistoryAction),
}

struct Args {
    command: Command,
    db_url: String,
    generation: GenerationConfig,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut args = args.into_iter();
        let mut db_url = std::env::var("MPT_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| "sqlite://mpt.sqlite3".into(), normalize_sqlite_url);
        let mut generation = GenerationConfig::from_env();
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--api" => {
                    let value = require_value(&mut args, "--api")?;
                    generation = generation.with_base_url(value.clone());
                    if generation.endpoint().is_err() {
                        return Err(ArgsError::InvalidApiUrl { raw: value });
                    }
                }
                "--help" | "-h" => return Ok(None),
                other if other.starts_with("--") => {
                    return Err(ArgsError::UnknownArg(other.to_string()));
                }
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let command = match positional.next().as_deref() {
            None => return Ok(None),
            Some("subjects") => Command::Subjects {
                query: positional.by_ref().collect::<Vec<_>>().join(" "),
            },
            Some("quiz") => {
                let slug = positional.next().ok_or(ArgsError::MissingArgument {
                    what: "subject slug",
                })?;
                Command::Quiz { slug }
            }
            Some("history") => match positional.next().as_deref() {
                None | Some("list") => Command::History(HistoryAction::List),
                Some("clear") => Command::History(HistoryAction::Clear),
                Some("delete") => {
                    let stamp = positional.next().ok_or(ArgsError::MissingArgument {
                        what: "timestamp",
                    })?;
                    Command::History(HistoryAction::Delete(stamp))
                }
                Some(other) => return Err(ArgsError::UnknownArg(other.to_string())),
            },
            Some(other) => return Err(ArgsError::UnknownArg(other.to_string())),
        };

        if let Some(extra) = positional.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Some(Self {
            command,
            db_url,
            generation,
        }))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Prints controller notices to the terminal.
struct ConsoleEvents;

impl QuizEvents for ConsoleEvents {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => println!("{}", notice.message),
        }
    }

    fn celebrate(&self, result: &SessionResult) {
        let totals = result.totals();
        println!(
            "*** Well done! {} of {} right in {} ***",
            totals.right,
            totals.total(),
            result.subject()
        );
    }
}

fn print_subjects(query: &str) {
    let matches = catalog::search(query);
    if matches.is_empty() {
        println!("No subjects match {query:?}.");
        return;
    }
    let mut current_group = "";
    for (group, subject) in matches {
        if group.name != current_group {
            println!("{} ({})", group.title, group.description);
            current_group = group.name;
        }
        println!("  {:<24} {}", subject.slug, subject.name);
    }
}

fn option_label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'a'.checked_add(i))
        .filter(u8::is_ascii_lowercase)
        .map_or('?', char::from)
}

fn parse_option(raw: &str) -> Option<usize> {
    if let Ok(n) = raw.parse::<usize>() {
        return n.checked_sub(1);
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            Some(usize::from(c.to_ascii_lowercase() as u8 - b'a'))
        }
        _ => None,
    }
}

fn print_questions(snapshot: &QuizSnapshot) {
    for (n, question) in snapshot.questions.iter().enumerate() {
        let selected = snapshot.answers.selected(question.id());
        let status = snapshot.result.as_ref().map(|r| r.status_of(question.id()));
        let marker = match status {
            Some(QuestionStatus::Correct) => " [correct]",
            Some(QuestionStatus::Wrong) => " [wrong]",
            Some(QuestionStatus::Empty) => " [not answered]",
            None => "",
        };
        println!("{}. {}{marker}", n + 1, question.statement());
        for (i, option) in question.options().iter().enumerate() {
            let chosen = if selected == Some(i) { ">" } else { " " };
            let correct = if status.is_some() && i == question.correct_option_index() {
                " (answer)"
            } else {
                ""
            };
            println!("   {chosen} {}) {option}{correct}", option_label(i));
        }
    }
    let progress = snapshot.progress();
    println!(
        "Answered {}/{} ({}%)",
        progress.answered,
        progress.total,
        progress.percent()
    );
}

fn print_result(result: &SessionResult) {
    let totals = result.totals();
    println!(
        "Right: {}  Wrong: {}  Not answered: {}  Score: {}% ({})",
        totals.right,
        totals.wrong,
        totals.empty,
        totals.percent(),
        band_label(totals.band())
    );
}

fn band_label(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::High => "excellent",
        ScoreBand::Medium => "good",
        ScoreBand::Low => "keep practicing",
    }
}

fn load_set(quiz: &QuizSessionController, outcome: StartOutcome) {
    if let StartOutcome::Ready { question_count } = outcome {
        if question_count == 0 {
            println!("The generator returned no questions. Type `retry` to try again.");
        } else {
            print_questions(&quiz.snapshot());
        }
    }
}

/// Interactive loop over stdin. Lines are commands; see `print_quiz_help`.
async fn run_quiz(
    quiz: Arc<QuizSessionController>,
    subject: QuizSubject,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Generating {} questions for {}...",
        quiz.settings().question_count,
        subject.name
    );
    match quiz.start(subject).await {
        Ok(outcome) => load_set(&quiz, outcome),
        Err(err @ QuizError::BlankSubject) => return Err(err.into()),
        Err(err) => log::debug!("start failed: {err}"),
    }
    print_quiz_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut words = line.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (None, _, _) => {}
            (Some("quit" | "exit" | "q"), None, _) => break,
            (Some("help" | "?"), None, _) => print_quiz_help(),
            (Some("show"), None, _) => print_questions(&quiz.snapshot()),
            (Some("score"), None, _) => match quiz.score().await {
                Ok(result) => {
                    print_questions(&quiz.snapshot());
                    print_result(&result);
                    println!("Type `next` for a new set or `quit` to leave.");
                }
                Err(err) => eprintln!("{err}"),
            },
            (Some("next" | "retry"), None, _) => {
                let previous = quiz.state();
                let action = if previous == QuizState::Scored {
                    quiz.next().await
                } else {
                    quiz.retry().await
                };
                match action {
                    Ok(outcome) => load_set(&quiz, outcome),
                    Err(err) => log::debug!("reload failed: {err}"),
                }
            }
            (Some(number), Some(option), None) => {
                let snapshot = quiz.snapshot();
                let target = number
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|n| snapshot.questions.get(n))
                    .map(|q| q.id());
                let (Some(id), Some(option)) = (target, parse_option(option)) else {
                    eprintln!("usage: <question number> <option letter or number>");
                    continue;
                };
                answer(&quiz, id, option);
            }
            _ => eprintln!("unrecognized command; type `help`"),
        }
    }
    Ok(())
}

fn answer(quiz: &QuizSessionController, id: QuestionId, option: usize) {
    match quiz.set_answer(id, option) {
        Ok(true) => {
            let progress = quiz.snapshot().progress();
            println!("Answered {}/{}", progress.answered, progress.total);
        }
        Ok(false) if quiz.state() == QuizState::Scored => {
            println!("This set is already scored. Type `next` for a new one.");
        }
        Ok(false) => eprintln!("no such option"),
        Err(err) => eprintln!("{err}"),
    }
}

async fn run_history(
    history: &SessionHistoryService,
    action: HistoryAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        HistoryAction::List => {
            let items = history.list().await?;
            if items.is_empty() {
                println!("No sessions yet.");
            }
            for item in items {
                let subject = match &item.group {
                    Some(group) => format!("{} / {}", group, item.subject),
                    None => item.subject.clone(),
                };
                println!(
                    "{}  {:<40} {:>2}/{:<2} {:>3}% {}",
                    item.timestamp.to_rfc3339(),
                    subject,
                    item.totals.right,
                    item.totals.total(),
                    item.percent,
                    band_label(item.band)
                );
            }
        }
        HistoryAction::Delete(raw) => {
            if history.remove_by_str(&raw).await? {
                println!("Deleted session {raw}.");
            } else {
                println!("No session recorded at {raw}.");
            }
        }
        HistoryAction::Clear => {
            history.clear().await?;
            println!("History cleared.");
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = match Args::parse(std::env::args().skip(1)) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    if let Command::Subjects { query } = &parsed.command {
        print_subjects(query);
        return Ok(());
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let app = AppServices::new_sqlite(
        &parsed.db_url,
        Clock::system(),
        &parsed.generation,
        Arc::new(ConsoleEvents),
    )
    .await?;
    log::info!("using {}", parsed.db_url);

    match parsed.command {
        Command::Subjects { .. } => Ok(()),
        Command::Quiz { slug } => run_quiz(app.quiz(), QuizSubject::from_slug(&slug)).await,
        Command::History(action) => run_history(&app.history(), action).await,
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        Args::parse(args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn parses_quiz_with_flags() {
        let args = parse(&["quiz", "algebra", "--db", "sqlite::memory:", "--api", "http://api.test"])
            .unwrap()
            .unwrap();
        assert_eq!(
            args.command,
            Command::Quiz {
                slug: "algebra".into()
            }
        );
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(
            args.generation.endpoint().unwrap().as_str(),
            "http://api.test/api/generate-mcqs"
        );
    }

    #[test]
    fn parses_history_actions() {
        let delete = parse(&["history", "delete", "2024-01-01T00:00:00Z"])
            .unwrap()
            .unwrap();
        assert_eq!(
            delete.command,
            Command::History(HistoryAction::Delete("2024-01-01T00:00:00Z".into()))
        );
        let clear = parse(&["history", "clear"]).unwrap().unwrap();
        assert_eq!(clear.command, Command::History(HistoryAction::Clear));
        let list = parse(&["history"]).unwrap().unwrap();
        assert_eq!(list.command, Command::History(HistoryAction::List));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(matches!(
            parse(&["quiz"]),
            Err(ArgsError::MissingArgument { .. })
        ));
        assert!(matches!(
            parse(&["quiz", "algebra", "--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(parse(&["launch"]), Err(ArgsError::UnknownArg(_))));
        assert!(matches!(
            parse(&["quiz", "algebra", "--api", "nope"]),
            Err(ArgsError::InvalidApiUrl { .. })
        ));
        assert!(parse(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn option_letters_and_numbers() {
        assert_eq!(parse_option("a"), Some(0));
        assert_eq!(parse_option("D"), Some(3));
        assert_eq!(parse_option("2"), Some(1));
        assert_eq!(parse_option("0"), None);
        assert_eq!(parse_option("ab"), None);
        assert_eq!(option_label(2), 'c');
    }
}
