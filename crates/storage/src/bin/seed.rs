use std::fmt;

use chrono::{DateTime, Duration, Utc};
use kotoba_core::model::{AppSetting, LessonDraft, LessonId, UserId, WordDraft, WordId};
use storage::repository::{NewLessonRecord, NewWordRecord, Storage};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    owner: UserId,
    lesson_title: String,
    admin: bool,
    flags: Vec<(String, bool)>,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingOwner,
    InvalidOwner { raw: String },
    InvalidFlag { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingOwner => write!(f, "--owner is required"),
            ArgsError::InvalidOwner { raw } => {
                write!(f, "invalid --owner value (expected UUID): {raw}")
            }
            ArgsError::InvalidFlag { raw } => {
                write!(f, "invalid --flag value (expected key=true|false): {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
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

fn parse_flag(raw: &str) -> Result<(String, bool), ArgsError> {
    let invalid = || ArgsError::InvalidFlag { raw: raw.to_owned() };
    let (key, value) = raw.split_once('=').ok_or_else(invalid)?;
    let value = value.trim().parse::<bool>().map_err(|_| invalid())?;
    if key.trim().is_empty() {
        return Err(invalid());
    }
    Ok((key.trim().to_owned(), value))
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("KOTOBA_DB_URL")
            .unwrap_or_else(|_| "sqlite:kotoba.sqlite3".into());
        let mut owner = std::env::var("KOTOBA_OWNER").ok();
        let mut lesson_title = "Привітання".to_owned();
        let mut admin = false;
        let mut flags = Vec::new();
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--owner" => owner = Some(require_value(&mut args, "--owner")?),
                "--lesson" => lesson_title = require_value(&mut args, "--lesson")?,
                "--admin" => admin = true,
                "--flag" => {
                    let value = require_value(&mut args, "--flag")?;
                    flags.push(parse_flag(&value)?);
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let raw_owner = owner.ok_or(ArgsError::MissingOwner)?;
        let owner = raw_owner
            .parse::<UserId>()
            .map_err(|_| ArgsError::InvalidOwner { raw: raw_owner.clone() })?;

        Ok(Self {
            db_url,
            owner,
            lesson_title,
            admin,
            flags,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- --owner <uuid> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:kotoba.sqlite3)");
    eprintln!("  --owner <uuid>            Account that owns the sample lesson");
    eprintln!("  --lesson <title>          Sample lesson title (default: Привітання)");
    eprintln!("  --admin                   Also grant the owner admin rights");
    eprintln!("  --flag <key=bool>         Create or reset a feature flag (repeatable)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  KOTOBA_DB_URL, KOTOBA_OWNER");
}

const SAMPLE_WORDS: [(&str, &str, Option<&str>); 5] = [
    ("こんにちは", "добрий день", None),
    ("おはよう", "доброго ранку", None),
    ("こんばんは", "добрий вечір", None),
    ("ありがとう", "дякую", None),
    ("先生", "вчитель", Some("せんせい")),
];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let lesson_id = match storage.lessons.find_lesson_by_title(&args.lesson_title).await? {
        Some(lesson) => lesson.id(),
        None => {
            let draft = LessonDraft::titled(args.lesson_title.clone())
                .with_description("Sample greetings")
                .validate(LessonId::new(0), args.owner, now)?;
            storage
                .lessons
                .insert_new_lesson(NewLessonRecord::from_lesson(&draft))
                .await?
        }
    };

    let mut added = 0_u32;
    if storage.words.count_words(lesson_id).await? == 0 {
        for (offset, (japanese, ukrainian, furigana)) in (0_i64..).zip(SAMPLE_WORDS) {
            let mut draft = WordDraft::pair(japanese, ukrainian);
            draft.furigana = furigana.map(str::to_owned);
            let word = draft.validate(WordId::new(0), lesson_id, now + Duration::seconds(offset))?;
            storage
                .words
                .insert_new_word(NewWordRecord::from_word(&word))
                .await?;
            added += 1;
        }
    }

    for (key, value) in &args.flags {
        storage
            .settings
            .insert_flag(&AppSetting::new(key.clone(), *value)?)
            .await?;
    }

    if args.admin {
        storage.settings.grant_admin(args.owner).await?;
    }

    println!(
        "Seeded lesson {} with {} new words and {} flags into {}",
        lesson_id.value(),
        added,
        args.flags.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
