use std::fmt;
use std::sync::Arc;

use api::{AppState, Config};
use kotoba_core::model::{LessonId, UserId};
use kotoba_core::quiz::{Direction, SessionConfig};
use services::{AppServices, Clock, ImportReport, parse_csv, parse_pair};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod study;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArg { what: &'static str },
    UnknownArg(String),
    InvalidLessonId { raw: String },
    InvalidOwner { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArg { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLessonId { raw } => write!(f, "invalid --lesson-id value: {raw}"),
            ArgsError::InvalidOwner { raw } => {
                write!(f, "invalid --owner value (expected UUID): {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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
    eprintln!("  kotoba serve      [--db <sqlite_url>] [--bind <addr>]");
    eprintln!("  kotoba import-csv <lesson_title> <file.csv> [--owner <uuid>] [--db <sqlite_url>]");
    eprintln!("  kotoba add-words  <lesson_title> <\"japanese - ukrainian\">...");
    eprintln!("                    [--db <sqlite_url>]");
    eprintln!("  kotoba study      --owner <uuid> --lesson-id <id> [--reverse] [--shuffle]");
    eprintln!("                    [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:kotoba.sqlite3");
    eprintln!("  --bind 127.0.0.1:3000");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  KOTOBA_DB_URL, KOTOBA_BIND_ADDR, APP_ENV, JWT_SECRET, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Serve,
    ImportCsv,
    AddWords,
    Study,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "serve" => Some(Self::Serve),
            "import-csv" => Some(Self::ImportCsv),
            "add-words" => Some(Self::AddWords),
            "study" => Some(Self::Study),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    db_url: Option<String>,
    bind_addr: Option<String>,
    owner: Option<UserId>,
    lesson_id: Option<LessonId>,
    reverse: bool,
    shuffle: bool,
    positional: Vec<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: std::env::var("KOTOBA_DB_URL").ok(),
            bind_addr: std::env::var("KOTOBA_BIND_ADDR").ok(),
            ..Self::default()
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = Some(value);
                }
                "--bind" => parsed.bind_addr = Some(require_value(args, "--bind")?),
                "--owner" => {
                    let value = require_value(args, "--owner")?;
                    let owner = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidOwner { raw: value.clone() })?;
                    parsed.owner = Some(owner);
                }
                "--lesson-id" => {
                    let value = require_value(args, "--lesson-id")?;
                    let id: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLessonId { raw: value.clone() })?;
                    parsed.lesson_id = Some(LessonId::new(id));
                }
                "--reverse" => parsed.reverse = true,
                "--shuffle" => parsed.shuffle = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => parsed.positional.push(arg),
            }
        }

        Ok(parsed)
    }

    fn owner(&self) -> Result<UserId, ArgsError> {
        self.owner.ok_or(ArgsError::MissingArg { what: "--owner" })
    }

    fn session_config(&self) -> SessionConfig {
        let direction = if self.reverse {
            Direction::UkrainianFirst
        } else {
            Direction::JapaneseFirst
        };
        SessionConfig::new(direction, self.shuffle)
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

fn print_report(report: &ImportReport) {
    if report.lesson_created {
        println!(
            "Created lesson \"{}\" (id {})",
            report.lesson_title, report.lesson_id
        );
    }
    println!(
        "Added {} of {} words to \"{}\"",
        report.added,
        report.attempted(),
        report.lesson_title
    );
    for failed in &report.failed {
        println!("  failed: {} ({})", failed.japanese, failed.reason);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "kotoba=info,api=info,services=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn open_services(db_url: &str) -> Result<AppServices, Box<dyn std::error::Error>> {
    prepare_sqlite_file(db_url)?;
    Ok(AppServices::new_sqlite(db_url, Clock::system()).await?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means serve.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Serve,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Serve,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if argv.first().is_some_and(|first| !first.starts_with("--")) {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();
    let config = Config::load()?;
    let db_url = normalize_sqlite_url(
        parsed
            .db_url
            .clone()
            .unwrap_or_else(|| config.database_url.clone()),
    );

    match cmd {
        Command::Serve => {
            let bind_addr = parsed
                .bind_addr
                .clone()
                .unwrap_or_else(|| config.bind_addr.clone());
            tracing::info!(env = %config.environment, %db_url, "starting kotoba api");
            let services = open_services(&db_url).await?;
            let state = Arc::new(AppState::new(config, services));
            api::serve(state, &bind_addr).await?;
            Ok(())
        }
        Command::ImportCsv => {
            let [title, file] = parsed.positional.as_slice() else {
                return Err(ArgsError::MissingArg {
                    what: "<lesson_title> <file.csv>",
                }
                .into());
            };
            let content = std::fs::read_to_string(file)?;
            let words = parse_csv(&content);
            let services = open_services(&db_url).await?;
            let report = services
                .import()
                .import_words(title, words, parsed.owner)
                .await?;
            print_report(&report);
            Ok(())
        }
        Command::AddWords => {
            let Some((title, pairs)) = parsed.positional.split_first() else {
                return Err(ArgsError::MissingArg {
                    what: "<lesson_title>",
                }
                .into());
            };
            if pairs.is_empty() {
                return Err(ArgsError::MissingArg {
                    what: "word pairs",
                }
                .into());
            }
            let words = pairs
                .iter()
                .map(|pair| parse_pair(pair))
                .collect::<Result<Vec<_>, _>>()?;
            let services = open_services(&db_url).await?;
            let report = services.import().add_words(title, words).await?;
            print_report(&report);
            Ok(())
        }
        Command::Study => {
            let owner = parsed.owner()?;
            let lesson_id = parsed
                .lesson_id
                .ok_or(ArgsError::MissingArg { what: "--lesson-id" })?;
            let services = open_services(&db_url).await?;
            let study_service = services.study();
            let mut flow = study_service.study_flow(owner, lesson_id).await?;

            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            study::run_study(
                &mut flow,
                parsed.session_config(),
                study_service.clock(),
                &mut stdin.lock(),
                &mut stdout.lock(),
            )
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(&mut args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn study_flags_build_session_config() {
        let args = parse(&["--lesson-id", "4", "--reverse", "--shuffle"]).unwrap();
        assert_eq!(args.lesson_id, Some(LessonId::new(4)));
        assert_eq!(
            args.session_config(),
            SessionConfig::new(Direction::UkrainianFirst, true)
        );
    }

    #[test]
    fn positionals_are_collected_in_order() {
        let args = parse(&["Привітання", "犬 - собака", "猫 - кіт"]).unwrap();
        assert_eq!(args.positional, ["Привітання", "犬 - собака", "猫 - кіт"]);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            parse(&["--lesson-id", "abc"]),
            Err(ArgsError::InvalidLessonId { .. })
        ));
        assert!(matches!(
            parse(&["--owner", "nobody"]),
            Err(ArgsError::InvalidOwner { .. })
        ));
        assert!(matches!(
            parse(&["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(parse(&["--verbose"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn sqlite_urls_are_made_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/k.db".into()),
            "sqlite:///tmp/k.db"
        );
        assert_eq!(normalize_sqlite_url("sqlite:/tmp/k.db".into()), "sqlite:///tmp/k.db");
        assert!(normalize_sqlite_url("k.db".into()).ends_with("/k.db"));
    }
}
