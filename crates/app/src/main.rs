use std::fmt;

use chrono::Duration;
use restart_core::model::{CourseId, CoursePlan, QuestionId, Recommendation};
use restart_core::{EngineSettings, SettingsError};
use services::{Clock, LearningService, LearningServiceError};
use storage::{Storage, seed};
use tracing::info;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidEnv { var: &'static str, raw: String },
    Settings(SettingsError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidEnv { var, raw } => write!(f, "invalid {var} value: {raw}"),
            ArgsError::Settings(err) => write!(f, "invalid settings: {err}"),
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
    eprintln!("  cargo run -p app -- [--user <name>] [--email <addr>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --user Demo Learner");
    eprintln!("  --email demo@example.com");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LEARN_STALE_AFTER_DAYS, LEARN_LOW_CONFIDENCE, LEARN_LESSON_XP, RUST_LOG");
}

struct Args {
    user: String,
    email: String,
    settings: EngineSettings,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut user = "Demo Learner".to_string();
        let mut email = "demo@example.com".to_string();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--user" => user = require_value(args, "--user")?,
                "--email" => email = require_value(args, "--email")?,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            user,
            email,
            settings: settings_from_env()?,
        })
    }
}

fn env_override<T: std::str::FromStr>(
    var: &'static str,
    default: T,
) -> Result<T, ArgsError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ArgsError::InvalidEnv { var, raw }),
        Err(_) => Ok(default),
    }
}

fn settings_from_env() -> Result<EngineSettings, ArgsError> {
    let defaults = EngineSettings::default();
    EngineSettings::new(
        env_override("LEARN_STALE_AFTER_DAYS", defaults.stale_after_days())?,
        env_override("LEARN_LOW_CONFIDENCE", defaults.low_confidence_threshold())?,
        env_override("LEARN_LESSON_XP", defaults.lesson_xp())?,
        defaults.quiz_answer_xp(),
        defaults.recap_card_xp(),
    )
    .map_err(ArgsError::Settings)
}

fn show(label: &str, rec: Option<&Recommendation>) {
    match rec {
        Some(rec) => println!(
            "[{label}] {} - {} ({} -> {})",
            rec.title, rec.reason, rec.action_label, rec.route
        ),
        None => println!("[{label}] nothing to recommend"),
    }
}

async fn drain_feedback(svc: &LearningService) -> Result<(), LearningServiceError> {
    while let Some(celebration) = svc.next_celebration().await? {
        println!("  {celebration}");
    }
    while let Some(badge) = svc.next_unlock().await? {
        println!("  {} {} - {}", badge.icon, badge.name, badge.description);
    }
    Ok(())
}

/// Scripted session: first visit, two lessons and a shaky quiz, then a
/// return after five days away.
async fn replay(args: &Args, storage: &Storage) -> Result<(), LearningServiceError> {
    let svc = LearningService::from_storage(Clock::default(), args.settings.clone(), storage);
    let start = svc.now();
    let course = CourseId::new("python-basics");

    let profile = svc.login(&args.user, &args.email).await?;
    println!("Welcome, {}!", profile.name);
    show("today", svc.recommendation().await?.as_ref());

    svc.start_course(
        &course,
        CoursePlan::new("career", "15min").with_motivation("automate reports"),
    )
    .await?;
    for _ in 0..2 {
        svc.complete_lesson(&course).await?;
    }
    drain_feedback(&svc).await?;

    for question in svc.quiz_questions(&course).await? {
        // Miss the first one on purpose.
        let pick = if question.id == QuestionId::new(1) {
            question.correct_answer.wrapping_add(1) % question.options.len().max(1)
        } else {
            question.correct_answer
        };
        let feedback = svc.submit_quiz_answer(&course, question.id, pick).await?;
        println!(
            "  {} -> {} ({:.0}% confidence)",
            question.prompt,
            if feedback.is_correct { "correct" } else { "wrong" },
            feedback.confidence.percentage
        );
    }
    show("after quiz", svc.recommendation().await?.as_ref());

    let later = svc.with_clock(Clock::fixed(start + Duration::days(5)));
    if later.refresh_streak().await? {
        println!("  streak reset after time away");
    }
    show("five days later", later.recommendation().await?.as_ref());

    later.complete_memory_refresh(3).await?;
    later.complete_lesson(&course).await?;
    drain_feedback(&later).await?;

    let state = later.state().await?;
    info!(
        xp = state.xp,
        streak = state.streak,
        badges = state.earned_badges.len(),
        lessons = state.total_lessons_completed(),
        "demo session finished"
    );
    println!(
        "XP {} | streak {} | badges {}",
        state.xp,
        state.streak,
        state.earned_badges.len()
    );
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::in_memory(seed::demo_catalog());
    replay(&args, &storage).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("services=info,app=info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
