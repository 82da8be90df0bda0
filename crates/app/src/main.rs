use std::fmt;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use services::{ApiConfig, AppServices, Clock};
use study_core::model::{AssignmentId, MilestoneId, PlanId, QuestionId};

const DEFAULT_DB_URL: &str = "sqlite://studymate.sqlite3";

#[derive(Debug)]
enum CliError {
    InvalidDbUrl { raw: String },
    PlanNotFound(PlanId),
    MilestoneNotFound { plan: PlanId, milestone: MilestoneId },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            CliError::PlanNotFound(id) => write!(f, "study plan not found: {id}"),
            CliError::MilestoneNotFound { plan, milestone } => {
                write!(f, "milestone {milestone} not found in plan {plan}")
            }
        }
    }
}

impl std::error::Error for CliError {}

#[derive(Debug, Parser)]
#[command(name = "studymate", version, about = "Quizzes and study-plan tracking")]
struct Cli {
    /// SQLite database URL. Defaults to STUDYMATE_DB_URL, then sqlite://studymate.sqlite3.
    #[arg(long, global = true)]
    db: Option<String>,

    /// REST backend base URL. Defaults to STUDYMATE_API_BASE_URL.
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Answer and submit a quiz.
    Quiz {
        assignment_id: u64,
        /// Selection as `question:option`, option index starting at 0. Repeatable.
        #[arg(long = "answer", value_parser = parse_answer)]
        answers: Vec<(QuestionId, usize)>,
    },
    /// Clear saved answers for a quiz.
    QuizRetry { assignment_id: u64 },
    /// Show overall and per-week progress of a study plan.
    Plan { plan_id: String },
    /// Toggle one milestone and save.
    Toggle { plan_id: String, milestone_id: String },
    /// List assignments with attempts and scores.
    Assignments,
}

fn parse_answer(raw: &str) -> Result<(QuestionId, usize), String> {
    let (question, option) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected question:option, got {raw}"))?;
    let question = question.parse::<QuestionId>().map_err(|e| e.to_string())?;
    let option = option
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid option index: {option}"))?;
    Ok((question, option))
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw.starts_with("sqlite://")
        || raw.starts_with("sqlite::memory:")
        || raw.starts_with("sqlite:file:")
    {
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
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(CliError::InvalidDbUrl {
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

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studymate=info,services=info,storage=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let db_url = cli
        .db
        .or_else(|| std::env::var("STUDYMATE_DB_URL").ok())
        .filter(|url| !url.trim().is_empty())
        .map_or_else(|| DEFAULT_DB_URL.to_string(), normalize_sqlite_url);
    let api = cli
        .api_base_url
        .map_or_else(ApiConfig::from_env, |url| ApiConfig::new(url));

    prepare_sqlite_file(&db_url)?;
    info!(%db_url, api = %api.base_url, "starting");
    let app = AppServices::new_sqlite(&db_url, Clock::default(), api).await?;

    match cli.command {
        Command::Quiz {
            assignment_id,
            answers,
        } => run_quiz(&app, AssignmentId::new(assignment_id), answers).await,
        Command::QuizRetry { assignment_id } => {
            let quizzes = app.quizzes();
            let mut session = quizzes.open(AssignmentId::new(assignment_id)).await?;
            quizzes.retry(&mut session).await;
            println!("Cleared answers for {}", session.quiz().title());
            Ok(())
        }
        Command::Plan { plan_id } => show_plan(&app, PlanId::new(plan_id)).await,
        Command::Toggle {
            plan_id,
            milestone_id,
        } => toggle(&app, PlanId::new(plan_id), MilestoneId::new(milestone_id)).await,
        Command::Assignments => {
            for a in app.assignments().list()? {
                let score = a.score.map_or_else(|| "-".to_string(), |s| format!("{s}%"));
                println!(
                    "{:>5}  {:<40} {:<12} {}/{} attempts  score {}",
                    a.id,
                    a.title,
                    a.status.label(),
                    a.attempts,
                    a.max_attempts,
                    score
                );
            }
            Ok(())
        }
    }
}

async fn run_quiz(
    app: &AppServices,
    assignment_id: AssignmentId,
    answers: Vec<(QuestionId, usize)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let quizzes = app.quizzes();
    if let Some(previous) = quizzes.last_result(assignment_id).await {
        println!(
            "Previous attempt: {}/{} ({}%)",
            previous.raw, previous.total, previous.percent
        );
    }

    let mut session = quizzes.open(assignment_id).await?;
    for (question, option) in answers {
        quizzes.select_answer(&mut session, question, option).await?;
    }
    let result = quizzes.submit(&mut session).await;

    println!("{}", session.quiz().title());
    for question in session.quiz().questions() {
        let chosen = result.answers.get(question.id());
        let mark = if question.is_correct(chosen) { "correct" } else { "wrong" };
        let chosen = chosen
            .and_then(|i| question.options().get(i))
            .map_or("(no answer)", String::as_str);
        println!("  Q{} {}: {} [{mark}]", question.id(), question.prompt(), chosen);
    }
    println!("Score: {}/{} ({}%)", result.raw, result.total, result.percent);
    Ok(())
}

async fn show_plan(app: &AppServices, plan_id: PlanId) -> Result<(), Box<dyn std::error::Error>> {
    let plan = app
        .plans()
        .find_plan(&plan_id)
        .await
        .ok_or_else(|| CliError::PlanNotFound(plan_id.clone()))?;
    let tracker = app.trackers().open(&plan).await;

    println!("{} ({})", plan.title, plan.duration);
    println!(
        "Overall: {}%  current week: {}",
        tracker.overall_progress(),
        tracker.current_week()
    );
    for week in tracker.weeks() {
        println!("  Week {week}: {}%", tracker.week_progress(week));
        for m in tracker.milestones().iter().filter(|m| m.week == week) {
            let check = if m.completed { "x" } else { " " };
            println!("    [{check}] {} {}", m.id, m.title);
        }
    }
    if !tracker.notes().is_empty() {
        println!("Notes: {}", tracker.notes());
    }
    Ok(())
}

async fn toggle(
    app: &AppServices,
    plan_id: PlanId,
    milestone_id: MilestoneId,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = app
        .plans()
        .find_plan(&plan_id)
        .await
        .ok_or_else(|| CliError::PlanNotFound(plan_id.clone()))?;
    let trackers = app.trackers();
    let mut tracker = trackers.open(&plan).await;

    let completed = trackers
        .toggle_milestone(&mut tracker, &milestone_id)
        .await
        .ok_or_else(|| CliError::MilestoneNotFound {
            plan: plan_id.clone(),
            milestone: milestone_id.clone(),
        })?;
    let state = if completed { "completed" } else { "not completed" };
    println!("{milestone_id} is now {state}; overall {}%", tracker.overall_progress());
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
