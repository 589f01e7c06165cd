use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use classpulse_dashboard::chart::{SvgSurface, Theme};
use classpulse_dashboard::metrics::{derive_metrics, pending_detail};
use classpulse_dashboard::models::{subject_display_name, StudentRecord};
use classpulse_dashboard::recommend::{self, PriorityCard, Recommendation, StudyHabits};
use classpulse_dashboard::views::{self, ChartKind};
use classpulse_dashboard::{report, store};

#[derive(Parser)]
#[command(name = "classpulse-dashboard")]
#[command(about = "Student performance metrics, charts and reports for ClassPulse", long_about = None)]
struct Cli {
    /// SQLite database holding saved student records
    #[arg(
        long,
        global = true,
        env = "DATABASE_URL",
        default_value = "sqlite://classpulse.db"
    )]
    database_url: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Store the sample student record
    Seed,
    /// Save a student record from a JSON file
    Save {
        #[arg(long)]
        json: PathBuf,
    },
    /// Add assignments from a CSV file (title,subject,due_date,status)
    ImportAssignments {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        student_id: Option<String>,
    },
    /// Print the derived dashboard metrics
    Metrics {
        #[arg(long)]
        student_id: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Render a dashboard chart as SVG
    Chart {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[arg(long, value_enum, default_value_t = ThemeArg::Dark)]
        theme: ThemeArg,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long, default_value = "chart.svg")]
        out: PathBuf,
        #[arg(long)]
        student_id: Option<String>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        student_id: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Print personalized recommendations
    Recommend {
        #[arg(long)]
        student_id: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Bar,
    Trend,
    Donut,
}

impl From<KindArg> for ChartKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Bar => ChartKind::Bar,
            KindArg::Trend => ChartKind::Trend,
            KindArg::Donut => ChartKind::Donut,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationOutput {
    main: Recommendation,
    priorities: Vec<PriorityCard>,
    study_habits: StudyHabits,
    daily_tip: &'static str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let pool = store::connect(&cli.database_url, 5).await?;

    match cli.command {
        Commands::InitDb => {
            store::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            store::seed(&pool).await?;
            println!("Sample record stored.");
        }
        Commands::Save { json } => {
            let raw = std::fs::read_to_string(&json)
                .with_context(|| format!("failed to read {}", json.display()))?;
            let record = StudentRecord::from_json(&raw)
                .with_context(|| format!("{} is not a valid student record", json.display()))?;
            store::save_record(&pool, &record).await?;
            println!("Saved record for {}.", record.name.full());
        }
        Commands::ImportAssignments { csv, student_id } => {
            let key = store::record_key(student_id.as_deref());
            let inserted = store::import_assignments(&pool, &key, &csv).await?;
            println!("Inserted {inserted} assignments from {}.", csv.display());
        }
        Commands::Metrics { student_id, json } => {
            let record = load(&pool, student_id.as_deref()).await?;
            let metrics = derive_metrics(&record)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
                return Ok(());
            }

            println!("{}", record.name.welcome());
            println!(
                "Metrics for {} [{}] ({}):",
                record.name.full(),
                record.name.initials(),
                record.grade
            );
            match metrics.attendance_rate {
                Some(rate) => println!("- Attendance: {rate}%"),
                None => println!("- Attendance: no classes recorded"),
            }
            println!("- Average score: {:.1}", metrics.average_subject_score);
            println!(
                "- Strongest: {} ({}), weakest: {} ({})",
                subject_display_name(&metrics.strongest_subject.label),
                metrics.strongest_subject.score,
                subject_display_name(&metrics.weakest_subject.label),
                metrics.weakest_subject.score
            );
            println!(
                "- Completion: {}%, pending: {} ({})",
                metrics.completion_rate,
                metrics.pending_count,
                pending_detail(metrics.pending_count)
            );
            println!("- Participation: {}", metrics.participation_rank);
            println!("- Behavior: {}", metrics.behavior_status);
            println!(
                "- Risk: {} (score {:.1})",
                metrics.risk_tier, metrics.risk_score
            );
        }
        Commands::Chart {
            kind,
            theme,
            width,
            height,
            out,
            student_id,
        } => {
            let record = load(&pool, student_id.as_deref()).await?;
            let metrics = derive_metrics(&record)?;
            let kind = ChartKind::from(kind);
            let (default_width, default_height) = kind.default_size();
            let mut surface = SvgSurface::new(
                width.unwrap_or(default_width),
                height.unwrap_or(default_height),
            );

            let theme = Theme::from_dark_flag(theme == ThemeArg::Dark);
            if !views::render(kind, &record, &metrics, theme, &mut surface) {
                println!("Nothing to draw; chart not written.");
                return Ok(());
            }
            std::fs::write(&out, surface.finish())
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Chart written to {}.", out.display());
        }
        Commands::Report { student_id, out } => {
            let record = load(&pool, student_id.as_deref()).await?;
            let metrics = derive_metrics(&record)?;
            let report = report::build_report(&record, &metrics, Local::now().date_naive())?;
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Recommend { student_id, json } => {
            let record = load(&pool, student_id.as_deref()).await?;
            let today = Local::now().date_naive();

            if json {
                let analysis = recommend::analyze(&record)?;
                let output = RecommendationOutput {
                    main: recommend::main_recommendation(&analysis),
                    priorities: recommend::priority_cards(&analysis),
                    study_habits: recommend::study_habits(&record, &analysis),
                    daily_tip: recommend::daily_tip(today),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            print!("{}", report::build_recommendations(&record, today)?);
        }
    }

    Ok(())
}

async fn load(pool: &sqlx::SqlitePool, student_id: Option<&str>) -> anyhow::Result<StudentRecord> {
    store::load_or_sample(pool, &store::record_key(student_id)).await
}
