use std::sync::Arc;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "edureport", about = "Education center performance reports")]
struct Cli {
    /// Database path (default: ~/.edureport/edureport.db)
    #[arg(long)]
    db: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on (default: bind_addr setting)
        #[arg(long)]
        bind: Option<String>,
    },
    /// List performance reports
    Reports {
        /// Month of the reporting period (1-12)
        #[arg(long)]
        month: Option<String>,
        /// Year of the reporting period
        #[arg(long)]
        year: Option<String>,
        /// Course ID
        #[arg(long)]
        course: Option<String>,
        /// Teacher ID
        #[arg(long)]
        teacher: Option<String>,
        /// Period as YYYY-MM (instead of --month/--year)
        #[arg(long, conflicts_with_all = ["month", "year"])]
        period: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one report with its students
    Report {
        /// Report ID (e.g. PERF-12)
        #[arg(value_name = "REPORT_ID")]
        record_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Center-wide summary
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load a JSON snapshot of courses, classes, students and grades
    Import {
        /// Snapshot file
        file: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show record counts
    Status,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let db = match &cli.db {
        Some(path) => edureport::Database::open_at(path).await?,
        None => edureport::Database::open().await?,
    };

    match cli.command {
        Commands::Status => {
            print_status(&db).await?;
        }
        Commands::Config { action } => {
            handle_config(&db, action).await?;
        }
        Commands::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .map_err(|e| anyhow::anyhow!("cannot read {file}: {e}"))?;
            let snapshot = edureport::Snapshot::from_json(&json)?;
            let report = edureport::import_snapshot(&db, snapshot).await?;
            println!("Imported {file}");
            println!("  Classes:     {}", report.classes);
            println!("  Enrollments: {}", report.enrollments);
            println!("  Sessions:    {}", report.sessions);
            println!("  Attendance:  {}", report.attendance);
            println!("  Submissions: {}", report.submissions);
        }
        Commands::Serve { bind } => {
            let settings = edureport::Settings::load(&db).await?;
            let addr = bind.unwrap_or_else(|| settings.bind_addr.clone());
            let engine = edureport::PerformanceEngine::from_database(db, &settings);
            edureport::api::serve(Arc::new(engine), &addr).await?;
        }
        Commands::Reports {
            month,
            year,
            course,
            teacher,
            period,
            json,
        } => {
            let (month, year) = match period {
                Some(p) => {
                    let key = edureport::query::PeriodKey::parse(&p)?;
                    (Some(key.month.to_string()), Some(key.year.to_string()))
                }
                None => (month, year),
            };
            let engine = engine(db).await?;
            let filter = edureport::RawReportFilter {
                month,
                year,
                course_id: course,
                teacher_id: teacher,
            };
            let reports = engine.list_reports(&filter).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else if reports.is_empty() {
                println!("No reports match.");
            } else {
                for r in &reports {
                    print_report_line(r);
                }
            }
        }
        Commands::Report { record_id, json } => {
            let engine = engine(db).await?;
            let detail = engine.report_detail(&record_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print_report(&detail.report);
                print_students(&detail.students);
            }
        }
        Commands::Summary { json } => {
            let engine = engine(db).await?;
            let s = engine.summary().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&s)?);
            } else {
                println!("Center Summary ({} baseline)", engine.baseline().name());
                println!("  Classes:       {}", s.total_courses);
                println!("  Average score: {:.1}", s.average_score);
                println!("  Improvement:   {:.1}%", s.overall_improvement);
            }
        }
    }

    Ok(())
}

async fn engine(db: edureport::Database) -> anyhow::Result<edureport::PerformanceEngine> {
    let settings = edureport::Settings::load(&db).await?;
    Ok(edureport::PerformanceEngine::from_database(db, &settings))
}

async fn print_status(db: &edureport::Database) -> anyhow::Result<()> {
    let counts = db
        .reader()
        .call(|conn| edureport::storage::repository::table_counts(conn))
        .await?;

    println!("Record Store Status");
    for (table, count) in counts {
        println!("  {:<16} {count}", format!("{table}:"));
    }
    Ok(())
}

async fn handle_config(db: &edureport::Database, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let val: Option<String> = db
                .reader()
                .call({
                    let key = key.clone();
                    move |conn| edureport::storage::repository::get_config(conn, &key)
                })
                .await?;
            match val {
                Some(v) => println!("{key} = {v}"),
                None => println!("{key} is not set"),
            }
        }
        ConfigAction::Set { key, value } => {
            edureport::Settings::validate(&key, &value)?;
            if !edureport::config::KNOWN_KEYS.contains(&key.as_str()) {
                log::warn!("'{key}' is not a setting edureport reads");
            }
            db.writer()
                .call(move |conn| {
                    edureport::storage::repository::set_config(conn, &key, &value)?;
                    Ok::<(), rusqlite::Error>(())
                })
                .await?;
            println!("Config updated.");
        }
        ConfigAction::List => {
            let items: Vec<(String, String)> = db
                .reader()
                .call(|conn| edureport::storage::repository::list_config(conn))
                .await?;
            if items.is_empty() {
                println!("No configuration set.");
            } else {
                for (k, v) in items {
                    println!("{k} = {v}");
                }
            }
        }
    }
    Ok(())
}

fn print_report_line(r: &edureport::PerformanceReport) {
    println!(
        "{:<10} {:04}-{:02}  {:<20} {:<16} avg {:>5.1}  pass {:>3.0}%  att {:>3.0}%  n={}",
        r.id.to_string(),
        r.year,
        r.month,
        r.course_name,
        r.class_name,
        r.average_score,
        r.pass_rate,
        r.attendance_rate,
        r.total_students
    );
}

fn print_report(r: &edureport::PerformanceReport) {
    println!("Report {}: {} / {} ({:04}-{:02})", r.id, r.course_name, r.class_name, r.year, r.month);
    println!("  Teacher:     {}", r.teacher_name.as_deref().unwrap_or("unassigned"));
    println!("  Students:    {}", r.total_students);
    println!("  Average:     {:.1}", r.average_score);
    println!("  Pass rate:   {:.0}%", r.pass_rate);
    println!("  Attendance:  {:.0}%", r.attendance_rate);
    println!("  Improvement: {:.1}%", r.improvement_rate);
    if let Some(ref notes) = r.notes {
        println!("  Notes:       {notes}");
    }
}

fn print_students(students: &[edureport::StudentPerformance]) {
    println!("  Students:");
    for s in students {
        println!(
            "    {:<24} score {:>5.1} (prev {:>5.1}, {:+.1}%)  att {:>3.0}%  done {}",
            s.student_name,
            s.current_score,
            s.previous_score,
            s.improvement_pct,
            s.attendance,
            s.assignments_completed
        );
    }
}
