use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use roster_client::api::DEFAULT_API_URL;
use roster_client::{ActionOutcome, ApiClient, AppState, ClientApp, Stats, StudentForm};

#[derive(Parser)]
#[command(name = "roster-cli", about = "Terminal front-end for the student records API")]
struct Cli {
    /// API base URL, including the `/api` prefix
    #[arg(long, env = "ROSTER_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Timeout applied to every request
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Print the list and statistics as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show all students and summary statistics
    List,
    /// Add a student, then show the refreshed list
    Add(AddArgs),
    /// Test the connection to the API
    Health,
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    branch: String,
    /// Whole number, 0 to 100
    #[arg(long)]
    marks: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api = match ApiClient::new(&cli.api_url, Duration::from_millis(cli.timeout_ms)) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let app = ClientApp::new(api);

    let (outcome, show_list) = match cli.command {
        Commands::List => (app.refresh().await, true),
        Commands::Add(args) => {
            app.set_form(StudentForm {
                name: args.name,
                email: args.email,
                branch: args.branch,
                marks: args.marks,
            })
            .await;
            (app.submit().await, true)
        }
        Commands::Health => (app.test_connection().await, false),
    };

    let state = app.snapshot().await;
    if let Some(msg) = &state.success {
        println!("{msg}");
    }
    if let Some(msg) = &state.error {
        eprintln!("{msg}");
    }
    if show_list && outcome == ActionOutcome::Completed {
        let stats = app.stats().await;
        if cli.json {
            print_json(&state, &stats);
        } else {
            print_table(&state, &stats);
        }
    }
    println!("Status: {}", state.status);

    if outcome == ActionOutcome::Completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_table(state: &AppState, stats: &Stats) {
    println!(
        "Total: {}  Average: {:.1}  Highest: {}",
        stats.total, stats.avg_marks, stats.highest_marks
    );
    if state.students.is_empty() {
        println!("No students found. Add one to get started.");
        return;
    }
    println!("{:<24} {:<32} {:<16} {:>5}", "NAME", "EMAIL", "BRANCH", "MARKS");
    for s in &state.students {
        println!("{:<24} {:<32} {:<16} {:>5}", s.name, s.email, s.branch, s.marks);
    }
}

fn print_json(state: &AppState, stats: &Stats) {
    let doc = serde_json::json!({
        "students": state.students,
        "stats": stats,
    });
    match serde_json::to_string_pretty(&doc) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Error: {e}"),
    }
}
