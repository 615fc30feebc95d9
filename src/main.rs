use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod db;

use commands::{
    ConfigCommand, MealCommand, ProgressCommand, SummaryCommand, TemplateCommand, WorkoutCommand,
};
use config::Config;
use db::{init_db, MealRepository, TemplateRepository, WorkoutRepository};

#[derive(Parser)]
#[command(name = "fittrack")]
#[command(version)]
#[command(about = "Track workouts and meals from the command line", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log and manage workouts
    Workout(WorkoutCommand),

    /// Log and manage meals
    Meal(MealCommand),

    /// Manage workout templates
    Template(TemplateCommand),

    /// Show the workout and meal dashboard
    Summary(SummaryCommand),

    /// Chart training and intake over recent days or weeks
    Progress(ProgressCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fittrack=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Workout(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            let repo = WorkoutRepository::new(pool);
            cmd.run(&repo, &config).await?;
        }
        Some(Commands::Meal(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            let repo = MealRepository::new(pool);
            cmd.run(&repo, &config).await?;
        }
        Some(Commands::Template(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            let template_repo = TemplateRepository::new(pool.clone());
            let workout_repo = WorkoutRepository::new(pool);
            cmd.run(&template_repo, &workout_repo, &config).await?;
        }
        Some(Commands::Summary(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            let workout_repo = WorkoutRepository::new(pool.clone());
            let meal_repo = MealRepository::new(pool);
            cmd.run(&workout_repo, &meal_repo, &config).await?;
        }
        Some(Commands::Progress(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            let workout_repo = WorkoutRepository::new(pool.clone());
            let meal_repo = MealRepository::new(pool);
            cmd.run(&workout_repo, &meal_repo, &config).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
