use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{Args, Subcommand};
use fittrack_core::{
    filter_range, group_by_date, Exercise, FormSession, SaveRequest, Workout, WorkoutDraft,
    WorkoutMetadata,
};

use super::{
    confirm, fill_session, parse_date, parse_exercise, parse_id, parse_when, remove_rows_named,
    truncate, OutputFormat, RowInput,
};
use crate::config::Config;
use crate::db::WorkoutRepository;

#[derive(Args)]
pub struct WorkoutCommand {
    #[command(subcommand)]
    pub command: WorkoutSubcommand,
}

#[derive(Subcommand)]
pub enum WorkoutSubcommand {
    /// Log a completed workout
    Log {
        /// Name of the workout
        name: String,

        /// Duration in minutes
        #[arg(long, short)]
        duration: u32,

        /// Exercise (can be repeated)
        #[arg(long = "exercise", short, value_name = "NAME:SETSxREPS[@WEIGHT]", value_parser = parse_exercise)]
        exercises: Vec<RowInput>,

        /// When it was completed (defaults to now)
        #[arg(long, value_parser = parse_when)]
        at: Option<DateTime<Utc>>,

        /// Notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List workouts, grouped by day
    List {
        /// Only workouts on or after this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Only workouts on or before this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a workout's details
    Show {
        /// Workout ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update an existing workout
    Update {
        /// Workout ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New duration in minutes
        #[arg(long, short)]
        duration: Option<u32>,

        /// New completion time
        #[arg(long, value_parser = parse_when)]
        at: Option<DateTime<Utc>>,

        /// New notes
        #[arg(long)]
        notes: Option<String>,

        /// Add an exercise (can be repeated)
        #[arg(long = "add-exercise", value_name = "NAME:SETSxREPS[@WEIGHT]", value_parser = parse_exercise)]
        add_exercises: Vec<RowInput>,

        /// Remove exercises by name (can be repeated)
        #[arg(long = "remove-exercise", value_name = "NAME")]
        remove_exercises: Vec<String>,
    },

    /// Delete a workout
    Delete {
        /// Workout ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl WorkoutCommand {
    pub async fn run(
        &self,
        repo: &WorkoutRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WorkoutSubcommand::Log {
                name,
                duration,
                exercises,
                at,
                notes,
            } => {
                let mut session: FormSession<Exercise> = FormSession::new();
                fill_session(&mut session, exercises)?;

                let request = session.save(WorkoutMetadata {
                    name: name.clone(),
                    duration: *duration,
                    completed_at: at.unwrap_or_else(Utc::now),
                    notes: notes.clone(),
                })?;

                let workout = submit(repo, config, request).await?;
                println!("Logged workout:");
                println!("ID: {}", workout.id);
                print!("{}", workout);
                Ok(())
            }

            WorkoutSubcommand::List { from, to, format } => {
                let mut workouts = repo.list(&config.user_id.value).await?;
                if from.is_some() || to.is_some() {
                    let from = from.unwrap_or(NaiveDate::MIN);
                    let to = to.unwrap_or(NaiveDate::MAX);
                    workouts = filter_range(&workouts, from, to, &Local)
                        .into_iter()
                        .cloned()
                        .collect();
                }

                if workouts.is_empty() {
                    println!("No workouts found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&workouts)?);
                    }
                    OutputFormat::Text => print_by_day(&workouts),
                }
                Ok(())
            }

            WorkoutSubcommand::Show { id, format } => {
                let workout = find(repo, &config.user_id.value, id).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&workout)?);
                    }
                    OutputFormat::Text => {
                        println!("ID: {}", workout.id);
                        print!("{}", workout);
                    }
                }
                Ok(())
            }

            WorkoutSubcommand::Update {
                id,
                name,
                duration,
                at,
                notes,
                add_exercises,
                remove_exercises,
            } => {
                let has_updates = name.is_some()
                    || duration.is_some()
                    || at.is_some()
                    || notes.is_some()
                    || !add_exercises.is_empty()
                    || !remove_exercises.is_empty();

                if !has_updates {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let workout = find(repo, &config.user_id.value, id).await?;

                let mut session: FormSession<Exercise> = FormSession::new();
                session.load_for_edit(workout.id, workout.exercises.clone())?;
                for exercise in remove_exercises {
                    remove_rows_named(&mut session, exercise)?;
                }
                fill_session(&mut session, add_exercises)?;

                let request = session.save(WorkoutMetadata {
                    name: name.clone().unwrap_or(workout.name),
                    duration: duration.unwrap_or(workout.duration),
                    completed_at: at.unwrap_or(workout.completed_at),
                    notes: notes.clone().or(workout.notes),
                })?;

                let updated = submit(repo, config, request).await?;
                println!("Updated workout:");
                print!("{}", updated);
                Ok(())
            }

            WorkoutSubcommand::Delete { id, force } => {
                let workout = find(repo, &config.user_id.value, id).await?;

                if !force && !confirm(&format!("Delete workout '{}'?", workout.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                repo.delete(&config.user_id.value, workout.id).await?;
                println!("Deleted workout: {}", workout.name);
                Ok(())
            }
        }
    }
}

/// Persist a saved workout form.
pub(super) async fn submit(
    repo: &WorkoutRepository,
    config: &Config,
    request: SaveRequest<WorkoutDraft>,
) -> Result<Workout, sqlx::Error> {
    match request {
        SaveRequest::Create(draft) => repo.create(&config.user_id.value, &draft).await,
        SaveRequest::Update { id, draft } => repo.update(&config.user_id.value, id, &draft).await,
    }
}

async fn find(
    repo: &WorkoutRepository,
    user_id: &str,
    id: &str,
) -> Result<Workout, Box<dyn std::error::Error>> {
    let uuid = parse_id(id, "workout")?;
    repo.get_by_id(user_id, uuid)
        .await?
        .ok_or_else(|| format!("Workout not found: {}", id).into())
}

fn print_by_day(workouts: &[Workout]) {
    let days = group_by_date(workouts, &Local);

    for (day, members) in days.iter().rev() {
        let minutes: u32 = members.iter().map(|w| w.duration).sum();
        println!("{}  ({} min)", day.format("%a %Y-%m-%d"), minutes);
        for workout in members {
            println!(
                "  {:<36}  {:<30}  {:>4} min  {} exercise(s)",
                workout.id,
                truncate(&workout.name, 30),
                workout.duration,
                workout.exercises.len()
            );
        }
    }
    println!("\nTotal: {} workout(s)", workouts.len());
}
