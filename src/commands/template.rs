use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use fittrack_core::{
    duplicate, instantiate, Exercise, FormSession, SaveRequest, TemplateDraft, TemplateExercise,
    TemplateMetadata, WorkoutMetadata, WorkoutTemplate,
};

use super::workout::submit as submit_workout;
use super::{
    confirm, fill_session, parse_id, parse_template_exercise, parse_when, remove_rows_named,
    truncate, OutputFormat, RowInput,
};
use crate::config::Config;
use crate::db::{TemplateRepository, WorkoutRepository};

#[derive(Args)]
pub struct TemplateCommand {
    #[command(subcommand)]
    pub command: TemplateSubcommand,
}

#[derive(Subcommand)]
pub enum TemplateSubcommand {
    /// Create a workout template
    Create {
        /// Name of the template
        name: String,

        /// Exercise with its set count, default 3 sets (can be repeated)
        #[arg(long = "exercise", short, value_name = "NAME[:SETS]", value_parser = parse_template_exercise)]
        exercises: Vec<RowInput>,
    },

    /// List templates
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a template's details
    Show {
        /// Template ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update an existing template
    Update {
        /// Template ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// Add an exercise (can be repeated)
        #[arg(long = "add-exercise", value_name = "NAME[:SETS]", value_parser = parse_template_exercise)]
        add_exercises: Vec<RowInput>,

        /// Remove exercises by name (can be repeated)
        #[arg(long = "remove-exercise", value_name = "NAME")]
        remove_exercises: Vec<String>,
    },

    /// Log a workout from a template (10 reps, no weight per exercise)
    Use {
        /// Template ID
        id: String,

        /// Duration in minutes
        #[arg(long, short)]
        duration: Option<u32>,

        /// When it was completed (defaults to now)
        #[arg(long, value_parser = parse_when)]
        at: Option<DateTime<Utc>>,
    },

    /// Copy a template as "<name> (Copy)"
    Duplicate {
        /// Template ID
        id: String,
    },

    /// Delete a template
    Delete {
        /// Template ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl TemplateCommand {
    pub async fn run(
        &self,
        repo: &TemplateRepository,
        workout_repo: &WorkoutRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            TemplateSubcommand::Create { name, exercises } => {
                let mut session: FormSession<TemplateExercise> = FormSession::new();
                fill_session(&mut session, exercises)?;

                let request = session.save(TemplateMetadata { name: name.clone() })?;

                let template = submit(repo, config, request).await?;
                println!("Created template:");
                println!("ID: {}", template.id);
                print!("{}", template);
                Ok(())
            }

            TemplateSubcommand::List { format } => {
                let templates = repo.list(&config.user_id.value).await?;

                if templates.is_empty() {
                    println!("No templates found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&templates)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<36}  {:<30}  EXERCISES", "ID", "NAME");
                        println!("{}", "-".repeat(80));
                        for template in &templates {
                            let exercises: Vec<&str> =
                                template.exercises.iter().map(|e| e.name.as_str()).collect();
                            println!(
                                "{:<36}  {:<30}  {}",
                                template.id,
                                truncate(&template.name, 30),
                                exercises.join(", ")
                            );
                        }
                        println!("\nTotal: {} template(s)", templates.len());
                    }
                }
                Ok(())
            }

            TemplateSubcommand::Show { id, format } => {
                let template = find(repo, &config.user_id.value, id).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&template)?);
                    }
                    OutputFormat::Text => {
                        println!("ID: {}", template.id);
                        print!("{}", template);
                    }
                }
                Ok(())
            }

            TemplateSubcommand::Update {
                id,
                name,
                add_exercises,
                remove_exercises,
            } => {
                if name.is_none() && add_exercises.is_empty() && remove_exercises.is_empty() {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let template = find(repo, &config.user_id.value, id).await?;

                let mut session: FormSession<TemplateExercise> = FormSession::new();
                session.load_for_edit(template.id, template.exercises.clone())?;
                for exercise in remove_exercises {
                    remove_rows_named(&mut session, exercise)?;
                }
                fill_session(&mut session, add_exercises)?;

                let request = session.save(TemplateMetadata {
                    name: name.clone().unwrap_or(template.name),
                })?;

                let updated = submit(repo, config, request).await?;
                println!("Updated template:");
                print!("{}", updated);
                Ok(())
            }

            TemplateSubcommand::Use { id, duration, at } => {
                let template = find(repo, &config.user_id.value, id).await?;
                let draft = instantiate(&template, at.unwrap_or_else(Utc::now));

                // Prefill a new workout form with the instantiated exercises
                let mut session: FormSession<Exercise> = FormSession::new();
                for exercise in draft.exercises {
                    session.push_item(exercise);
                }

                let request = session.save(WorkoutMetadata {
                    name: draft.name,
                    duration: duration.unwrap_or(draft.duration),
                    completed_at: draft.completed_at,
                    notes: draft.notes,
                })?;

                let workout = submit_workout(workout_repo, config, request).await?;
                tracing::debug!(template = %template.id, workout = %workout.id, "Instantiated template");

                println!("Logged workout from template '{}':", template.name);
                println!("ID: {}", workout.id);
                print!("{}", workout);
                Ok(())
            }

            TemplateSubcommand::Duplicate { id } => {
                let template = find(repo, &config.user_id.value, id).await?;
                let copy = repo
                    .create(&config.user_id.value, &duplicate(&template))
                    .await?;

                println!("Created template:");
                println!("ID: {}", copy.id);
                print!("{}", copy);
                Ok(())
            }

            TemplateSubcommand::Delete { id, force } => {
                let template = find(repo, &config.user_id.value, id).await?;

                if !force && !confirm(&format!("Delete template '{}'?", template.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                repo.delete(&config.user_id.value, template.id).await?;
                println!("Deleted template: {}", template.name);
                Ok(())
            }
        }
    }
}

async fn submit(
    repo: &TemplateRepository,
    config: &Config,
    request: SaveRequest<TemplateDraft>,
) -> Result<WorkoutTemplate, sqlx::Error> {
    match request {
        SaveRequest::Create(draft) => repo.create(&config.user_id.value, &draft).await,
        SaveRequest::Update { id, draft } => repo.update(&config.user_id.value, id, &draft).await,
    }
}

async fn find(
    repo: &TemplateRepository,
    user_id: &str,
    id: &str,
) -> Result<WorkoutTemplate, Box<dyn std::error::Error>> {
    let uuid = parse_id(id, "template")?;
    repo.get_by_id(user_id, uuid)
        .await?
        .ok_or_else(|| format!("Template not found: {}", id).into())
}
