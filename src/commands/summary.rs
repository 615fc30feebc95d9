use chrono::{Local, Utc};
use clap::Args;
use fittrack_core::{time_ago, MealSummary, WorkoutSummary};

use super::OutputFormat;
use crate::config::Config;
use crate::db::{MealRepository, WorkoutRepository};

/// Dashboard cards: workout history and today's meals
#[derive(Args)]
pub struct SummaryCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl SummaryCommand {
    pub async fn run(
        &self,
        workout_repo: &WorkoutRepository,
        meal_repo: &MealRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let now = Utc::now();
        let workouts = workout_repo.list(&config.user_id.value).await?;
        let meals = meal_repo.list(&config.user_id.value).await?;

        let workout_summary = WorkoutSummary::build(&workouts, now, &Local);
        let meal_summary = MealSummary::build(&meals, now, &Local);

        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "workouts": workout_summary,
                    "meals": meal_summary,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                let last = |at: Option<chrono::DateTime<Utc>>| {
                    at.map(|at| time_ago(at, now))
                        .unwrap_or_else(|| "never".to_string())
                };

                println!("Workouts");
                println!("========\n");
                println!("Total workouts:  {}", workout_summary.total_workouts);
                println!("Total exercises: {}", workout_summary.total_exercises);
                println!("Last workout:    {}", last(workout_summary.last_workout));
                println!("Trend:           {}", workout_summary.trend);
                if !workout_summary.recent_exercises.is_empty() {
                    println!("\nRecent exercises:");
                    for exercise in &workout_summary.recent_exercises {
                        println!("  - {}", exercise);
                    }
                }

                println!("\nToday's Meals");
                println!("=============\n");
                println!("Meals:    {}", meal_summary.total_meals);
                println!("Calories: {:.0} kcal", meal_summary.total_calories);
                println!(
                    "Macros:   P {:.0}g / C {:.0}g / F {:.0}g",
                    meal_summary.macros.protein,
                    meal_summary.macros.carbs,
                    meal_summary.macros.fat
                );
                println!("Last meal: {}", last(meal_summary.last_meal));
                if !meal_summary.recent_meals.is_empty() {
                    println!("\nRecent meals:");
                    for meal in &meal_summary.recent_meals {
                        println!(
                            "  - {} ({}): {:.0} kcal",
                            meal.name, meal.meal_type, meal.calories
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
