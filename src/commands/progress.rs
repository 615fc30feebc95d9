use chrono::Local;
use clap::Args;
use fittrack_core::{meal_progress, workout_progress, Granularity};

use super::OutputFormat;
use crate::config::Config;
use crate::db::{MealRepository, WorkoutRepository};

/// Ten years of days, or that many weeks.
const MAX_POINTS: usize = 3660;

/// Daily (or weekly) training minutes and calorie intake
#[derive(Args)]
pub struct ProgressCommand {
    /// Number of days to chart, ending today
    #[arg(long, conflicts_with = "weeks")]
    pub days: Option<usize>,

    /// Chart this many weeks instead of days
    #[arg(long)]
    pub weeks: Option<usize>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl ProgressCommand {
    pub async fn run(
        &self,
        workout_repo: &WorkoutRepository,
        meal_repo: &MealRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (granularity, points) = match self.weeks {
            Some(weeks) => (Granularity::Week, weeks),
            None => (
                Granularity::Day,
                self.days.unwrap_or(config.progress_days.value),
            ),
        };
        check_points(points)?;

        let today = Local::now().date_naive();
        let workouts = workout_repo.list(&config.user_id.value).await?;
        let meals = meal_repo.list(&config.user_id.value).await?;

        let training = workout_progress(&workouts, today, points, granularity, &Local);
        let intake = meal_progress(&meals, today, points, granularity, &Local);

        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "workouts": training,
                    "meals": intake,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                println!(
                    "{:<8}  {:<10}  {:>7}  {:>8}  {:>7}  {:>9}  {:>7}  {:>5}",
                    "", "FROM", "MINUTES", "SESSIONS", "KCAL", "PROTEIN", "CARBS", "FAT"
                );
                println!("{}", "-".repeat(82));
                for (workout, meal) in training.iter().zip(&intake) {
                    println!(
                        "{:<8}  {:<10}  {:>7.0}  {:>8}  {:>7.0}  {:>8.0}g  {:>6.0}g  {:>4.0}g",
                        workout.label,
                        workout.start.format("%Y-%m-%d").to_string(),
                        workout.minutes,
                        workout.sessions,
                        meal.calories,
                        meal.protein,
                        meal.carbs,
                        meal.fat
                    );
                }

                let minutes: f64 = training.iter().map(|p| p.minutes).sum();
                let calories: f64 = intake.iter().map(|p| p.calories).sum();
                println!(
                    "\nTotal: {:.0} min trained, {:.0} kcal eaten",
                    minutes, calories
                );
            }
        }
        Ok(())
    }
}

fn check_points(points: usize) -> Result<(), String> {
    if points == 0 {
        return Err("Nothing to chart: the window must cover at least one day".to_string());
    }
    if points > MAX_POINTS {
        return Err(format!(
            "Window of {} is too large (at most {})",
            points, MAX_POINTS
        ));
    }
    Ok(())
}
