use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{Args, Subcommand};
use fittrack_core::{
    FoodItem, FormSession, Meal, MealDiary, MealDraft, MealMetadata, MealType, Metric,
    SaveRequest,
};
use std::str::FromStr;

use super::{
    confirm, fill_session, parse_date, parse_food_item, parse_id, parse_when, remove_rows_named,
    truncate, OutputFormat, RowInput,
};
use crate::config::Config;
use crate::db::MealRepository;

#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// Log a meal; calories and macros are summed from its items
    Log {
        /// Name of the meal
        name: String,

        /// Meal type (breakfast, lunch, dinner, snack)
        #[arg(long = "type", short = 't', value_parser = MealType::from_str)]
        meal_type: MealType,

        /// Food item (can be repeated)
        #[arg(long = "item", short, value_name = "NAME:CALORIES[:PROTEIN:CARBS:FAT]", value_parser = parse_food_item)]
        items: Vec<RowInput>,

        /// When it was eaten (defaults to now)
        #[arg(long, value_parser = parse_when)]
        at: Option<DateTime<Utc>>,

        /// Notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List meals
    List {
        /// Only meals on or after this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Only meals on or before this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one day's meals grouped by type, with totals
    Diary {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a meal's details
    Show {
        /// Meal ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update an existing meal
    Update {
        /// Meal ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New meal type
        #[arg(long = "type", short = 't', value_parser = MealType::from_str)]
        meal_type: Option<MealType>,

        /// New time eaten
        #[arg(long, value_parser = parse_when)]
        at: Option<DateTime<Utc>>,

        /// New notes
        #[arg(long)]
        notes: Option<String>,

        /// Add a food item (can be repeated)
        #[arg(long = "add-item", value_name = "NAME:CALORIES[:PROTEIN:CARBS:FAT]", value_parser = parse_food_item)]
        add_items: Vec<RowInput>,

        /// Remove food items by name (can be repeated)
        #[arg(long = "remove-item", value_name = "NAME")]
        remove_items: Vec<String>,
    },

    /// Delete a meal
    Delete {
        /// Meal ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl MealCommand {
    pub async fn run(
        &self,
        repo: &MealRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            MealSubcommand::Log {
                name,
                meal_type,
                items,
                at,
                notes,
            } => {
                let mut session: FormSession<FoodItem> = FormSession::new();
                fill_session(&mut session, items)?;

                let request = session.save(MealMetadata {
                    name: name.clone(),
                    meal_type: *meal_type,
                    consumed_at: at.unwrap_or_else(Utc::now),
                    notes: notes.clone(),
                })?;

                let meal = submit(repo, config, request).await?;
                println!("Logged meal:");
                println!("ID: {}", meal.id);
                print!("{}", meal);
                Ok(())
            }

            MealSubcommand::List { from, to, format } => {
                let diary = MealDiary::from_meals(repo.list(&config.user_id.value).await?, Local);
                let meals = diary.date_range(
                    from.unwrap_or(NaiveDate::MIN),
                    to.unwrap_or(NaiveDate::MAX),
                );

                if meals.is_empty() {
                    println!("No meals found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&meals)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<36}  {:<16}  {:<9}  {:<25}  {:>8}",
                            "ID", "WHEN", "TYPE", "NAME", "KCAL"
                        );
                        println!("{}", "-".repeat(102));
                        for meal in &meals {
                            println!(
                                "{:<36}  {:<16}  {:<9}  {:<25}  {:>8.0}",
                                meal.id,
                                meal.consumed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                                meal.meal_type,
                                truncate(&meal.name, 25),
                                meal.calories
                            );
                        }
                        println!("\nTotal: {} meal(s)", meals.len());
                    }
                }
                Ok(())
            }

            MealSubcommand::Diary { date, format } => {
                let date = date.unwrap_or_else(|| Local::now().date_naive());
                let diary = MealDiary::from_meals(repo.list(&config.user_id.value).await?, Local);
                let groups = diary.by_meal_type(date);
                let totals = diary.day_totals(date);

                match format {
                    OutputFormat::Json => {
                        let groups: Vec<_> = groups
                            .iter()
                            .map(|(meal_type, meals)| {
                                serde_json::json!({ "meal_type": meal_type, "meals": meals })
                            })
                            .collect();
                        let output = serde_json::json!({
                            "date": date,
                            "groups": groups,
                            "totals": totals,
                        });
                        println!("{}", serde_json::to_string_pretty(&output)?);
                    }
                    OutputFormat::Text => {
                        println!("Food diary for {}", date.format("%A %Y-%m-%d"));
                        println!();

                        if groups.is_empty() {
                            println!("No meals logged");
                            return Ok(());
                        }

                        for (meal_type, meals) in &groups {
                            println!("{}", capitalize(&meal_type.to_string()));
                            for meal in meals {
                                println!(
                                    "  {}  {:<25}  {:>6.0} kcal",
                                    meal.consumed_at.with_timezone(&Local).format("%H:%M"),
                                    truncate(&meal.name, 25),
                                    meal.calories
                                );
                                for item in &meal.items {
                                    println!("         - {}", item);
                                }
                            }
                        }

                        println!();
                        println!(
                            "Total: {} meal(s), {:.0} kcal (P {:.0}g / C {:.0}g / F {:.0}g)",
                            totals.count,
                            totals.sum(Metric::Calories),
                            totals.sum(Metric::Protein),
                            totals.sum(Metric::Carbs),
                            totals.sum(Metric::Fat)
                        );
                    }
                }
                Ok(())
            }

            MealSubcommand::Show { id, format } => {
                let meal = find(repo, &config.user_id.value, id).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&meal)?);
                    }
                    OutputFormat::Text => {
                        println!("ID: {}", meal.id);
                        print!("{}", meal);
                    }
                }
                Ok(())
            }

            MealSubcommand::Update {
                id,
                name,
                meal_type,
                at,
                notes,
                add_items,
                remove_items,
            } => {
                let has_updates = name.is_some()
                    || meal_type.is_some()
                    || at.is_some()
                    || notes.is_some()
                    || !add_items.is_empty()
                    || !remove_items.is_empty();

                if !has_updates {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let meal = find(repo, &config.user_id.value, id).await?;

                let mut session: FormSession<FoodItem> = FormSession::new();
                session.load_for_edit(meal.id, meal.items.clone())?;
                for item in remove_items {
                    remove_rows_named(&mut session, item)?;
                }
                fill_session(&mut session, add_items)?;

                let request = session.save(MealMetadata {
                    name: name.clone().unwrap_or(meal.name),
                    meal_type: meal_type.unwrap_or(meal.meal_type),
                    consumed_at: at.unwrap_or(meal.consumed_at),
                    notes: notes.clone().or(meal.notes),
                })?;

                let updated = submit(repo, config, request).await?;
                println!("Updated meal:");
                print!("{}", updated);
                Ok(())
            }

            MealSubcommand::Delete { id, force } => {
                let meal = find(repo, &config.user_id.value, id).await?;

                if !force && !confirm(&format!("Delete meal '{}'?", meal.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                repo.delete(&config.user_id.value, meal.id).await?;
                println!("Deleted meal: {}", meal.name);
                Ok(())
            }
        }
    }
}

async fn submit(
    repo: &MealRepository,
    config: &Config,
    request: SaveRequest<MealDraft>,
) -> Result<Meal, sqlx::Error> {
    match request {
        SaveRequest::Create(draft) => repo.create(&config.user_id.value, &draft).await,
        SaveRequest::Update { id, draft } => repo.update(&config.user_id.value, id, &draft).await,
    }
}

async fn find(
    repo: &MealRepository,
    user_id: &str,
    id: &str,
) -> Result<Meal, Box<dyn std::error::Error>> {
    let uuid = parse_id(id, "meal")?;
    repo.get_by_id(user_id, uuid)
        .await?
        .ok_or_else(|| format!("Meal not found: {}", id).into())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
