use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::meal_type::MealType;
use super::metric::Metric;
use super::record::DatedRecord;

/// One food line on a meal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl FoodItem {
    pub fn new(name: impl Into<String>, calories: f64) -> Self {
        Self {
            name: name.into(),
            calories,
            ..Self::default()
        }
    }

    pub fn with_macros(mut self, protein: f64, carbs: f64, fat: f64) -> Self {
        self.protein = protein;
        self.carbs = carbs;
        self.fat = fat;
        self
    }
}

impl fmt::Display for FoodItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} kcal (P {}g / C {}g / F {}g)",
            self.name, self.calories, self.protein, self.carbs, self.fat
        )
    }
}

/// A logged meal as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub meal_type: MealType,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub notes: Option<String>,
    pub items: Vec<FoodItem>,
    pub consumed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meal {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        meal_type: MealType,
        consumed_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            name: name.into(),
            meal_type,
            calories: 0.0,
            protein: None,
            carbs: None,
            fat: None,
            notes: None,
            items: Vec::new(),
            consumed_at,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_calories(mut self, calories: f64) -> Self {
        self.calories = calories;
        self
    }

    pub fn with_macros(mut self, protein: f64, carbs: f64, fat: f64) -> Self {
        self.protein = Some(protein);
        self.carbs = Some(carbs);
        self.fat = Some(fat);
        self
    }

    pub fn with_items(mut self, items: Vec<FoodItem>) -> Self {
        self.items = items;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl DatedRecord for Meal {
    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> &str {
        &self.user_id
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.consumed_at
    }

    fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Calories => Some(self.calories),
            Metric::Protein => self.protein,
            Metric::Carbs => self.carbs,
            Metric::Fat => self.fat,
            _ => None,
        }
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.len()))?;
        writeln!(f, "Type: {}", self.meal_type)?;
        writeln!(f, "Consumed: {}", self.consumed_at.format("%Y-%m-%d %H:%M"))?;
        writeln!(f, "Calories: {}", self.calories)?;
        if let (Some(p), Some(c), Some(fat)) = (self.protein, self.carbs, self.fat) {
            writeln!(f, "Macros: P {}g / C {}g / F {}g", p, c, fat)?;
        }

        if !self.items.is_empty() {
            writeln!(f, "\nItems:")?;
            for item in &self.items {
                writeln!(f, "  - {}", item)?;
            }
        }

        if let Some(notes) = &self.notes {
            writeln!(f, "\nNotes: {}", notes)?;
        }

        Ok(())
    }
}

/// An unsaved meal, produced by the meal form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealDraft {
    pub name: String,
    pub meal_type: MealType,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub notes: Option<String>,
    pub items: Vec<FoodItem>,
    pub consumed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_meal_new() {
        let meal = Meal::new("user1", "Lunch", MealType::Lunch, at(3, 12));

        assert_eq!(meal.user_id, "user1");
        assert_eq!(meal.meal_type, MealType::Lunch);
        assert_eq!(meal.calories, 0.0);
        assert!(meal.protein.is_none());
        assert!(meal.items.is_empty());
    }

    #[test]
    fn test_meal_metrics() {
        let meal = Meal::new("user1", "Dinner", MealType::Dinner, at(3, 19))
            .with_calories(580.0)
            .with_macros(40.0, 45.0, 26.0);

        assert_eq!(meal.metric(Metric::Calories), Some(580.0));
        assert_eq!(meal.metric(Metric::Protein), Some(40.0));
        assert_eq!(meal.metric(Metric::Duration), None);
        assert_eq!(meal.occurred_at(), at(3, 19));
    }

    #[test]
    fn test_meal_without_macros_reports_none() {
        let meal = Meal::new("user1", "Snack", MealType::Snack, at(4, 15)).with_calories(210.0);
        assert_eq!(meal.metric(Metric::Fat), None);
    }

    #[test]
    fn test_meal_display() {
        let meal = Meal::new("user1", "Breakfast", MealType::Breakfast, at(4, 8))
            .with_items(vec![FoodItem::new("Oatmeal", 280.0).with_macros(8.0, 45.0, 6.0)])
            .with_notes("Felt energized");

        let output = format!("{}", meal);
        assert!(output.contains("breakfast"));
        assert!(output.contains("Oatmeal: 280 kcal"));
        assert!(output.contains("Felt energized"));
    }
}
