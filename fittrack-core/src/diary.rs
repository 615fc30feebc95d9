use chrono::{NaiveDate, TimeZone};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::aggregate::{filter_range, group_by_date, totals_of, Totals};
use crate::models::{Meal, MealType, Metric};

/// In-memory meal list for the diary view.
///
/// Owned by a single writer; views borrow it to read. Dates are local to `tz`.
#[derive(Debug, Clone)]
pub struct MealDiary<Tz: TimeZone> {
    meals: Vec<Meal>,
    tz: Tz,
}

impl<Tz: TimeZone> MealDiary<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self {
            meals: Vec::new(),
            tz,
        }
    }

    pub fn from_meals(meals: Vec<Meal>, tz: Tz) -> Self {
        Self { meals, tz }
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn add(&mut self, meal: Meal) {
        self.meals.push(meal);
    }

    /// Swap in `meal` for the stored meal with the same id. Returns false if absent.
    pub fn replace(&mut self, meal: Meal) -> bool {
        match self.meals.iter_mut().find(|m| m.id == meal.id) {
            Some(slot) => {
                *slot = meal;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Meal> {
        let index = self.meals.iter().position(|m| m.id == id)?;
        Some(self.meals.remove(index))
    }

    pub fn get(&self, id: Uuid) -> Option<&Meal> {
        self.meals.iter().find(|m| m.id == id)
    }

    pub fn by_date(&self) -> BTreeMap<NaiveDate, Vec<&Meal>> {
        group_by_date(&self.meals, &self.tz)
    }

    pub fn meals_on(&self, date: NaiveDate) -> Vec<&Meal> {
        filter_range(&self.meals, date, date, &self.tz)
    }

    pub fn date_range(&self, from: NaiveDate, to: NaiveDate) -> Vec<&Meal> {
        filter_range(&self.meals, from, to, &self.tz)
    }

    /// Meal count, calories and macros for one day.
    pub fn day_totals(&self, date: NaiveDate) -> Totals {
        totals_of(self.meals_on(date), &Metric::NUTRITION)
    }

    /// Meals of one day grouped by type, breakfast first. Empty groups are omitted.
    pub fn by_meal_type(&self, date: NaiveDate) -> Vec<(MealType, Vec<&Meal>)> {
        let mut groups: BTreeMap<MealType, Vec<&Meal>> = BTreeMap::new();
        for meal in self.meals_on(date) {
            groups.entry(meal.meal_type).or_default().push(meal);
        }
        groups.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    fn meal(ts: &str, meal_type: MealType, calories: f64) -> Meal {
        let consumed_at = DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc);
        Meal::new("user1", meal_type.to_string(), meal_type, consumed_at).with_calories(calories)
    }

    fn diary() -> MealDiary<Utc> {
        MealDiary::from_meals(
            vec![
                meal("2025-05-04T08:30:00Z", MealType::Breakfast, 450.0)
                    .with_macros(25.0, 54.0, 10.0),
                meal("2025-05-03T10:30:00Z", MealType::Snack, 320.0),
                meal("2025-05-03T19:00:00Z", MealType::Dinner, 580.0)
                    .with_macros(40.0, 45.0, 26.0),
                meal("2025-05-03T12:45:00Z", MealType::Lunch, 620.0).with_macros(40.0, 57.0, 24.0),
                meal("2025-05-04T13:15:00Z", MealType::Lunch, 550.0),
            ],
            Utc,
        )
    }

    #[test]
    fn test_day_totals() {
        let diary = diary();
        let totals = diary.day_totals(date(3));

        assert_eq!(totals.count, 3);
        assert_eq!(totals.sum(Metric::Calories), 1520.0);
        assert_eq!(totals.sum(Metric::Protein), 80.0);
        assert_eq!(diary.day_totals(date(9)).count, 0);
    }

    #[test]
    fn test_by_meal_type_orders_breakfast_to_snack() {
        let diary = diary();
        let groups = diary.by_meal_type(date(3));

        let types: Vec<MealType> = groups.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            types,
            vec![MealType::Lunch, MealType::Dinner, MealType::Snack]
        );
        assert_eq!(groups[0].1[0].calories, 620.0);
        assert_eq!(groups[2].1[0].calories, 320.0);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut diary = diary();
        let mut edited = diary.meals()[0].clone();
        edited.calories = 500.0;
        let id = edited.id;

        assert!(diary.replace(edited));
        assert_eq!(diary.get(id).unwrap().calories, 500.0);

        let removed = diary.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(diary.get(id).is_none());
        assert!(diary.remove(id).is_none());
    }

    #[test]
    fn test_replace_unknown_meal() {
        let mut diary = diary();
        let stranger = meal("2025-05-05T07:45:00Z", MealType::Breakfast, 520.0);
        assert!(!diary.replace(stranger));
        assert_eq!(diary.meals().len(), 5);
    }

    #[test]
    fn test_date_range_and_by_date() {
        let mut diary = diary();
        diary.add(meal("2025-05-05T07:45:00Z", MealType::Breakfast, 520.0));

        assert_eq!(diary.date_range(date(4), date(5)).len(), 3);
        let by_date = diary.by_date();
        assert_eq!(by_date.keys().copied().collect::<Vec<_>>(), vec![date(3), date(4), date(5)]);
    }
}
