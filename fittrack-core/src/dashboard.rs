//! Summary cards and progress chart series.
//!
//! These are thin consumers of [`crate::aggregate`]: they pick the window and the
//! metrics, then shape the result for display. No grouping logic lives here.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::fmt;

use crate::aggregate::{
    bucket_by_day, bucket_by_week, filter_range, filter_today, totals_of, Bucket,
};
use crate::models::{DatedRecord, Exercise, Meal, MealType, Metric, Workout};

const RECENT_LIMIT: usize = 3;
const TREND_WINDOW_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "Improving"),
            Trend::Down => write!(f, "Decreasing"),
            Trend::Stable => write!(f, "Steady"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutSummary {
    pub total_workouts: usize,
    pub total_exercises: usize,
    pub last_workout: Option<DateTime<Utc>>,
    pub recent_exercises: Vec<Exercise>,
    /// Sessions in the trailing week against the week before it.
    pub trend: Trend,
}

impl WorkoutSummary {
    pub fn build<Tz: TimeZone>(workouts: &[Workout], now: DateTime<Utc>, tz: &Tz) -> Self {
        let mut by_recency: Vec<&Workout> = workouts.iter().collect();
        by_recency.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

        let recent_exercises = by_recency
            .iter()
            .flat_map(|w| w.exercises.iter().cloned())
            .take(RECENT_LIMIT)
            .collect();

        Self {
            total_workouts: workouts.len(),
            total_exercises: workouts.iter().map(|w| w.exercises.len()).sum(),
            last_workout: by_recency.first().map(|w| w.completed_at),
            recent_exercises,
            trend: session_trend(workouts, now, tz),
        }
    }
}

fn session_trend<Tz: TimeZone>(workouts: &[Workout], now: DateTime<Utc>, tz: &Tz) -> Trend {
    let today = now.with_timezone(tz).date_naive();
    let window = |end: NaiveDate| {
        end.checked_sub_days(Days::new(TREND_WINDOW_DAYS - 1))
            .map(|start| filter_range(workouts, start, end, tz).len())
            .unwrap_or(0)
    };

    let current = window(today);
    let previous = today
        .checked_sub_days(Days::new(TREND_WINDOW_DAYS))
        .map(window)
        .unwrap_or(0);

    match current.cmp(&previous) {
        std::cmp::Ordering::Greater => Trend::Up,
        std::cmp::Ordering::Less => Trend::Down,
        std::cmp::Ordering::Equal => Trend::Stable,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentMeal {
    pub name: String,
    pub meal_type: MealType,
    pub calories: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Macros {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Today's intake.
#[derive(Debug, Clone, Serialize)]
pub struct MealSummary {
    pub total_meals: usize,
    pub total_calories: f64,
    pub last_meal: Option<DateTime<Utc>>,
    pub recent_meals: Vec<RecentMeal>,
    pub macros: Macros,
}

impl MealSummary {
    pub fn build<Tz: TimeZone>(meals: &[Meal], now: DateTime<Utc>, tz: &Tz) -> Self {
        let mut today = filter_today(meals, now, tz);
        let totals = totals_of(today.iter().copied(), &Metric::NUTRITION);

        today.sort_by(|a, b| b.consumed_at.cmp(&a.consumed_at));
        let recent_meals = today
            .iter()
            .take(RECENT_LIMIT)
            .map(|m| RecentMeal {
                name: m.name.clone(),
                meal_type: m.meal_type,
                calories: m.calories,
            })
            .collect();

        Self {
            total_meals: totals.count,
            total_calories: totals.sum(Metric::Calories),
            last_meal: meals.iter().map(|m| m.occurred_at()).max(),
            recent_meals,
            macros: Macros {
                protein: totals.sum(Metric::Protein),
                carbs: totals.sum(Metric::Carbs),
                fat: totals.sum(Metric::Fat),
            },
        }
    }
}

/// Chart resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Week,
}

impl Granularity {
    fn span_days(self) -> u64 {
        match self {
            Granularity::Day => 1,
            Granularity::Week => 7,
        }
    }

    /// First day of a window of `points` spans ending on `today`.
    pub fn window_start(self, today: NaiveDate, points: usize) -> Option<NaiveDate> {
        let days = (points as u64).checked_mul(self.span_days())?.checked_sub(1)?;
        today.checked_sub_days(Days::new(days))
    }

    fn buckets<'a, R, Tz>(
        self,
        records: &'a [R],
        today: NaiveDate,
        points: usize,
        tz: &Tz,
    ) -> Vec<Bucket<'a, R>>
    where
        R: DatedRecord,
        Tz: TimeZone,
    {
        let Some(start) = self.window_start(today, points) else {
            return Vec::new();
        };
        match self {
            Granularity::Day => bucket_by_day(records, start, points, tz),
            Granularity::Week => bucket_by_week(records, start, points, tz),
        }
    }

    fn label<R>(self, bucket: &Bucket<'_, R>) -> String {
        match self {
            Granularity::Day => bucket.key.format("%a").to_string(),
            Granularity::Week => bucket.label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutPoint {
    pub label: String,
    pub start: NaiveDate,
    pub minutes: f64,
    pub sessions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealPoint {
    pub label: String,
    pub start: NaiveDate,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Minutes trained and session count per point, oldest first, ending on `today`.
pub fn workout_progress<Tz: TimeZone>(
    workouts: &[Workout],
    today: NaiveDate,
    points: usize,
    granularity: Granularity,
    tz: &Tz,
) -> Vec<WorkoutPoint> {
    granularity
        .buckets(workouts, today, points, tz)
        .iter()
        .map(|bucket| {
            let totals = bucket.totals(&[Metric::Duration]);
            WorkoutPoint {
                label: granularity.label(bucket),
                start: bucket.key,
                minutes: totals.sum(Metric::Duration),
                sessions: totals.count,
            }
        })
        .collect()
}

/// Calories and macros per point, oldest first, ending on `today`.
pub fn meal_progress<Tz: TimeZone>(
    meals: &[Meal],
    today: NaiveDate,
    points: usize,
    granularity: Granularity,
    tz: &Tz,
) -> Vec<MealPoint> {
    granularity
        .buckets(meals, today, points, tz)
        .iter()
        .map(|bucket| {
            let totals = bucket.totals(&Metric::NUTRITION);
            MealPoint {
                label: granularity.label(bucket),
                start: bucket.key,
                calories: totals.sum(Metric::Calories),
                protein: totals.sum(Metric::Protein),
                carbs: totals.sum(Metric::Carbs),
                fat: totals.sum(Metric::Fat),
            }
        })
        .collect()
}

/// Coarse "time ago" text for summary cards.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if elapsed.num_hours() < 24 {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_days(), "day")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn workout(at: &str, minutes: u32, exercises: Vec<Exercise>) -> Workout {
        Workout::new("user1", "Session", minutes, ts(at)).with_exercises(exercises)
    }

    #[test]
    fn test_workout_summary() {
        let workouts = vec![
            workout(
                "2025-05-02T18:00:00Z",
                40,
                vec![Exercise::new("Deadlift", 3, 5)],
            ),
            workout(
                "2025-05-04T18:00:00Z",
                50,
                vec![
                    Exercise::new("Bench Press", 3, 10).with_weight(135.0),
                    Exercise::new("Squats", 4, 8).with_weight(185.0),
                ],
            ),
        ];
        let now = ts("2025-05-04T20:00:00Z");

        let summary = WorkoutSummary::build(&workouts, now, &Utc);

        assert_eq!(summary.total_workouts, 2);
        assert_eq!(summary.total_exercises, 3);
        assert_eq!(summary.last_workout, Some(ts("2025-05-04T18:00:00Z")));
        let names: Vec<&str> = summary
            .recent_exercises
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bench Press", "Squats", "Deadlift"]);
        assert_eq!(summary.trend, Trend::Up);
    }

    #[test]
    fn test_workout_trend() {
        let now = ts("2025-05-14T12:00:00Z");
        let older = vec![
            workout("2025-05-02T18:00:00Z", 30, vec![]),
            workout("2025-05-05T18:00:00Z", 30, vec![]),
            workout("2025-05-10T18:00:00Z", 30, vec![]),
        ];
        assert_eq!(WorkoutSummary::build(&older, now, &Utc).trend, Trend::Down);

        let even = vec![
            workout("2025-05-07T18:00:00Z", 30, vec![]),
            workout("2025-05-08T18:00:00Z", 30, vec![]),
        ];
        assert_eq!(WorkoutSummary::build(&even, now, &Utc).trend, Trend::Stable);
    }

    #[test]
    fn test_empty_workout_summary() {
        let summary = WorkoutSummary::build(&[], Utc::now(), &Utc);

        assert_eq!(summary.total_workouts, 0);
        assert!(summary.last_workout.is_none());
        assert!(summary.recent_exercises.is_empty());
        assert_eq!(summary.trend, Trend::Stable);
    }

    #[test]
    fn test_meal_summary_only_counts_today() {
        let meals = vec![
            Meal::new("user1", "Oatmeal", MealType::Breakfast, ts("2025-05-04T08:00:00Z"))
                .with_calories(320.0)
                .with_macros(10.0, 54.0, 6.0),
            Meal::new("user1", "Protein Shake", MealType::Snack, ts("2025-05-04T15:00:00Z"))
                .with_calories(220.0)
                .with_macros(25.0, 10.0, 3.0),
            Meal::new("user1", "Salad", MealType::Lunch, ts("2025-05-04T12:00:00Z"))
                .with_calories(450.0),
            Meal::new("user1", "Pizza", MealType::Dinner, ts("2025-05-03T19:00:00Z"))
                .with_calories(900.0),
        ];
        let now = ts("2025-05-04T16:00:00Z");

        let summary = MealSummary::build(&meals, now, &Utc);

        assert_eq!(summary.total_meals, 3);
        assert_eq!(summary.total_calories, 990.0);
        assert_eq!(summary.macros.protein, 35.0);
        assert_eq!(summary.recent_meals[0].name, "Protein Shake");
        assert_eq!(summary.recent_meals.len(), 3);
        assert_eq!(summary.last_meal, Some(ts("2025-05-04T15:00:00Z")));
    }

    #[test]
    fn test_daily_workout_progress() {
        let workouts = vec![
            workout("2025-05-04T07:00:00Z", 30, vec![]),
            workout("2025-05-04T18:00:00Z", 45, vec![]),
            workout("2025-05-01T18:00:00Z", 60, vec![]),
            workout("2025-04-20T18:00:00Z", 90, vec![]),
        ];

        let points = workout_progress(&workouts, date(5, 4), 7, Granularity::Day, &Utc);

        assert_eq!(points.len(), 7);
        assert_eq!(points[0].start, date(4, 28));
        assert_eq!(points[6].start, date(5, 4));
        assert_eq!(points[6].label, "Sun");
        assert_eq!(points[6].minutes, 75.0);
        assert_eq!(points[6].sessions, 2);
        assert_eq!(points[3].minutes, 60.0);
        assert_eq!(points.iter().map(|p| p.sessions).sum::<usize>(), 3);
    }

    #[test]
    fn test_weekly_meal_progress() {
        let meals = vec![
            Meal::new("user1", "A", MealType::Lunch, ts("2025-05-04T12:00:00Z"))
                .with_calories(500.0)
                .with_macros(30.0, 50.0, 20.0),
            Meal::new("user1", "B", MealType::Lunch, ts("2025-04-25T12:00:00Z"))
                .with_calories(700.0),
        ];

        let points = meal_progress(&meals, date(5, 4), 2, Granularity::Week, &Utc);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "Week 1");
        assert_eq!(points[0].start, date(4, 21));
        assert_eq!(points[0].calories, 700.0);
        assert_eq!(points[1].start, date(4, 28));
        assert_eq!(points[1].calories, 500.0);
        assert_eq!(points[1].protein, 30.0);
    }

    #[test]
    fn test_zero_points() {
        assert!(workout_progress(&[], date(5, 4), 0, Granularity::Day, &Utc).is_empty());
    }

    #[test]
    fn test_time_ago() {
        let now = ts("2025-05-04T12:00:00Z");
        assert_eq!(time_ago(now, now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(45), now), "45 minutes ago");
        assert_eq!(time_ago(now - Duration::hours(1), now), "1 hour ago");
        assert_eq!(time_ago(now - Duration::hours(2), now), "2 hours ago");
        assert_eq!(time_ago(now - Duration::days(3), now), "3 days ago");
    }
}
