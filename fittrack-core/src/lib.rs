//! fittrack core library
//!
//! Record models plus the pure logic behind the dashboards and forms:
//! date bucketing, derived totals, and template instantiation.

pub mod aggregate;
pub mod dashboard;
pub mod diary;
pub mod form;
pub mod instantiate;
pub mod models;

pub use aggregate::{
    bucket_by_day, bucket_by_week, filter_range, filter_today, group_by_date, local_date,
    totals_of, Bucket, Totals,
};
pub use dashboard::{
    meal_progress, time_ago, workout_progress, Granularity, MealPoint, MealSummary, Trend,
    WorkoutPoint, WorkoutSummary,
};
pub use diary::MealDiary;
pub use form::{
    coerce_number, FormError, FormMode, FormSession, ItemField, ItemKey, LineItem, MealMetadata,
    SaveMetadata, SaveRequest, TemplateMetadata, WorkoutMetadata,
};
pub use instantiate::{duplicate, instantiate};
pub use models::{
    parse_timestamp, DatedRecord, Exercise, FoodItem, Meal, MealDraft, MealType, Metric,
    TemplateDraft, TemplateExercise, Workout, WorkoutDraft, WorkoutTemplate,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
