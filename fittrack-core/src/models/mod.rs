mod meal;
mod meal_type;
mod metric;
mod record;
mod template;
mod workout;

pub use meal::{FoodItem, Meal, MealDraft};
pub use meal_type::MealType;
pub use metric::Metric;
pub use record::{parse_timestamp, DatedRecord};
pub use template::{TemplateDraft, TemplateExercise, WorkoutTemplate};
pub use workout::{Exercise, Workout, WorkoutDraft};
