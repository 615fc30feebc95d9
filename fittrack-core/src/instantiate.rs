//! Turning templates into drafts.

use chrono::{DateTime, Utc};

use crate::models::{Exercise, TemplateDraft, WorkoutDraft, WorkoutTemplate};

pub const DEFAULT_REPS: u32 = 10;
pub const DEFAULT_WEIGHT: f64 = 0.0;
/// Minutes.
pub const DEFAULT_DURATION: u32 = 45;

/// Start a new workout from `template`, dated `now`.
///
/// Each template exercise keeps its name and set count; reps and weight take the
/// defaults since a template does not record them.
pub fn instantiate(template: &WorkoutTemplate, now: DateTime<Utc>) -> WorkoutDraft {
    let exercises = template
        .exercises
        .iter()
        .map(|e| Exercise::new(e.name.clone(), e.sets, DEFAULT_REPS).with_weight(DEFAULT_WEIGHT))
        .collect();

    WorkoutDraft {
        name: template.name.clone(),
        duration: DEFAULT_DURATION,
        notes: Some(format!("Created from template: {}", template.name)),
        exercises,
        completed_at: now,
    }
}

/// An unsaved copy of `template` named `"<name> (Copy)"`.
pub fn duplicate(template: &WorkoutTemplate) -> TemplateDraft {
    TemplateDraft {
        name: format!("{} (Copy)", template.name),
        exercises: template.exercises.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TemplateExercise;
    use chrono::TimeZone;

    fn leg_day() -> WorkoutTemplate {
        WorkoutTemplate::new("user1", "Leg Day").with_exercises(vec![
            TemplateExercise::new("Squats", 4),
            TemplateExercise::new("Lunges", 3),
        ])
    }

    #[test]
    fn test_instantiate_copies_exercises_with_defaults() {
        let template = leg_day();
        let now = Utc.with_ymd_and_hms(2025, 5, 4, 17, 30, 0).unwrap();

        let draft = instantiate(&template, now);

        assert_eq!(draft.name, "Leg Day");
        assert_eq!(draft.exercises.len(), template.exercises.len());
        assert!(draft.exercises.iter().all(|e| e.reps == DEFAULT_REPS));
        assert!(draft.exercises.iter().all(|e| e.weight == Some(0.0)));
        assert_eq!(draft.exercises[0].name, "Squats");
        assert_eq!(draft.exercises[0].sets, 4);
        assert_eq!(draft.exercises[1].sets, 3);
        assert_eq!(draft.duration, 45);
        assert_eq!(draft.notes.as_deref(), Some("Created from template: Leg Day"));
    }

    #[test]
    fn test_instantiate_dates_draft_at_now_not_template_creation() {
        let template = leg_day();
        let now = template.created_at + chrono::Duration::days(3);

        assert_eq!(instantiate(&template, now).completed_at, now);
    }

    #[test]
    fn test_repeated_instantiation_is_independent() {
        let template = leg_day();
        let now = Utc::now();

        let mut first = instantiate(&template, now);
        let second = instantiate(&template, now);
        first.exercises[0].reps = 5;
        first.exercises.pop();

        assert_eq!(second.exercises.len(), 2);
        assert_eq!(second.exercises[0].reps, DEFAULT_REPS);
        assert_eq!(template.exercises.len(), 2);
    }

    #[test]
    fn test_duplicate() {
        let template = leg_day();
        let mut copy = duplicate(&template);

        assert_eq!(copy.name, "Leg Day (Copy)");
        assert_eq!(copy.exercises, template.exercises);

        copy.exercises[0].sets = 10;
        assert_eq!(template.exercises[0].sets, 4);
    }
}
