use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateExercise {
    pub name: String,
    pub sets: u32,
}

impl TemplateExercise {
    pub fn new(name: impl Into<String>, sets: u32) -> Self {
        Self {
            name: name.into(),
            sets,
        }
    }
}

impl Default for TemplateExercise {
    fn default() -> Self {
        Self::new("", 0)
    }
}

/// A reusable, persisted list of exercises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub exercises: Vec<TemplateExercise>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutTemplate {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            name: name.into(),
            exercises: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_exercises(mut self, exercises: Vec<TemplateExercise>) -> Self {
        self.exercises = exercises;
        self
    }
}

impl fmt::Display for WorkoutTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.len()))?;

        if self.exercises.is_empty() {
            writeln!(f, "No exercises")?;
        } else {
            for exercise in &self.exercises {
                writeln!(f, "  - {} ({} sets)", exercise.name, exercise.sets)?;
            }
        }

        Ok(())
    }
}

/// A template with no persisted identity yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDraft {
    pub name: String,
    pub exercises: Vec<TemplateExercise>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_display() {
        let template = WorkoutTemplate::new("user1", "Leg Day").with_exercises(vec![
            TemplateExercise::new("Squats", 4),
            TemplateExercise::new("Lunges", 3),
        ]);

        let output = format!("{}", template);
        assert!(output.contains("Leg Day"));
        assert!(output.contains("Squats (4 sets)"));
        assert!(output.contains("Lunges (3 sets)"));
    }

    #[test]
    fn test_empty_template_display() {
        let template = WorkoutTemplate::new("user1", "Rest");
        assert!(format!("{}", template).contains("No exercises"));
    }
}
