use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::metric::Metric;
use super::record::DatedRecord;

/// One exercise performed in a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: Option<f64>,
    pub notes: Option<String>,
}

impl Exercise {
    pub fn new(name: impl Into<String>, sets: u32, reps: u32) -> Self {
        Self {
            name: name.into(),
            sets,
            reps,
            weight: None,
            notes: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

impl Default for Exercise {
    fn default() -> Self {
        Self::new("", 0, 0)
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} sets x {} reps", self.name, self.sets, self.reps)?;
        match self.weight {
            Some(w) if w > 0.0 => write!(f, " @ {}", w),
            _ => Ok(()),
        }
    }
}

/// A completed workout as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    /// Minutes.
    pub duration: u32,
    pub notes: Option<String>,
    pub exercises: Vec<Exercise>,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workout {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        duration: u32,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            name: name.into(),
            duration,
            notes: None,
            exercises: Vec::new(),
            completed_at,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_exercises(mut self, exercises: Vec<Exercise>) -> Self {
        self.exercises = exercises;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl DatedRecord for Workout {
    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> &str {
        &self.user_id
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Duration => Some(f64::from(self.duration)),
            Metric::Sets => Some(self.exercises.iter().map(|e| f64::from(e.sets)).sum()),
            Metric::Reps => Some(self.exercises.iter().map(|e| f64::from(e.reps)).sum()),
            Metric::Weight => Some(self.exercises.iter().filter_map(|e| e.weight).sum()),
            _ => None,
        }
    }
}

impl fmt::Display for Workout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.len()))?;
        writeln!(f, "Completed: {}", self.completed_at.format("%Y-%m-%d %H:%M"))?;
        writeln!(f, "Duration: {} min", self.duration)?;

        if !self.exercises.is_empty() {
            writeln!(f, "\nExercises:")?;
            for exercise in &self.exercises {
                writeln!(f, "  - {}", exercise)?;
            }
        }

        if let Some(notes) = &self.notes {
            writeln!(f, "\nNotes: {}", notes)?;
        }

        Ok(())
    }
}

/// An unsaved workout, produced by the workout form or by template instantiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDraft {
    pub name: String,
    pub duration: u32,
    pub notes: Option<String>,
    pub exercises: Vec<Exercise>,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn completed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 3, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_workout_metrics() {
        let workout = Workout::new("user1", "Push Day", 50, completed()).with_exercises(vec![
            Exercise::new("Bench Press", 3, 10).with_weight(135.0),
            Exercise::new("Push-ups", 3, 15),
        ]);

        assert_eq!(workout.metric(Metric::Duration), Some(50.0));
        assert_eq!(workout.metric(Metric::Sets), Some(6.0));
        assert_eq!(workout.metric(Metric::Reps), Some(25.0));
        assert_eq!(workout.metric(Metric::Weight), Some(135.0));
        assert_eq!(workout.metric(Metric::Calories), None);
    }

    #[test]
    fn test_exercise_display_hides_zero_weight() {
        assert_eq!(
            format!("{}", Exercise::new("Pull-ups", 3, 8).with_weight(0.0)),
            "Pull-ups: 3 sets x 8 reps"
        );
        assert_eq!(
            format!("{}", Exercise::new("Squats", 4, 8).with_weight(185.0)),
            "Squats: 4 sets x 8 reps @ 185"
        );
    }

    #[test]
    fn test_workout_display() {
        let workout = Workout::new("user1", "Leg Day", 45, completed())
            .with_exercises(vec![Exercise::new("Squats", 4, 8)])
            .with_notes("Heavy");

        let output = format!("{}", workout);
        assert!(output.contains("Leg Day"));
        assert!(output.contains("2025-05-03 18:00"));
        assert!(output.contains("Squats: 4 sets x 8 reps"));
        assert!(output.contains("Heavy"));
    }
}
