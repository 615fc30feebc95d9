use chrono::Utc;
use fittrack_core::{Exercise, Workout, WorkoutDraft};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{row_id, row_occurred_at, row_timestamp};

pub struct WorkoutRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct WorkoutRow {
    id: String,
    user_id: String,
    name: String,
    duration: i64,
    notes: Option<String>,
    completed_at: String,
    created_at: String,
    updated_at: String,
}

#[derive(sqlx::FromRow)]
struct ExerciseRow {
    name: String,
    sets: i64,
    reps: i64,
    weight: Option<f64>,
    notes: Option<String>,
}

impl WorkoutRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a workout and its exercises; the id and timestamps are assigned here.
    pub async fn create(
        &self,
        user_id: &str,
        draft: &WorkoutDraft,
    ) -> Result<Workout, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO workouts (id, user_id, name, duration, notes, completed_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(user_id)
        .bind(&draft.name)
        .bind(i64::from(draft.duration))
        .bind(&draft.notes)
        .bind(draft.completed_at.to_rfc3339())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        insert_exercises(&mut tx, &id_str, &draft.exercises).await?;

        tx.commit().await?;

        tracing::info!(id = %id, "Created workout '{}'", draft.name);

        self.get_by_id(user_id, id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)
    }

    /// Fetch one of `user_id`'s workouts; other owners' records are not found.
    pub async fn get_by_id(
        &self,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<Workout>, sqlx::Error> {
        let row: Option<WorkoutRow> =
            sqlx::query_as("SELECT * FROM workouts WHERE id = ? AND user_id = ?")
                .bind(id.to_string())
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => self.hydrate_workout(row).await,
            None => Ok(None),
        }
    }

    /// All of a user's workouts, most recent first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Workout>, sqlx::Error> {
        let rows: Vec<WorkoutRow> = sqlx::query_as(
            "SELECT * FROM workouts WHERE user_id = ? ORDER BY completed_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut workouts = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(workout) = self.hydrate_workout(row).await? {
                workouts.push(workout);
            }
        }
        Ok(workouts)
    }

    /// Replace a workout's fields and exercise list.
    pub async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        draft: &WorkoutDraft,
    ) -> Result<Workout, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let id_str = id.to_string();

        let result = sqlx::query(
            r#"
            UPDATE workouts
            SET name = ?, duration = ?, notes = ?, completed_at = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&draft.name)
        .bind(i64::from(draft.duration))
        .bind(&draft.notes)
        .bind(draft.completed_at.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .bind(&id_str)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        sqlx::query("DELETE FROM exercises WHERE workout_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;
        insert_exercises(&mut tx, &id_str, &draft.exercises).await?;

        tx.commit().await?;

        self.get_by_id(user_id, id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)
    }

    /// Returns false if there was nothing to delete.
    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool, sqlx::Error> {
        // CASCADE removes the exercises
        let result = sqlx::query("DELETE FROM workouts WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn hydrate_workout(&self, row: WorkoutRow) -> Result<Option<Workout>, sqlx::Error> {
        let (Some(id), Some(completed_at)) = (
            row_id("workouts", &row.id),
            row_occurred_at("workouts", &row.id, &row.completed_at),
        ) else {
            return Ok(None);
        };

        let exercises: Vec<ExerciseRow> = sqlx::query_as(
            "SELECT name, sets, reps, weight, notes FROM exercises WHERE workout_id = ? ORDER BY position",
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Workout {
            id,
            user_id: row.user_id,
            name: row.name,
            duration: u32::try_from(row.duration).unwrap_or(0),
            notes: row.notes,
            exercises: exercises
                .into_iter()
                .map(|e| Exercise {
                    name: e.name,
                    sets: u32::try_from(e.sets).unwrap_or(0),
                    reps: u32::try_from(e.reps).unwrap_or(0),
                    weight: e.weight,
                    notes: e.notes,
                })
                .collect(),
            completed_at,
            created_at: row_timestamp(&row.created_at),
            updated_at: row_timestamp(&row.updated_at),
        }))
    }
}

async fn insert_exercises(
    conn: &mut SqliteConnection,
    workout_id: &str,
    exercises: &[Exercise],
) -> Result<(), sqlx::Error> {
    for (position, exercise) in exercises.iter().enumerate() {
        sqlx::query(
            "INSERT INTO exercises (workout_id, position, name, sets, reps, weight, notes) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(workout_id)
        .bind(position as i64)
        .bind(&exercise.name)
        .bind(i64::from(exercise.sets))
        .bind(i64::from(exercise.reps))
        .bind(exercise.weight)
        .bind(&exercise.notes)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use chrono::{DateTime, Duration};
    use tempfile::TempDir;

    struct TestContext {
        repo: WorkoutRepository,
        pool: SqlitePool,
        _temp_dir: TempDir, // Keep alive for duration of test
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        TestContext {
            repo: WorkoutRepository::new(pool.clone()),
            pool,
            _temp_dir: temp_dir,
        }
    }

    fn draft(name: &str, completed_at: DateTime<Utc>) -> WorkoutDraft {
        WorkoutDraft {
            name: name.to_string(),
            duration: 45,
            notes: None,
            exercises: vec![
                Exercise::new("Squats", 4, 8).with_weight(185.0),
                Exercise::new("Lunges", 3, 12),
            ],
            completed_at,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_workout() {
        let ctx = setup_repo().await;
        let completed_at = Utc::now();

        let created = ctx.repo.create("user1", &draft("Leg Day", completed_at)).await.unwrap();
        assert_eq!(created.name, "Leg Day");
        assert_eq!(created.user_id, "user1");
        assert_eq!(created.exercises.len(), 2);

        let fetched = ctx.repo.get_by_id("user1", created.id).await.unwrap().unwrap();
        assert_eq!(fetched.exercises[0].name, "Squats");
        assert_eq!(fetched.exercises[0].weight, Some(185.0));
        assert_eq!(fetched.exercises[1].weight, None);
        assert_eq!(fetched.completed_at.timestamp(), completed_at.timestamp());
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_most_recent_first() {
        let ctx = setup_repo().await;
        let now = Utc::now();

        ctx.repo.create("user1", &draft("Older", now - Duration::days(2))).await.unwrap();
        ctx.repo.create("user1", &draft("Newer", now)).await.unwrap();
        ctx.repo.create("user2", &draft("Someone else", now)).await.unwrap();

        let workouts = ctx.repo.list("user1").await.unwrap();
        assert_eq!(workouts.len(), 2);
        assert_eq!(workouts[0].name, "Newer");
        assert_eq!(workouts[1].name, "Older");
    }

    #[tokio::test]
    async fn test_update_replaces_exercises() {
        let ctx = setup_repo().await;
        let created = ctx.repo.create("user1", &draft("Leg Day", Utc::now())).await.unwrap();

        let mut changed = draft("Leg Day v2", created.completed_at);
        changed.exercises = vec![Exercise::new("Deadlift", 5, 5).with_weight(225.0)];
        changed.duration = 60;

        let updated = ctx.repo.update("user1", created.id, &changed).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Leg Day v2");
        assert_eq!(updated.duration, 60);
        assert_eq!(updated.exercises.len(), 1);
        assert_eq!(updated.exercises[0].name, "Deadlift");
    }

    #[tokio::test]
    async fn test_update_missing_workout() {
        let ctx = setup_repo().await;
        let result = ctx.repo.update("user1", Uuid::new_v4(), &draft("Ghost", Utc::now())).await;
        assert!(matches!(result, Err(sqlx::Error::RowNotFound)));
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let ctx = setup_repo().await;
        let created = ctx.repo.create("user1", &draft("Leg Day", Utc::now())).await.unwrap();

        assert!(ctx.repo.delete("user1", created.id).await.unwrap());
        assert!(ctx.repo.get_by_id("user1", created.id).await.unwrap().is_none());
        assert!(!ctx.repo.delete("user1", created.id).await.unwrap());

        let (orphans,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM exercises")
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_other_owners_workouts_are_untouchable() {
        let ctx = setup_repo().await;
        let theirs = ctx.repo.create("user2", &draft("Leg Day", Utc::now())).await.unwrap();

        assert!(ctx.repo.get_by_id("user1", theirs.id).await.unwrap().is_none());

        let result = ctx.repo.update("user1", theirs.id, &draft("Hijacked", Utc::now())).await;
        assert!(matches!(result, Err(sqlx::Error::RowNotFound)));

        assert!(!ctx.repo.delete("user1", theirs.id).await.unwrap());

        let still_theirs = ctx.repo.get_by_id("user2", theirs.id).await.unwrap().unwrap();
        assert_eq!(still_theirs.name, "Leg Day");
        assert_eq!(still_theirs.exercises, theirs.exercises);
    }

    #[tokio::test]
    async fn test_unparsable_completed_at_is_skipped() {
        let ctx = setup_repo().await;
        ctx.repo.create("user1", &draft("Good", Utc::now())).await.unwrap();

        sqlx::query(
            "INSERT INTO workouts (id, user_id, name, duration, completed_at, created_at, updated_at) VALUES (?, 'user1', 'Bad', 30, 'not a date', '', '')",
        )
        .bind(Uuid::new_v4().to_string())
        .execute(&ctx.pool)
        .await
        .unwrap();

        let workouts = ctx.repo.list("user1").await.unwrap();
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].name, "Good");
    }
}
