use chrono::Utc;
use fittrack_core::{TemplateDraft, TemplateExercise, WorkoutTemplate};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{row_id, row_timestamp};

pub struct TemplateRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: String,
    user_id: String,
    name: String,
    created_at: String,
    updated_at: String,
}

#[derive(sqlx::FromRow)]
struct TemplateExerciseRow {
    name: String,
    sets: i64,
}

impl TemplateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: &str,
        draft: &TemplateDraft,
    ) -> Result<WorkoutTemplate, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO workout_templates (id, user_id, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id_str)
        .bind(user_id)
        .bind(&draft.name)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        insert_exercises(&mut tx, &id_str, &draft.exercises).await?;

        tx.commit().await?;

        tracing::info!(id = %id, "Created template '{}'", draft.name);

        self.get_by_id(user_id, id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)
    }

    /// Fetch one of `user_id`'s templates; other owners' records are not found.
    pub async fn get_by_id(
        &self,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<WorkoutTemplate>, sqlx::Error> {
        let row: Option<TemplateRow> =
            sqlx::query_as("SELECT * FROM workout_templates WHERE id = ? AND user_id = ?")
                .bind(id.to_string())
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => self.hydrate_template(row).await,
            None => Ok(None),
        }
    }

    /// All of a user's templates, newest first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<WorkoutTemplate>, sqlx::Error> {
        let rows: Vec<TemplateRow> = sqlx::query_as(
            "SELECT * FROM workout_templates WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut templates = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(template) = self.hydrate_template(row).await? {
                templates.push(template);
            }
        }
        Ok(templates)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        draft: &TemplateDraft,
    ) -> Result<WorkoutTemplate, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let id_str = id.to_string();

        let result = sqlx::query(
            "UPDATE workout_templates SET name = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&draft.name)
        .bind(Utc::now().to_rfc3339())
        .bind(&id_str)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        sqlx::query("DELETE FROM template_exercises WHERE template_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;
        insert_exercises(&mut tx, &id_str, &draft.exercises).await?;

        tx.commit().await?;

        self.get_by_id(user_id, id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workout_templates WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn hydrate_template(
        &self,
        row: TemplateRow,
    ) -> Result<Option<WorkoutTemplate>, sqlx::Error> {
        let Some(id) = row_id("workout_templates", &row.id) else {
            return Ok(None);
        };

        let exercises: Vec<TemplateExerciseRow> = sqlx::query_as(
            "SELECT name, sets FROM template_exercises WHERE template_id = ? ORDER BY position",
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(WorkoutTemplate {
            id,
            user_id: row.user_id,
            name: row.name,
            exercises: exercises
                .into_iter()
                .map(|e| TemplateExercise::new(e.name, u32::try_from(e.sets).unwrap_or(0)))
                .collect(),
            created_at: row_timestamp(&row.created_at),
            updated_at: row_timestamp(&row.updated_at),
        }))
    }
}

async fn insert_exercises(
    conn: &mut SqliteConnection,
    template_id: &str,
    exercises: &[TemplateExercise],
) -> Result<(), sqlx::Error> {
    for (position, exercise) in exercises.iter().enumerate() {
        sqlx::query(
            "INSERT INTO template_exercises (template_id, position, name, sets) VALUES (?, ?, ?, ?)",
        )
        .bind(template_id)
        .bind(position as i64)
        .bind(&exercise.name)
        .bind(i64::from(exercise.sets))
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use fittrack_core::duplicate;
    use tempfile::TempDir;

    struct TestContext {
        repo: TemplateRepository,
        _temp_dir: TempDir,
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        TestContext {
            repo: TemplateRepository::new(pool),
            _temp_dir: temp_dir,
        }
    }

    fn leg_day() -> TemplateDraft {
        TemplateDraft {
            name: "Leg Day".to_string(),
            exercises: vec![
                TemplateExercise::new("Squats", 4),
                TemplateExercise::new("Leg Press", 3),
            ],
        }
    }

    #[tokio::test]
    async fn test_create_and_get_template() {
        let ctx = setup_repo().await;

        let created = ctx.repo.create("user1", &leg_day()).await.unwrap();
        let fetched = ctx.repo.get_by_id("user1", created.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Leg Day");
        assert_eq!(fetched.exercises, leg_day().exercises);
    }

    #[tokio::test]
    async fn test_duplicate_gets_new_identity() {
        let ctx = setup_repo().await;
        let original = ctx.repo.create("user1", &leg_day()).await.unwrap();

        let copy = ctx
            .repo
            .create("user1", &duplicate(&original))
            .await
            .unwrap();

        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Leg Day (Copy)");
        assert_eq!(copy.exercises, original.exercises);
        assert_eq!(ctx.repo.list("user1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_template() {
        let ctx = setup_repo().await;
        let created = ctx.repo.create("user1", &leg_day()).await.unwrap();

        let mut changed = leg_day();
        changed.name = "Lower Body".to_string();
        changed.exercises.push(TemplateExercise::new("Lunges", 3));

        let updated = ctx.repo.update("user1", created.id, &changed).await.unwrap();
        assert_eq!(updated.name, "Lower Body");
        assert_eq!(updated.exercises.len(), 3);
        assert_eq!(updated.exercises[2].name, "Lunges");

        assert!(ctx.repo.delete("user1", created.id).await.unwrap());
        assert!(ctx.repo.get_by_id("user1", created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_other_owners_templates_are_untouchable() {
        let ctx = setup_repo().await;
        let theirs = ctx.repo.create("user2", &leg_day()).await.unwrap();

        assert!(ctx.repo.get_by_id("user1", theirs.id).await.unwrap().is_none());

        let mut changed = leg_day();
        changed.name = "Hijacked".to_string();
        let result = ctx.repo.update("user1", theirs.id, &changed).await;
        assert!(matches!(result, Err(sqlx::Error::RowNotFound)));

        assert!(!ctx.repo.delete("user1", theirs.id).await.unwrap());

        let still_theirs = ctx.repo.get_by_id("user2", theirs.id).await.unwrap().unwrap();
        assert_eq!(still_theirs.name, "Leg Day");
        assert_eq!(still_theirs.exercises.len(), 2);
    }
}
