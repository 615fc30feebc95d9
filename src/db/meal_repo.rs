use chrono::Utc;
use fittrack_core::{FoodItem, Meal, MealDraft, MealType};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{row_id, row_occurred_at, row_timestamp};

pub struct MealRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct MealRow {
    id: String,
    user_id: String,
    name: String,
    meal_type: String,
    calories: f64,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    notes: Option<String>,
    consumed_at: String,
    created_at: String,
    updated_at: String,
}

#[derive(sqlx::FromRow)]
struct FoodItemRow {
    name: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
}

impl MealRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: &str, draft: &MealDraft) -> Result<Meal, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO meals (id, user_id, name, meal_type, calories, protein, carbs, fat, notes, consumed_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(user_id)
        .bind(&draft.name)
        .bind(draft.meal_type.to_string())
        .bind(draft.calories)
        .bind(draft.protein)
        .bind(draft.carbs)
        .bind(draft.fat)
        .bind(&draft.notes)
        .bind(draft.consumed_at.to_rfc3339())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &id_str, &draft.items).await?;

        tx.commit().await?;

        tracing::info!(id = %id, "Created meal '{}'", draft.name);

        self.get_by_id(user_id, id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)
    }

    /// Fetch one of `user_id`'s meals; other owners' records are not found.
    pub async fn get_by_id(
        &self,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<Meal>, sqlx::Error> {
        let row: Option<MealRow> =
            sqlx::query_as("SELECT * FROM meals WHERE id = ? AND user_id = ?")
                .bind(id.to_string())
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => self.hydrate_meal(row).await,
            None => Ok(None),
        }
    }

    /// All of a user's meals, most recent first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Meal>, sqlx::Error> {
        let rows: Vec<MealRow> =
            sqlx::query_as("SELECT * FROM meals WHERE user_id = ? ORDER BY consumed_at DESC")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        let mut meals = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(meal) = self.hydrate_meal(row).await? {
                meals.push(meal);
            }
        }
        Ok(meals)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        draft: &MealDraft,
    ) -> Result<Meal, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let id_str = id.to_string();

        let result = sqlx::query(
            r#"
            UPDATE meals
            SET name = ?, meal_type = ?, calories = ?, protein = ?, carbs = ?, fat = ?,
                notes = ?, consumed_at = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&draft.name)
        .bind(draft.meal_type.to_string())
        .bind(draft.calories)
        .bind(draft.protein)
        .bind(draft.carbs)
        .bind(draft.fat)
        .bind(&draft.notes)
        .bind(draft.consumed_at.to_rfc3339())
        .bind(Utc::now().to_rfc3339())
        .bind(&id_str)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        sqlx::query("DELETE FROM food_items WHERE meal_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, &id_str, &draft.items).await?;

        tx.commit().await?;

        self.get_by_id(user_id, id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)
    }

    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM meals WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn hydrate_meal(&self, row: MealRow) -> Result<Option<Meal>, sqlx::Error> {
        let (Some(id), Some(consumed_at)) = (
            row_id("meals", &row.id),
            row_occurred_at("meals", &row.id, &row.consumed_at),
        ) else {
            return Ok(None);
        };

        let meal_type: MealType = match row.meal_type.parse() {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(table = "meals", id = %row.id, "Skipping row: {}", e);
                return Ok(None);
            }
        };

        let items: Vec<FoodItemRow> = sqlx::query_as(
            "SELECT name, calories, protein, carbs, fat FROM food_items WHERE meal_id = ? ORDER BY position",
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Meal {
            id,
            user_id: row.user_id,
            name: row.name,
            meal_type,
            calories: row.calories,
            protein: row.protein,
            carbs: row.carbs,
            fat: row.fat,
            notes: row.notes,
            items: items
                .into_iter()
                .map(|i| FoodItem::new(i.name, i.calories).with_macros(i.protein, i.carbs, i.fat))
                .collect(),
            consumed_at,
            created_at: row_timestamp(&row.created_at),
            updated_at: row_timestamp(&row.updated_at),
        }))
    }
}

async fn insert_items(
    conn: &mut SqliteConnection,
    meal_id: &str,
    items: &[FoodItem],
) -> Result<(), sqlx::Error> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO food_items (meal_id, position, name, calories, protein, carbs, fat) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(meal_id)
        .bind(position as i64)
        .bind(&item.name)
        .bind(item.calories)
        .bind(item.protein)
        .bind(item.carbs)
        .bind(item.fat)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
