//! SQLite implementation of WorkoutStore
//!
//! Ideal for:
//! - Local development
//! - Embedded/edge deployments
//! - Single-node applications
//! - Testing

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};

use crate::error::{DatabaseError, RepsheetError, Result};
use crate::models::{NewUser, NewWorkout, User, Workout, WorkoutUpdate};
use crate::positions::{self, PositionPolicy, RangeShift, Reposition};
use crate::storage::WorkoutStore;

const WORKOUT_COLUMNS: &str = "id, user_id, name, description, heavy, medium, light, position";

/// SQLite-backed workout store
///
/// The pool holds a single connection, so positional transactions are
/// serialized within the process. Another process writing the same file
/// surfaces as `DatabaseError::Conflict` (`SQLITE_BUSY`), which the position
/// manager retries.
///
/// # Example
///
/// ```ignore
/// // File-based for persistence
/// let store = SqliteStore::connect("sqlite://repsheet.db").await?;
///
/// // In-memory for testing
/// let store = SqliteStore::connect("sqlite::memory:").await?;
/// ```
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to SQLite database
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1) // SQLite works best with single writer
            // An in-memory database lives only as long as its connection
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(url)
            .await?;

        // Enable WAL mode for better concurrent reads
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;

        // Enable foreign keys
        sqlx::query("PRAGMA foreign_keys=ON").execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Create in-memory store (useful for testing)
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Create from existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl WorkoutStore for SqliteStore {
    // =========================================================================
    // Users
    // =========================================================================

    async fn insert_user(&self, user: &NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>("INSERT INTO users (name) VALUES (?) RETURNING id, name")
            .bind(&user.name)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, name FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<Option<User>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM workouts WHERE user_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let user = sqlx::query_as::<_, User>("DELETE FROM users WHERE id = ? RETURNING id, name")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    // =========================================================================
    // Positional operations
    // =========================================================================

    async fn insert_workout(
        &self,
        user_id: i64,
        workout: &NewWorkout,
        position: i32,
        policy: PositionPolicy,
    ) -> Result<Workout> {
        let mut tx = self.pool.begin().await?;

        let count = count_in(&mut tx, user_id).await?;
        let position = positions::resolve_insert(position, count, policy)?;

        if let Some(shift) = (Reposition::Insert { at: position }).range_shift(count) {
            shift_range(&mut tx, user_id, shift).await?;
        }

        let created = sqlx::query_as::<_, Workout>(&format!(
            r#"
            INSERT INTO workouts (user_id, name, description, heavy, medium, light, position)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {WORKOUT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&workout.name)
        .bind(&workout.description)
        .bind(workout.heavy)
        .bind(workout.medium)
        .bind(workout.light)
        .bind(position)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn delete_workout(&self, id: i64) -> Result<Option<Workout>> {
        let mut tx = self.pool.begin().await?;

        let Some(removed) = sqlx::query_as::<_, Workout>(&format!(
            "DELETE FROM workouts WHERE id = ? RETURNING {WORKOUT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        // The count still includes the removed row
        let count = count_in(&mut tx, removed.user_id).await? + 1;
        if let Some(shift) = (Reposition::Remove { at: removed.position }).range_shift(count) {
            shift_range(&mut tx, removed.user_id, shift).await?;
        }

        tx.commit().await?;
        Ok(Some(removed))
    }

    async fn shift_workout(
        &self,
        id: i64,
        position: i32,
        policy: PositionPolicy,
    ) -> Result<Option<Vec<Workout>>> {
        let mut tx = self.pool.begin().await?;

        let Some((user_id, from)) = sqlx::query_as::<_, (i64, i32)>(
            "SELECT user_id, position FROM workouts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        let count = count_in(&mut tx, user_id).await?;
        let to = positions::resolve_move(position, count, policy)?;

        if let Some(shift) = (Reposition::Move { from, to }).range_shift(count) {
            park_range(&mut tx, user_id, shift).await?;
            sqlx::query("UPDATE workouts SET position = ? WHERE id = ?")
                .bind(to)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            unpark(&mut tx, user_id).await?;
        }

        let list = list_in(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(Some(list))
    }

    // =========================================================================
    // Non-positional operations
    // =========================================================================

    async fn get_workout(&self, id: i64) -> Result<Option<Workout>> {
        let workout = sqlx::query_as::<_, Workout>(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(workout)
    }

    async fn update_workout(&self, id: i64, update: &WorkoutUpdate) -> Result<Option<Workout>> {
        let workout = sqlx::query_as::<_, Workout>(&format!(
            r#"
            UPDATE workouts
            SET name = ?, description = ?, heavy = ?, medium = ?, light = ?
            WHERE id = ?
            RETURNING {WORKOUT_COLUMNS}
            "#
        ))
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.heavy)
        .bind(update.medium)
        .bind(update.light)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(workout)
    }

    async fn list_workouts(&self, user_id: i64) -> Result<Vec<Workout>> {
        let mut conn = self.pool.acquire().await?;
        list_in(&mut conn, user_id).await
    }

    async fn count_workouts(&self, user_id: i64) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        count_in(&mut conn, user_id).await
    }

    async fn delete_all_workouts(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM workouts WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/sqlite")
            .run(&self.pool)
            .await
            .map_err(|e| RepsheetError::Database(DatabaseError::Migration(e.to_string())))?;
        Ok(())
    }
}

// Helper functions

async fn count_in(conn: &mut SqliteConnection, user_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workouts WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

async fn list_in(conn: &mut SqliteConnection, user_id: i64) -> Result<Vec<Workout>> {
    let rows = sqlx::query_as::<_, Workout>(&format!(
        "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE user_id = ? ORDER BY position"
    ))
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows)
}

/// Apply `shift` to one owner's rows
async fn shift_range(conn: &mut SqliteConnection, user_id: i64, shift: RangeShift) -> Result<()> {
    park_range(conn, user_id, shift).await?;
    unpark(conn, user_id).await
}

/// Move the rows in `shift` to the negated form of their target position.
///
/// `p` is parked at `-(p + delta) - 1`, which is below zero and distinct
/// per row, so the `(user_id, position)` index never sees a duplicate.
async fn park_range(conn: &mut SqliteConnection, user_id: i64, shift: RangeShift) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE workouts
        SET position = -(position + ?) - 1
        WHERE user_id = ? AND position BETWEEN ? AND ?
        "#,
    )
    .bind(shift.delta)
    .bind(user_id)
    .bind(shift.start)
    .bind(shift.end)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Restore parked rows to their target positions
async fn unpark(conn: &mut SqliteConnection, user_id: i64) -> Result<()> {
    sqlx::query("UPDATE workouts SET position = -position - 1 WHERE user_id = ? AND position < 0")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
