//! Storage abstraction for users and their ordered workout lists
//!
//! Implement the `WorkoutStore` trait for any database backend.
//! repsheet ships with PostgreSQL, SQLite and in-memory implementations.

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "sqlite")]
pub mod sqlite;

use async_trait::async_trait;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::{NewUser, NewWorkout, User, Workout, WorkoutUpdate};
use crate::positions::PositionPolicy;

/// Core storage trait - implement this for any database backend
///
/// Every positional method (`insert_workout`, `delete_workout`,
/// `shift_workout`) must run as one atomic unit: read the owner's current
/// count or the target's position, plan the change with
/// [`crate::positions`], apply the range shift and the primary write, then
/// commit. A failure at any step must leave the owner's list untouched.
/// Operations on different owners must not block each other.
///
/// # Example
///
/// ```ignore
/// use repsheet::storage::WorkoutStore;
///
/// // Use PostgreSQL
/// let store = PostgresStore::connect("postgres://localhost/repsheet").await?;
///
/// // Or SQLite for development/embedded
/// let store = SqliteStore::connect("sqlite://repsheet.db").await?;
///
/// // Or keep everything in process
/// let store = MemoryStore::new();
/// ```
#[async_trait]
pub trait WorkoutStore: Send + Sync + 'static {
    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user
    async fn insert_user(&self, user: &NewUser) -> Result<User>;

    /// Get a user by ID
    async fn get_user(&self, id: i64) -> Result<Option<User>>;

    /// Delete a user together with all of its workouts
    async fn delete_user(&self, id: i64) -> Result<Option<User>>;

    // =========================================================================
    // Positional operations (atomic)
    // =========================================================================

    /// Insert a workout at `position`, shifting rows at or after it by one.
    ///
    /// `position` is resolved against the owner's count inside the
    /// transaction using `policy`.
    async fn insert_workout(
        &self,
        user_id: i64,
        workout: &NewWorkout,
        position: i32,
        policy: PositionPolicy,
    ) -> Result<Workout>;

    /// Delete a workout and close the gap it leaves.
    ///
    /// Returns the row as it was before deletion, or `None` if absent.
    async fn delete_workout(&self, id: i64) -> Result<Option<Workout>>;

    /// Move a workout to `position`, renumbering the rows in between.
    ///
    /// Returns the owner's full list ordered by position, or `None` if the
    /// workout is absent.
    async fn shift_workout(
        &self,
        id: i64,
        position: i32,
        policy: PositionPolicy,
    ) -> Result<Option<Vec<Workout>>>;

    // =========================================================================
    // Non-positional operations
    // =========================================================================

    /// Get a workout by ID
    async fn get_workout(&self, id: i64) -> Result<Option<Workout>>;

    /// Replace a workout's content, leaving its position alone
    async fn update_workout(&self, id: i64, update: &WorkoutUpdate) -> Result<Option<Workout>>;

    /// All workouts of a user, ascending by position
    async fn list_workouts(&self, user_id: i64) -> Result<Vec<Workout>>;

    /// Number of workouts owned by a user
    async fn count_workouts(&self, user_id: i64) -> Result<i64>;

    /// Delete every workout of a user; no compaction is needed
    async fn delete_all_workouts(&self, user_id: i64) -> Result<u64>;

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Health check - verify database connectivity
    async fn ping(&self) -> Result<()>;

    /// Run database migrations
    async fn migrate(&self) -> Result<()>;
}
