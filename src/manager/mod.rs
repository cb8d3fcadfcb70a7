//! Position Manager - ordered workout lists over a [`WorkoutStore`]
//!
//! Holds no state of its own besides the store handle and its
//! [`PositionConfig`]. Every positional operation is delegated to the store
//! as one transaction; store conflicts and timeouts are retried with the
//! same inputs, everything else is surfaced unchanged.

use std::future::Future;

use tracing::{debug, info, warn};

use crate::config::PositionConfig;
use crate::error::{RepsheetError, Result};
use crate::models::{NewWorkout, Workout, WorkoutUpdate};
use crate::storage::WorkoutStore;

pub struct PositionManager<S: WorkoutStore> {
    store: S,
    config: PositionConfig,
}

impl<S: WorkoutStore> PositionManager<S> {
    pub fn new(store: S, config: PositionConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PositionConfig {
        &self.config
    }

    /// Insert `workout` for `user_id` at `position`.
    ///
    /// Rows at or after `position` move down by one; `position == count`
    /// appends. Owner existence is not checked here.
    pub async fn insert(
        &self,
        user_id: i64,
        workout: NewWorkout,
        position: i32,
    ) -> Result<Workout> {
        let store = &self.store;
        let workout = &workout;
        let policy = self.config.policy;

        let created = self
            .with_retry("insert", move || {
                store.insert_workout(user_id, workout, position, policy)
            })
            .await?;

        info!(
            user_id,
            workout_id = created.id,
            position = created.position,
            "Inserted workout"
        );
        Ok(created)
    }

    /// Delete a workout and compact the positions after it.
    ///
    /// Returns the row as it was before deletion.
    pub async fn delete(&self, id: i64) -> Result<Workout> {
        let store = &self.store;

        let removed = self
            .with_retry("delete", move || store.delete_workout(id))
            .await?
            .ok_or(RepsheetError::WorkoutNotFound { id })?;

        info!(
            user_id = removed.user_id,
            workout_id = id,
            position = removed.position,
            "Deleted workout"
        );
        Ok(removed)
    }

    /// Move a workout to `position` and return its owner's reordered list.
    pub async fn shift(&self, id: i64, position: i32) -> Result<Vec<Workout>> {
        let store = &self.store;
        let policy = self.config.policy;

        let list = self
            .with_retry("shift", move || store.shift_workout(id, position, policy))
            .await?
            .ok_or(RepsheetError::WorkoutNotFound { id })?;

        info!(workout_id = id, position, "Shifted workout");
        Ok(list)
    }

    /// Replace a workout's content. Its position is never touched.
    pub async fn update(&self, id: i64, update: WorkoutUpdate) -> Result<Workout> {
        let store = &self.store;
        let update = &update;

        let workout = self
            .with_retry("update", move || store.update_workout(id, update))
            .await?
            .ok_or(RepsheetError::WorkoutNotFound { id })?;

        debug!(workout_id = id, "Updated workout");
        Ok(workout)
    }

    pub async fn get(&self, id: i64) -> Result<Workout> {
        self.store
            .get_workout(id)
            .await?
            .ok_or(RepsheetError::WorkoutNotFound { id })
    }

    /// A user's workouts ascending by position, or `None` when there are none.
    pub async fn get_ordered(&self, user_id: i64) -> Result<Option<Vec<Workout>>> {
        let list = self.store.list_workouts(user_id).await?;
        Ok((!list.is_empty()).then_some(list))
    }

    pub async fn count(&self, user_id: i64) -> Result<i64> {
        self.store.count_workouts(user_id).await
    }

    /// Remove every workout of a user
    pub async fn delete_all(&self, user_id: i64) -> Result<()> {
        let store = &self.store;

        let removed = self
            .with_retry("delete_all", move || store.delete_all_workouts(user_id))
            .await?;

        info!(user_id, removed, "Deleted all workouts");
        Ok(())
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, mut attempt_op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match attempt_op().await {
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(operation, attempt, error = %err, "Retrying after transient store error");
                    tokio::time::sleep(self.config.backoff(attempt)).await;
                }
                result => return result,
            }
        }
    }
}
