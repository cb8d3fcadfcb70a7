//! In-memory implementation of WorkoutStore
//!
//! Each owner's list is one `DashMap` entry, so an operation holds only its
//! owner's shard lock and never touches another partition. Renumbering goes
//! through [`positions::reindex`], the same planner the SQL backends use.
//! An owner's `lists` entry is always taken before `users` or `owners`.
//!
//! Ideal for:
//! - Testing
//! - Embedding without a database

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{DatabaseError, Result};
use crate::models::{NewUser, NewWorkout, User, Workout, WorkoutUpdate};
use crate::positions::{self, PositionPolicy, Reposition};
use crate::storage::WorkoutStore;

/// Process-local state store
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    users: DashMap<i64, User>,
    /// Owner ID -> workouts, kept sorted by position
    lists: DashMap<i64, Vec<Workout>>,
    /// Workout ID -> owner ID
    owners: DashMap<i64, i64>,
    next_user_id: AtomicI64,
    next_workout_id: AtomicI64,
}

impl Inner {
    fn next_id(counter: &AtomicI64) -> i64 {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop an owner's entry once its list is empty, so listing and counting
    /// see the same state as a table with no rows for that owner.
    fn prune(&self, user_id: i64) {
        self.inner.lists.remove_if(&user_id, |_, list| list.is_empty());
    }

    fn forget(&self, list: &[Workout]) {
        for workout in list {
            self.inner.owners.remove(&workout.id);
        }
    }
}

/// Renumber `list` in place and keep it ordered by position
fn apply(list: &mut Vec<Workout>, op: Reposition) {
    let current: Vec<i32> = list.iter().map(|w| w.position).collect();
    let next = positions::reindex(&current, op);

    let mut kept = Vec::with_capacity(list.len());
    for (mut workout, position) in list.drain(..).zip(next) {
        if let Some(position) = position {
            workout.position = position;
            kept.push(workout);
        }
    }
    kept.sort_by_key(|w| w.position);
    *list = kept;
}

#[async_trait]
impl WorkoutStore for MemoryStore {
    // =========================================================================
    // Users
    // =========================================================================

    async fn insert_user(&self, user: &NewUser) -> Result<User> {
        let user = User {
            id: Inner::next_id(&self.inner.next_user_id),
            name: user.name.clone(),
        };
        self.inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.inner.users.get(&id).map(|u| u.value().clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<Option<User>> {
        // Hold the owner's list entry so a concurrent insert cannot
        // recreate it between removing the user and its workouts
        let entry = self.inner.lists.entry(id);
        let Some((_, user)) = self.inner.users.remove(&id) else {
            return Ok(None);
        };
        if let Entry::Occupied(list) = entry {
            let (_, list) = list.remove_entry();
            self.forget(&list);
        }
        Ok(Some(user))
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
        let entry = self.inner.lists.entry(user_id);
        if !self.inner.users.contains_key(&user_id) {
            return Err(DatabaseError::Constraint(format!(
                "workouts.user_id references missing user {user_id}"
            ))
            .into());
        }

        let count = match &entry {
            Entry::Occupied(list) => list.get().len() as i64,
            Entry::Vacant(_) => 0,
        };
        let position = positions::resolve_insert(position, count, policy)?;

        let mut list = entry.or_default();
        apply(&mut list, Reposition::Insert { at: position });

        let created = workout.clone().into_workout(
            Inner::next_id(&self.inner.next_workout_id),
            user_id,
            position,
        );
        let index = list.partition_point(|w| w.position < position);
        list.insert(index, created.clone());
        self.inner.owners.insert(created.id, user_id);

        Ok(created)
    }

    async fn delete_workout(&self, id: i64) -> Result<Option<Workout>> {
        let Some(user_id) = self.inner.owners.get(&id).map(|o| *o) else {
            return Ok(None);
        };

        let removed = {
            let Some(mut list) = self.inner.lists.get_mut(&user_id) else {
                return Ok(None);
            };
            let Some(removed) = list.iter().find(|w| w.id == id).cloned() else {
                return Ok(None);
            };
            apply(&mut list, Reposition::Remove { at: removed.position });
            removed
        };

        self.inner.owners.remove(&id);
        self.prune(user_id);
        Ok(Some(removed))
    }

    async fn shift_workout(
        &self,
        id: i64,
        position: i32,
        policy: PositionPolicy,
    ) -> Result<Option<Vec<Workout>>> {
        let Some(user_id) = self.inner.owners.get(&id).map(|o| *o) else {
            return Ok(None);
        };
        let Some(mut list) = self.inner.lists.get_mut(&user_id) else {
            return Ok(None);
        };
        let Some(from) = list.iter().find(|w| w.id == id).map(|w| w.position) else {
            return Ok(None);
        };

        let to = positions::resolve_move(position, list.len() as i64, policy)?;
        apply(&mut list, Reposition::Move { from, to });

        Ok(Some(list.to_vec()))
    }

    // =========================================================================
    // Non-positional operations
    // =========================================================================

    async fn get_workout(&self, id: i64) -> Result<Option<Workout>> {
        let Some(user_id) = self.inner.owners.get(&id).map(|o| *o) else {
            return Ok(None);
        };
        Ok(self
            .inner
            .lists
            .get(&user_id)
            .and_then(|list| list.iter().find(|w| w.id == id).cloned()))
    }

    async fn update_workout(&self, id: i64, update: &WorkoutUpdate) -> Result<Option<Workout>> {
        let Some(user_id) = self.inner.owners.get(&id).map(|o| *o) else {
            return Ok(None);
        };
        let Some(mut list) = self.inner.lists.get_mut(&user_id) else {
            return Ok(None);
        };
        Ok(list.iter_mut().find(|w| w.id == id).map(|workout| {
            workout.apply_update(update);
            workout.clone()
        }))
    }

    async fn list_workouts(&self, user_id: i64) -> Result<Vec<Workout>> {
        Ok(self
            .inner
            .lists
            .get(&user_id)
            .map(|list| list.to_vec())
            .unwrap_or_default())
    }

    async fn count_workouts(&self, user_id: i64) -> Result<i64> {
        Ok(self
            .inner
            .lists
            .get(&user_id)
            .map_or(0, |list| list.len() as i64))
    }

    async fn delete_all_workouts(&self, user_id: i64) -> Result<u64> {
        let Some((_, list)) = self.inner.lists.remove(&user_id) else {
            return Ok(0);
        };
        self.forget(&list);
        Ok(list.len() as u64)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn migrate(&self) -> Result<()> {
        Ok(())
    }
}
