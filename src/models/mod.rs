//! Domain models for repsheet

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Owner of an ordered workout list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Store-generated ID
    pub id: i64,
    /// Display name
    pub name: String,
}

/// Fields needed to create a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A workout in its owner's ordered list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Workout {
    /// Store-generated ID
    pub id: i64,
    /// Owning user; the partition key for `position`
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Heavy-tier load
    pub heavy: Option<i32>,
    /// Medium-tier load
    pub medium: Option<i32>,
    /// Light-tier load
    pub light: Option<i32>,
    /// Zero-based rank within the owner's list
    pub position: i32,
}

/// Content of a workout, without identity or position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWorkout {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub heavy: Option<i32>,
    #[serde(default)]
    pub medium: Option<i32>,
    #[serde(default)]
    pub light: Option<i32>,
}

impl NewWorkout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_loads(mut self, heavy: i32, medium: i32, light: i32) -> Self {
        self.heavy = Some(heavy);
        self.medium = Some(medium);
        self.light = Some(light);
        self
    }

    /// Materialize the row a store creates from this content
    pub fn into_workout(self, id: i64, user_id: i64, position: i32) -> Workout {
        Workout {
            id,
            user_id,
            name: self.name,
            description: self.description,
            heavy: self.heavy,
            medium: self.medium,
            light: self.light,
            position,
        }
    }
}

/// Full replacement of a workout's content. Never changes its position.
pub type WorkoutUpdate = NewWorkout;

impl Workout {
    /// Apply a content update, keeping identity, owner and position
    pub fn apply_update(&mut self, update: &WorkoutUpdate) {
        self.name = update.name.clone();
        self.description = update.description.clone();
        self.heavy = update.heavy;
        self.medium = update.medium;
        self.light = update.light;
    }
}
