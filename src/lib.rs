//! # Repsheet
//!
//! Per-user ordered workout lists over a relational store.
//!
//! Every user owns a list of workouts whose positions stay dense and
//! zero-based (`0..n`) across insert, delete and explicit reordering,
//! even with many callers hitting the same list concurrently:
//! - **Positions**: a pure planner that turns each change into one range shift
//! - **Position Manager**: insert / delete / shift / update / list, with retry
//!   of transient store conflicts
//! - **BYO Database**: PostgreSQL, SQLite, or the in-memory store
//! - **REST API**: an axum router over the manager
//!
//! ## Quick Start
//!
//! ```ignore
//! use repsheet::{MemoryStore, NewUser, NewWorkout, PositionManager, WorkoutStore};
//!
//! #[tokio::main]
//! async fn main() -> repsheet::Result<()> {
//!     let store = MemoryStore::new();
//!     let user = store.insert_user(&NewUser::new("sam")).await?;
//!
//!     let manager = PositionManager::new(store, Default::default());
//!     manager.insert(user.id, NewWorkout::new("squat"), 0).await?;
//!     manager.insert(user.id, NewWorkout::new("bench"), 0).await?;
//!
//!     // bench at 0, squat at 1
//!     let list = manager.get_ordered(user.id).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod positions;
pub mod storage;

// Re-exports for convenience
pub use config::{Config, DatabaseConfig, PositionConfig, ServerConfig};
pub use error::{DatabaseError, RepsheetError, Result};
pub use manager::PositionManager;
pub use models::{NewUser, NewWorkout, User, Workout, WorkoutUpdate};
pub use positions::{PositionPolicy, RangeShift, Reposition};
pub use storage::{MemoryStore, WorkoutStore};

#[cfg(feature = "postgres")]
pub use storage::postgres::PostgresStore;

#[cfg(feature = "sqlite")]
pub use storage::sqlite::SqliteStore;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Config, MemoryStore, NewUser, NewWorkout, PositionConfig, PositionManager,
        PositionPolicy, RepsheetError, Result, User, Workout, WorkoutStore, WorkoutUpdate,
    };

    #[cfg(feature = "postgres")]
    pub use crate::PostgresStore;

    #[cfg(feature = "sqlite")]
    pub use crate::SqliteStore;
}
