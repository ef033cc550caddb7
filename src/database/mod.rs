pub mod manager;
pub mod models;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use store::{DietarySettingsStore, PgDietarySettingsStore};
