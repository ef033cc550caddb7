pub mod dietary_settings;
pub mod user;

pub use dietary_settings::{DietarySettings, DietarySettingsPatch};
pub use user::{Sex, User};
